//! `SeaORM` Entity for the sync_jobs queue table
//!
//! Durable job state shared by all worker processes. Status machine:
//! queued -> active -> {completed | failed}, with paused/cancelled as
//! operator transitions from queued or active.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub job_type: String,
    pub job_name: String,
    pub payload: Json,
    pub status: String,
    pub progress_percentage: i32,
    pub error: Option<String>,
    pub created_at: DateTime,
    pub started_at: Option<DateTime>,
    pub finished_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
