//! `SeaORM` Entity for the sync_runs ledger table
//!
//! Append-only audit record of every sync attempt. A row is created when a
//! run starts and transitions running -> {success|partial|failed} exactly
//! once; it is never touched again after finished_at is set.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_runs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub job_name: String,
    pub resource: String,
    pub status: String,
    pub started_at: DateTime,
    pub finished_at: Option<DateTime>,
    pub duration_ms: Option<i64>,
    pub records_processed: i32,
    pub records_failed: i32,
    pub error: Option<String>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
