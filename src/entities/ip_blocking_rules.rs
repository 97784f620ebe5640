//! `SeaORM` Entity for ip_blocking_rules table
//!
//! A block is active iff enabled && (expires_at is null || expires_at > now).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ip_blocking_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub ip_address: String,
    pub enabled: bool,
    pub block_reason: Option<String>,
    pub blocked_at: DateTime,
    pub expires_at: Option<DateTime>,
    pub created_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
