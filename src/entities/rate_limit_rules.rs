//! `SeaORM` Entity for rate_limit_rules table
//!
//! Rules are data, editable at runtime. endpoint is an exact path or a
//! trailing-`*` wildcard; method is a verb or "ALL".

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rate_limit_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub endpoint: String,
    pub method: String,
    pub limit_count: i32,
    pub window_seconds: i32,
    pub enabled: bool,
    pub description: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
