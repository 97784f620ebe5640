//! `SeaORM` Entity for api_endpoint_stats table
//!
//! Per-(endpoint, method) running aggregates, never rebuilt from logs.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "api_endpoint_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub endpoint: String,
    pub method: String,
    pub request_count: i64,
    pub error_count: i64,
    pub avg_latency_ms: f64,
    pub last_request: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
