//! `SeaORM` Entity for client_ip_stats table
//!
//! Running counters per client IP, updated via an online mean. blocked is a
//! denormalized mirror of ip_blocking_rules kept in step by the sweep job.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_ip_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub ip_address: String,
    pub request_count: i64,
    pub error_count: i64,
    pub avg_latency_ms: f64,
    pub last_request: DateTime,
    pub blocked: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
