//! `SeaORM` Entity for calculation_methods table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calculation_methods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Method id as assigned by the upstream prayer-time API
    #[sea_orm(unique)]
    pub method_id: i32,
    pub name: String,
    pub params: Option<Json>,
    pub source: String,
    pub last_synced: DateTime,
    pub raw_response: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
