//! `SeaORM` Entity for gold_prices table
//!
//! Append-only price history. change_direction is computed once at write
//! time against the latest prior observation for the same
//! (metal, category, unit) and stays stable even if later rows are deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gold_prices")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub metal: String,
    pub category: String,
    pub unit: String,
    pub price: Decimal,
    pub change_direction: Option<String>,
    pub source: String,
    pub fetched_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
