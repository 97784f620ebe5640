//! `SeaORM` Entity for reciters table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reciters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Reciter id as assigned by the upstream Quran API; audio file rows
    /// reference the local id, never this one
    #[sea_orm(unique)]
    pub source_id: i32,
    pub name: String,
    pub style: Option<String>,
    pub source: String,
    pub last_synced: DateTime,
    pub raw_response: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
