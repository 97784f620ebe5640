//! `SeaORM` Entity for audio_files table
//!
//! Natural key: (verse_key, reciter_id).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audio_files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub verse_key: String,
    pub reciter_id: i32,
    pub audio_url: String,
    pub format: Option<String>,
    pub source: String,
    pub last_synced: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reciters::Entity",
        from = "Column::ReciterId",
        to = "super::reciters::Column::Id"
    )]
    Reciter,
}

impl Related<super::reciters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reciter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
