//! `SeaORM` Entity for translation_jobs table
//!
//! Owned exclusively by the translation pipeline. Status machine:
//! pending -> processing -> {completed | failed}.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "translation_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub hadith_id: i64,
    pub source_lang: String,
    pub target_lang: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub translated_text: Option<String>,
    pub retry_count: i32,
    pub error: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hadiths::Entity",
        from = "Column::HadithId",
        to = "super::hadiths::Column::Id"
    )]
    Hadith,
}

impl Related<super::hadiths::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hadith.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
