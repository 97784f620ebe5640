//! `SeaORM` Entity for verse_translations table
//!
//! Natural key: (verse_key, translation_source).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verse_translations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub verse_key: String,
    pub translation_source: String,
    pub language: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub source: String,
    pub last_synced: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
