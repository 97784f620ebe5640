//! `SeaORM` Entity for hadiths table
//!
//! Natural key: (collection_id, hadith_number). text_bn is a denormalized
//! projection owned by the translation pipeline — it is written only when a
//! translation job completes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hadiths")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub collection_id: i32,
    pub book_id: Option<i32>,
    pub hadith_number: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_ar: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_en: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub text_bn: Option<String>,
    pub grade: Option<String>,
    pub source: String,
    pub last_synced: DateTime,
    pub raw_response: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hadith_collections::Entity",
        from = "Column::CollectionId",
        to = "super::hadith_collections::Column::Id"
    )]
    Collection,
}

impl Related<super::hadith_collections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
