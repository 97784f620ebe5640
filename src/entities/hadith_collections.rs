//! `SeaORM` Entity for hadith_collections table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hadith_collections")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Upstream collection slug, e.g. "bukhari"
    #[sea_orm(unique)]
    pub collection_key: String,
    pub name: String,
    pub total_hadith: Option<i32>,
    pub source: String,
    pub last_synced: DateTime,
    pub raw_response: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::hadiths::Entity")]
    Hadiths,
    #[sea_orm(has_many = "super::hadith_books::Entity")]
    HadithBooks,
}

impl Related<super::hadiths::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hadiths.def()
    }
}

impl Related<super::hadith_books::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HadithBooks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
