//! `SeaORM` Entity for hadith_books table
//!
//! Natural key: (collection_id, book_number).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hadith_books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub collection_id: i32,
    pub book_number: i32,
    pub name: String,
    pub source: String,
    pub last_synced: DateTime,
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
