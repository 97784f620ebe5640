//! `SeaORM` Entity for prayer_times table
//!
//! Natural key: (location_key, date, method, school) — enforced by a unique
//! index so re-syncing the same day can never duplicate a row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prayer_times")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub location_key: String,
    pub date: Date,
    pub method: i32,
    pub school: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
    pub source: String,
    pub last_synced: DateTime,
    pub raw_response: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
