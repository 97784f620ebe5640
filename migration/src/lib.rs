pub use sea_orm_migration::prelude::*;

mod m20260210_000001_create_sync_runs;
mod m20260210_000002_create_sync_jobs;
mod m20260211_000001_create_prayer_tables;
mod m20260211_000002_create_quran_audio_tables;
mod m20260212_000001_create_hadith_tables;
mod m20260212_000002_create_translation_jobs;
mod m20260213_000001_create_gold_prices;
mod m20260214_000001_create_guard_tables;
mod m20260214_000002_create_telemetry_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260210_000001_create_sync_runs::Migration),
            Box::new(m20260210_000002_create_sync_jobs::Migration),
            Box::new(m20260211_000001_create_prayer_tables::Migration),
            Box::new(m20260211_000002_create_quran_audio_tables::Migration),
            Box::new(m20260212_000001_create_hadith_tables::Migration),
            Box::new(m20260212_000002_create_translation_jobs::Migration),
            Box::new(m20260213_000001_create_gold_prices::Migration),
            Box::new(m20260214_000001_create_guard_tables::Migration),
            Box::new(m20260214_000002_create_telemetry_tables::Migration),
        ]
    }
}
