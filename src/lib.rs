// src/lib.rs

use redis::aio::ConnectionManager;
use sea_orm::DatabaseConnection;
use services::{
    aladhan::AladhanService, quran_api::QuranApiService, rate_limiter::RateLimiterService,
    sunnah_api::SunnahApiService, translator::TranslationService,
};

use crate::jobs::SyncConfig;
use crate::scrapers::gold::GoldPriceScraper;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: ConnectionManager,
    pub aladhan: AladhanService,
    pub quran: QuranApiService,
    pub sunnah: SunnahApiService,
    pub translator: TranslationService,
    pub gold_scraper: GoldPriceScraper,
    pub rate_limiter: RateLimiterService,
    pub config: SyncConfig,
}

pub mod entities {
    pub mod prelude;

    pub mod api_endpoint_stats;
    pub mod audio_files;
    pub mod calculation_methods;
    pub mod client_ip_stats;
    pub mod gold_prices;
    pub mod hadith_books;
    pub mod hadith_collections;
    pub mod hadiths;
    pub mod ip_blocking_rules;
    pub mod prayer_times;
    pub mod rate_limit_rules;
    pub mod reciters;
    pub mod request_logs;
    pub mod sync_jobs;
    pub mod sync_runs;
    pub mod translation_jobs;
    pub mod verse_translations;
}

pub mod services {
    pub mod aladhan;
    pub mod ip_blocklist;
    pub mod job_queue;
    pub mod quran_api;
    pub mod rate_limiter;
    pub mod sunnah_api;
    pub mod sync_ledger;
    pub mod telemetry;
    pub mod translator;
    pub mod upstream;
}

pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod scrapers;
