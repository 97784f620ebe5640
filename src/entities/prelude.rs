//! Re-exports of entity types for convenient imports

pub use super::api_endpoint_stats::Entity as ApiEndpointStats;
pub use super::audio_files::Entity as AudioFiles;
pub use super::calculation_methods::Entity as CalculationMethods;
pub use super::client_ip_stats::Entity as ClientIpStats;
pub use super::gold_prices::Entity as GoldPrices;
pub use super::hadith_books::Entity as HadithBooks;
pub use super::hadith_collections::Entity as HadithCollections;
pub use super::hadiths::Entity as Hadiths;
pub use super::ip_blocking_rules::Entity as IpBlockingRules;
pub use super::prayer_times::Entity as PrayerTimes;
pub use super::rate_limit_rules::Entity as RateLimitRules;
pub use super::reciters::Entity as Reciters;
pub use super::request_logs::Entity as RequestLogs;
pub use super::sync_jobs::Entity as SyncJobs;
pub use super::sync_runs::Entity as SyncRuns;
pub use super::translation_jobs::Entity as TranslationJobs;
pub use super::verse_translations::Entity as VerseTranslations;
