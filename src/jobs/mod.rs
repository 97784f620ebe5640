pub mod audio_files_sync;
pub mod calculation_methods_sync;
pub mod gold_prices_sync;
pub mod guard_sweep;
pub mod hadith_sync;
pub mod prayer_times_sync;
pub mod reciters_sync;
pub mod scheduler;
pub mod translation_worker;
pub mod verse_translations_sync;
pub mod worker;

use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use thiserror::Error;
use uuid::Uuid;

use crate::services::upstream::UpstreamError;
use crate::services::{job_queue, sync_ledger};
use crate::AppState;

/// Tuning knobs for the sync engine. Everything here has a default matching
/// observed upstream behavior and an environment override.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Skip-if-fresh window for content domains
    pub freshness_secs: i64,
    /// Prices move intraday, so their window is much shorter
    pub gold_freshness_secs: i64,
    /// Delay between per-day prayer-time calls
    pub day_delay_ms: u64,
    /// Delay between paginated hadith/translation page calls
    pub page_delay_ms: u64,
    pub translation_batch_size: usize,
    pub translation_batch_delay_ms: u64,
    pub translation_max_retries: i32,
    pub worker_count: usize,
    pub worker_poll_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            freshness_secs: 86400,
            gold_freshness_secs: 3600,
            day_delay_ms: 100,
            page_delay_ms: 200,
            translation_batch_size: 10,
            translation_batch_delay_ms: 100,
            translation_max_retries: 3,
            worker_count: 2,
            worker_poll_secs: 2,
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            freshness_secs: env_i64("SYNC_FRESHNESS_SECS", defaults.freshness_secs),
            gold_freshness_secs: env_i64("GOLD_FRESHNESS_SECS", defaults.gold_freshness_secs),
            day_delay_ms: env_i64("SYNC_DAY_DELAY_MS", defaults.day_delay_ms as i64) as u64,
            page_delay_ms: env_i64("SYNC_PAGE_DELAY_MS", defaults.page_delay_ms as i64) as u64,
            translation_batch_size: env_i64(
                "TRANSLATION_BATCH_SIZE",
                defaults.translation_batch_size as i64,
            ) as usize,
            translation_batch_delay_ms: env_i64(
                "TRANSLATION_BATCH_DELAY_MS",
                defaults.translation_batch_delay_ms as i64,
            ) as u64,
            translation_max_retries: env_i64(
                "TRANSLATION_MAX_RETRIES",
                defaults.translation_max_retries as i64,
            ) as i32,
            worker_count: env_i64("SYNC_WORKER_COUNT", defaults.worker_count as i64) as usize,
            worker_poll_secs: env_i64("SYNC_WORKER_POLL_SECS", defaults.worker_poll_secs as i64)
                as u64,
        }
    }

    /// Freshness window for a target's skip rule.
    pub fn freshness_for(&self, target: SyncTarget) -> i64 {
        match target {
            SyncTarget::GoldPrices => self.gold_freshness_secs,
            _ => self.freshness_secs,
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Options every domain sync accepts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncOptions {
    /// Bypass the skip-if-fresh rule
    #[serde(default)]
    pub force: bool,
    /// Fetch and map but write nothing
    #[serde(default)]
    pub dry_run: bool,
}

/// Result of one sync call, mirroring the ledger row it produced.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub run_id: Option<i64>,
    pub status: String,
    pub records_processed: i32,
    pub records_failed: i32,
    pub errors: Vec<String>,
}

impl SyncOutcome {
    /// The no-op returned when the skip rule fires: no upstream I/O, no
    /// ledger row.
    pub fn skipped() -> Self {
        Self {
            run_id: None,
            status: "skipped".to_string(),
            records_processed: 0,
            records_failed: 0,
            errors: Vec::new(),
        }
    }

    pub fn from_run(run: &crate::entities::sync_runs::Model, errors: Vec<String>) -> Self {
        Self {
            run_id: Some(run.id),
            status: run.status.clone(),
            records_processed: run.records_processed,
            records_failed: run.records_failed,
            errors,
        }
    }
}

/// Run-level failures. Per-record failures never surface here; they are
/// folded into the run's failure count instead.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),
    #[error("invalid job payload: {0}")]
    Payload(String),
}

/// Handle the running service uses to report progress and observe operator
/// transitions. Cancellation is cooperative: services call should_continue
/// between units of work (per record, per day, per page).
#[derive(Clone)]
pub struct JobContext {
    db: DatabaseConnection,
    job_id: Option<Uuid>,
}

impl JobContext {
    pub fn for_job(db: DatabaseConnection, job_id: Uuid) -> Self {
        Self {
            db,
            job_id: Some(job_id),
        }
    }

    /// Context for a run not owned by the queue (tests, one-off calls).
    pub fn detached(db: DatabaseConnection) -> Self {
        Self { db, job_id: None }
    }

    pub async fn should_continue(&self) -> bool {
        let Some(job_id) = self.job_id else {
            return true;
        };
        match job_queue::current_status(&self.db, job_id).await {
            Ok(Some(status)) => status == job_queue::status::ACTIVE,
            Ok(None) => true,
            Err(e) => {
                // Keep working when the status read itself fails
                tracing::warn!("Job status check failed for {}: {}", job_id, e);
                true
            }
        }
    }

    pub async fn set_progress(&self, percentage: i32) {
        if let Some(job_id) = self.job_id {
            if let Err(e) = job_queue::set_progress(&self.db, job_id, percentage).await {
                tracing::warn!("Progress update failed for {}: {}", job_id, e);
            }
        }
    }
}

/// Closed set of sync domains. Adding a domain means adding a variant and
/// its match arms; every variant implements the same sync contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    CalculationMethods,
    PrayerTimes,
    Reciters,
    AudioFiles,
    VerseTranslations,
    Hadith,
    GoldPrices,
    TranslationSweep,
}

impl SyncTarget {
    pub const ALL: [SyncTarget; 8] = [
        SyncTarget::CalculationMethods,
        SyncTarget::PrayerTimes,
        SyncTarget::Reciters,
        SyncTarget::AudioFiles,
        SyncTarget::VerseTranslations,
        SyncTarget::Hadith,
        SyncTarget::GoldPrices,
        SyncTarget::TranslationSweep,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTarget::CalculationMethods => "calculation_methods",
            SyncTarget::PrayerTimes => "prayer_times",
            SyncTarget::Reciters => "reciters",
            SyncTarget::AudioFiles => "audio_files",
            SyncTarget::VerseTranslations => "verse_translations",
            SyncTarget::Hadith => "hadith",
            SyncTarget::GoldPrices => "gold_prices",
            SyncTarget::TranslationSweep => "translation_sweep",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        SyncTarget::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Human label used for queue rows and ledger job names.
    pub fn job_name(&self) -> &'static str {
        match self {
            SyncTarget::CalculationMethods => "calculation_methods_sync",
            SyncTarget::PrayerTimes => "prayer_times_sync",
            SyncTarget::Reciters => "reciters_sync",
            SyncTarget::AudioFiles => "audio_files_sync",
            SyncTarget::VerseTranslations => "verse_translations_sync",
            SyncTarget::Hadith => "hadith_sync",
            SyncTarget::GoldPrices => "gold_prices_sync",
            SyncTarget::TranslationSweep => "translation_sweep",
        }
    }

    /// Single execution pipeline: workers and admin triggers both land here.
    pub async fn run(
        &self,
        state: &AppState,
        payload: &Value,
        options: &SyncOptions,
        ctx: &JobContext,
    ) -> Result<SyncOutcome, SyncError> {
        match self {
            SyncTarget::CalculationMethods => {
                calculation_methods_sync::sync_calculation_methods(state, options, ctx).await
            }
            SyncTarget::PrayerTimes => {
                prayer_times_sync::sync_prayer_times(state, payload, options, ctx).await
            }
            SyncTarget::Reciters => reciters_sync::sync_reciters(state, options, ctx).await,
            SyncTarget::AudioFiles => {
                audio_files_sync::sync_audio_files(state, payload, options, ctx).await
            }
            SyncTarget::VerseTranslations => {
                verse_translations_sync::sync_verse_translations(state, payload, options, ctx)
                    .await
            }
            SyncTarget::Hadith => hadith_sync::sync_hadith(state, payload, options, ctx).await,
            SyncTarget::GoldPrices => {
                gold_prices_sync::sync_gold_prices(state, options, ctx).await
            }
            SyncTarget::TranslationSweep => {
                translation_worker::run_translation_sweep(state, ctx).await
            }
        }
    }
}

/// Shared per-record accounting for the continue-on-error loops.
#[derive(Debug, Default)]
pub struct RecordTally {
    pub processed: i32,
    pub failed: i32,
    pub errors: Vec<String>,
}

impl RecordTally {
    pub fn ok(&mut self) {
        self.processed += 1;
    }

    pub fn fail(&mut self, context: &str, error: impl std::fmt::Display) {
        self.processed += 1;
        self.failed += 1;
        let message = format!("{}: {}", context, error);
        tracing::warn!("{}", message);
        self.errors.push(message);
    }
}

/// Close the ledger row for a finished loop and build the outcome.
pub async fn finish_with_tally(
    db: &DatabaseConnection,
    run: crate::entities::sync_runs::Model,
    tally: RecordTally,
    notes: Option<String>,
) -> Result<SyncOutcome, SyncError> {
    let run = sync_ledger::finish_run(
        db,
        run,
        tally.processed,
        tally.failed,
        &tally.errors,
        notes,
    )
    .await?;
    Ok(SyncOutcome::from_run(&run, tally.errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_target_round_trip() {
        for target in SyncTarget::ALL {
            assert_eq!(SyncTarget::from_str(target.as_str()), Some(target));
        }
        assert_eq!(SyncTarget::from_str("nope"), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.freshness_secs, 86400);
        assert_eq!(config.day_delay_ms, 100);
        assert_eq!(config.translation_batch_size, 10);
        assert_eq!(config.translation_max_retries, 3);
    }

    #[test]
    fn test_gold_uses_short_freshness() {
        let config = SyncConfig::default();
        assert!(
            config.freshness_for(SyncTarget::GoldPrices) < config.freshness_for(SyncTarget::Hadith)
        );
    }

    #[test]
    fn test_tally_accounting() {
        let mut tally = RecordTally::default();
        tally.ok();
        tally.ok();
        tally.fail("record 3", "bad shape");
        assert_eq!(tally.processed, 3);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.errors.len(), 1);
        assert!(tally.errors[0].contains("record 3"));
    }
}
