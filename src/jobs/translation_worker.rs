//! Translation job pipeline
//!
//! Secondary enrichment, intentionally decoupled from the hadith sync: a
//! translation-provider outage never fails a primary sync run. The sweep
//! picks up pending jobs plus failed jobs still under the retry cap and
//! works through them in fixed-size batches with a small inter-batch delay
//! to bound peak concurrency against the translation backend.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tokio::time::Duration;

use crate::entities::hadiths::{self, Entity as Hadiths};
use crate::entities::translation_jobs::{self, Entity as TranslationJobs};
use crate::jobs::{finish_with_tally, JobContext, RecordTally, SyncOutcome, SyncError, SyncTarget};
use crate::services::sync_ledger;
use crate::AppState;

const RESOURCE: &str = "translations";
const SWEEP_LIMIT: u64 = 500;

/// Translation job status values
pub mod status {
    pub const PENDING: &str = "pending";
    pub const PROCESSING: &str = "processing";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
}

/// Retry eligibility: pending always, failed only under the cap. Jobs at
/// the cap stay failed for manual inspection.
pub fn is_retryable(job_status: &str, retry_count: i32, max_retries: i32) -> bool {
    match job_status {
        s if s == status::PENDING => true,
        s if s == status::FAILED => retry_count < max_retries,
        _ => false,
    }
}

pub async fn run_translation_sweep(
    state: &AppState,
    ctx: &JobContext,
) -> Result<SyncOutcome, SyncError> {
    let job_name = SyncTarget::TranslationSweep.job_name();
    let run = sync_ledger::begin_run(&state.db, job_name, RESOURCE).await?;

    let max_retries = state.config.translation_max_retries;

    let candidates = TranslationJobs::find()
        .filter(
            Condition::any()
                .add(translation_jobs::Column::Status.eq(status::PENDING))
                .add(
                    Condition::all()
                        .add(translation_jobs::Column::Status.eq(status::FAILED))
                        .add(translation_jobs::Column::RetryCount.lt(max_retries)),
                ),
        )
        .order_by(translation_jobs::Column::CreatedAt, Order::Asc)
        .limit(SWEEP_LIMIT)
        .all(&state.db)
        .await?;

    if candidates.is_empty() {
        return finish_with_tally(&state.db, run, RecordTally::default(), None).await;
    }

    tracing::info!("[{}] Processing {} translation job(s)", job_name, candidates.len());

    let mut tally = RecordTally::default();
    let total = candidates.len();
    let batch_size = state.config.translation_batch_size.max(1);
    let mut done = 0usize;
    let mut cancelled = false;

    for batch in candidates.chunks(batch_size) {
        if !ctx.should_continue().await {
            tracing::info!("[{}] Stopping early on operator request", job_name);
            cancelled = true;
            break;
        }

        for job in batch {
            let job_id = job.id;
            match process_job(state, job.clone()).await {
                Ok(()) => tally.ok(),
                Err(e) => tally.fail(&format!("translation job {}", job_id), e),
            }
            done += 1;
        }

        ctx.set_progress((done * 100 / total) as i32).await;
        tokio::time::sleep(Duration::from_millis(state.config.translation_batch_delay_ms)).await;
    }

    let notes = cancelled.then(|| "stopped early by operator".to_string());
    finish_with_tally(&state.db, run, tally, notes).await
}

/// Run one job through pending/failed -> processing -> completed|failed.
/// Returns Err only for the job's own failure so the sweep can count it.
async fn process_job(
    state: &AppState,
    job: translation_jobs::Model,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let hadith = Hadiths::find_by_id(job.hadith_id).one(&state.db).await?;
    let Some(hadith) = hadith else {
        mark_failed(&state.db, job, "hadith row no longer exists").await?;
        return Err("hadith row no longer exists".into());
    };

    let Some(source_text) = hadith.text_en.clone() else {
        mark_failed(&state.db, job, "hadith has no source text").await?;
        return Err("hadith has no source text".into());
    };

    let job = set_status(&state.db, job, status::PROCESSING).await?;

    match state
        .translator
        .translate(&source_text, &job.source_lang, &job.target_lang)
        .await
    {
        Ok(translated) => {
            complete_job(&state.db, job, &hadith, translated).await?;
            Ok(())
        }
        Err(e) => {
            let message = e.to_string();
            let retry_count = {
                let mut active: translation_jobs::ActiveModel = job.into();
                active.status = Set(status::FAILED.to_string());
                active.retry_count = Set(active.retry_count.unwrap() + 1);
                active.error = Set(Some(message.clone()));
                active.updated_at = Set(Utc::now().naive_utc());
                let updated = active.update(&state.db).await?;
                updated.retry_count
            };
            tracing::warn!(
                "Translation failed for hadith {} (retry {} of {}): {}",
                hadith.id,
                retry_count,
                state.config.translation_max_retries,
                message
            );
            Err(message.into())
        }
    }
}

async fn set_status(
    db: &DatabaseConnection,
    job: translation_jobs::Model,
    new_status: &str,
) -> Result<translation_jobs::Model, sea_orm::DbErr> {
    let mut active: translation_jobs::ActiveModel = job.into();
    active.status = Set(new_status.to_string());
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await
}

async fn mark_failed(
    db: &DatabaseConnection,
    job: translation_jobs::Model,
    error: &str,
) -> Result<(), sea_orm::DbErr> {
    let mut active: translation_jobs::ActiveModel = job.into();
    active.status = Set(status::FAILED.to_string());
    active.retry_count = Set(active.retry_count.unwrap() + 1);
    active.error = Set(Some(error.to_string()));
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await?;
    Ok(())
}

/// Completion writes the job result and the denormalized hadith projection
/// in one place — the only writer of hadiths.text_bn.
async fn complete_job(
    db: &DatabaseConnection,
    job: translation_jobs::Model,
    hadith: &hadiths::Model,
    translated: String,
) -> Result<(), sea_orm::DbErr> {
    let mut active: translation_jobs::ActiveModel = job.into();
    active.status = Set(status::COMPLETED.to_string());
    active.translated_text = Set(Some(translated.clone()));
    active.error = Set(None);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await?;

    let mut hadith_active: hadiths::ActiveModel = hadith.clone().into();
    hadith_active.text_bn = Set(Some(translated));
    hadith_active.update(db).await?;

    Ok(())
}

/// Reset one failed job to pending and clear its retry count (manual
/// operator retry past the cap).
pub async fn retry_job(
    db: &DatabaseConnection,
    job_id: i64,
) -> Result<bool, sea_orm::DbErr> {
    let Some(job) = TranslationJobs::find_by_id(job_id).one(db).await? else {
        return Ok(false);
    };

    if job.status != status::FAILED {
        return Ok(false);
    }

    let mut active: translation_jobs::ActiveModel = job.into();
    active.status = Set(status::PENDING.to_string());
    active.retry_count = Set(0);
    active.error = Set(None);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(db).await?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_always_retryable() {
        assert!(is_retryable(status::PENDING, 0, 3));
        assert!(is_retryable(status::PENDING, 99, 3));
    }

    #[test]
    fn test_failed_under_cap_retryable() {
        assert!(is_retryable(status::FAILED, 0, 3));
        assert!(is_retryable(status::FAILED, 2, 3));
    }

    #[test]
    fn test_failed_at_cap_stays_failed() {
        assert!(!is_retryable(status::FAILED, 3, 3));
        assert!(!is_retryable(status::FAILED, 4, 3));
    }

    #[test]
    fn test_terminal_states_not_swept() {
        assert!(!is_retryable(status::COMPLETED, 0, 3));
        assert!(!is_retryable(status::PROCESSING, 0, 3));
    }
}
