//! Verse translation sync
//!
//! Walks one translation resource chapter by chapter and upserts verses
//! keyed by (verse_key, translation_source).

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{EntityTrait, Set};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Duration;

use crate::entities::verse_translations::{self, Entity as VerseTranslations};
use crate::jobs::{finish_with_tally, JobContext, RecordTally, SyncOptions, SyncOutcome, SyncError, SyncTarget};
use crate::services::quran_api::{VerseTranslationInfo, CHAPTER_COUNT};
use crate::services::sync_ledger;
use crate::AppState;

const SOURCE: &str = "quran_api";

#[derive(Debug, Deserialize)]
pub struct VerseTranslationsPayload {
    /// Upstream translation resource id
    pub resource_id: i32,
    pub language: String,
}

pub async fn sync_verse_translations(
    state: &AppState,
    payload: &Value,
    options: &SyncOptions,
    ctx: &JobContext,
) -> Result<SyncOutcome, SyncError> {
    let params: VerseTranslationsPayload = serde_json::from_value(payload.clone())
        .map_err(|e| SyncError::Payload(e.to_string()))?;

    let job_name = SyncTarget::VerseTranslations.job_name();
    let translation_source = format!("resource:{}", params.resource_id);
    let freshness = state.config.freshness_for(SyncTarget::VerseTranslations);

    if !options.force
        && sync_ledger::recently_synced(&state.db, job_name, &translation_source, freshness)
            .await?
    {
        return Ok(SyncOutcome::skipped());
    }

    let run = sync_ledger::begin_run(&state.db, job_name, &translation_source).await?;

    let mut tally = RecordTally::default();
    let mut cancelled = false;

    for chapter in 1..=CHAPTER_COUNT {
        if !ctx.should_continue().await {
            tracing::info!("[{}] Stopping early on operator request", job_name);
            cancelled = true;
            break;
        }

        match state
            .quran
            .fetch_verse_translations(params.resource_id, chapter)
            .await
        {
            Ok(verses) => {
                for verse in verses {
                    if options.dry_run {
                        tally.ok();
                        continue;
                    }
                    match upsert_verse(state, &params, &translation_source, &verse).await {
                        Ok(()) => tally.ok(),
                        Err(e) => tally.fail(&format!("verse {}", verse.verse_key), e),
                    }
                }
            }
            Err(e) => tally.fail(&format!("chapter {}", chapter), e),
        }

        ctx.set_progress((chapter * 100 / CHAPTER_COUNT) as i32).await;
        tokio::time::sleep(Duration::from_millis(state.config.page_delay_ms)).await;
    }

    let notes = match (options.dry_run, cancelled) {
        (true, _) => Some("dry run".to_string()),
        (false, true) => Some("stopped early by operator".to_string()),
        (false, false) => None,
    };
    finish_with_tally(&state.db, run, tally, notes).await
}

async fn upsert_verse(
    state: &AppState,
    params: &VerseTranslationsPayload,
    translation_source: &str,
    verse: &VerseTranslationInfo,
) -> Result<(), sea_orm::DbErr> {
    let model = verse_translations::ActiveModel {
        verse_key: Set(verse.verse_key.clone()),
        translation_source: Set(translation_source.to_string()),
        language: Set(params.language.clone()),
        text: Set(verse.text.clone()),
        source: Set(SOURCE.to_string()),
        last_synced: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    VerseTranslations::insert(model)
        .on_conflict(
            OnConflict::columns([
                verse_translations::Column::VerseKey,
                verse_translations::Column::TranslationSource,
            ])
            .update_columns([
                verse_translations::Column::Language,
                verse_translations::Column::Text,
                verse_translations::Column::LastSynced,
            ])
            .to_owned(),
        )
        .exec(&state.db)
        .await?;

    Ok(())
}
