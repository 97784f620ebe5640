//! Audio file sync
//!
//! Upstream identifies reciters by source id; audio rows store the local
//! reciter row id. The source id is resolved against the local reciters
//! table before writing, and an unresolvable id fails that record only —
//! the run keeps going so a fresh reciter list can fill the gap next time.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{EntityTrait, Set};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::time::Duration;

use crate::entities::audio_files::{self, Entity as AudioFiles};
use crate::entities::reciters::Entity as Reciters;
use crate::jobs::{finish_with_tally, JobContext, RecordTally, SyncOptions, SyncOutcome, SyncError, SyncTarget};
use crate::services::quran_api::{AudioFileInfo, CHAPTER_COUNT};
use crate::services::sync_ledger;
use crate::AppState;

const SOURCE: &str = "quran_api";

#[derive(Debug, Deserialize)]
pub struct AudioFilesPayload {
    /// Upstream recitation ids to sync; all locally-known reciters when
    /// empty
    #[serde(default)]
    pub reciter_source_ids: Vec<i32>,
    /// Chapter range, defaults to the whole book
    #[serde(default = "default_first_chapter")]
    pub first_chapter: u32,
    #[serde(default = "default_last_chapter")]
    pub last_chapter: u32,
}

fn default_first_chapter() -> u32 {
    1
}

fn default_last_chapter() -> u32 {
    CHAPTER_COUNT
}

/// Resolve an upstream source id to the local reciter row id.
pub fn resolve_reciter(source_map: &HashMap<i32, i32>, source_id: i32) -> Option<i32> {
    source_map.get(&source_id).copied()
}

pub async fn sync_audio_files(
    state: &AppState,
    payload: &Value,
    options: &SyncOptions,
    ctx: &JobContext,
) -> Result<SyncOutcome, SyncError> {
    let params: AudioFilesPayload = serde_json::from_value(payload.clone())
        .map_err(|e| SyncError::Payload(e.to_string()))?;

    if params.first_chapter < 1
        || params.last_chapter > CHAPTER_COUNT
        || params.first_chapter > params.last_chapter
    {
        return Err(SyncError::Payload(format!(
            "invalid chapter range {}..{}",
            params.first_chapter, params.last_chapter
        )));
    }

    let job_name = SyncTarget::AudioFiles.job_name();
    let resource = if params.reciter_source_ids.is_empty() {
        "all".to_string()
    } else {
        format!(
            "reciters:{}",
            params
                .reciter_source_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",")
        )
    };
    let freshness = state.config.freshness_for(SyncTarget::AudioFiles);

    if !options.force
        && sync_ledger::recently_synced(&state.db, job_name, &resource, freshness).await?
    {
        return Ok(SyncOutcome::skipped());
    }

    let run = sync_ledger::begin_run(&state.db, job_name, &resource).await?;

    // source id -> local row id, loaded once per run
    let source_map: HashMap<i32, i32> = Reciters::find()
        .all(&state.db)
        .await?
        .into_iter()
        .map(|r| (r.source_id, r.id))
        .collect();

    let source_ids: Vec<i32> = if params.reciter_source_ids.is_empty() {
        source_map.keys().copied().collect()
    } else {
        params.reciter_source_ids.clone()
    };

    if source_ids.is_empty() {
        let outcome = finish_with_tally(
            &state.db,
            run,
            RecordTally::default(),
            Some("no reciters known locally; run reciters_sync first".to_string()),
        )
        .await?;
        return Ok(outcome);
    }

    let chapters: Vec<u32> = (params.first_chapter..=params.last_chapter).collect();
    let total_units = source_ids.len() * chapters.len();
    let mut done_units = 0usize;
    let mut tally = RecordTally::default();
    let mut cancelled = false;

    'outer: for source_id in &source_ids {
        for chapter in &chapters {
            if !ctx.should_continue().await {
                tracing::info!("[{}] Stopping early on operator request", job_name);
                cancelled = true;
                break 'outer;
            }

            match state.quran.fetch_audio_files(*source_id, *chapter).await {
                Ok(files) => {
                    for file in files {
                        let result = store_audio_file(
                            state,
                            &source_map,
                            *source_id,
                            &file,
                            options.dry_run,
                        )
                        .await;
                        match result {
                            Ok(()) => tally.ok(),
                            Err(e) => tally.fail(
                                &format!("audio {}/{}", source_id, file.verse_key),
                                e,
                            ),
                        }
                    }
                }
                Err(e) => {
                    tally.fail(&format!("reciter {} chapter {}", source_id, chapter), e);
                }
            }

            done_units += 1;
            ctx.set_progress((done_units * 100 / total_units.max(1)) as i32).await;
            tokio::time::sleep(Duration::from_millis(state.config.page_delay_ms)).await;
        }
    }

    let notes = match (options.dry_run, cancelled) {
        (true, _) => Some("dry run".to_string()),
        (false, true) => Some("stopped early by operator".to_string()),
        (false, false) => None,
    };
    finish_with_tally(&state.db, run, tally, notes).await
}

async fn store_audio_file(
    state: &AppState,
    source_map: &HashMap<i32, i32>,
    source_id: i32,
    file: &AudioFileInfo,
    dry_run: bool,
) -> Result<(), SyncError> {
    // Missing mapping fails this record, not the run
    let reciter_id = resolve_reciter(source_map, source_id).ok_or_else(|| {
        SyncError::Payload(format!("no local reciter for source id {}", source_id))
    })?;

    if dry_run {
        return Ok(());
    }

    let model = audio_files::ActiveModel {
        verse_key: Set(file.verse_key.clone()),
        reciter_id: Set(reciter_id),
        audio_url: Set(file.url.clone()),
        format: Set(file.format.clone()),
        source: Set(SOURCE.to_string()),
        last_synced: Set(Utc::now().naive_utc()),
        ..Default::default()
    };

    AudioFiles::insert(model)
        .on_conflict(
            OnConflict::columns([
                audio_files::Column::VerseKey,
                audio_files::Column::ReciterId,
            ])
            .update_columns([
                audio_files::Column::AudioUrl,
                audio_files::Column::Format,
                audio_files::Column::LastSynced,
            ])
            .to_owned(),
        )
        .exec(&state.db)
        .await
        .map_err(SyncError::Storage)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_source_id() {
        let map = HashMap::from([(7, 1), (12, 2)]);
        assert_eq!(resolve_reciter(&map, 7), Some(1));
        assert_eq!(resolve_reciter(&map, 12), Some(2));
    }

    #[test]
    fn test_resolve_unknown_source_id() {
        let map = HashMap::from([(7, 1)]);
        assert_eq!(resolve_reciter(&map, 99), None);
    }

    #[test]
    fn test_payload_defaults_cover_whole_book() {
        let params: AudioFilesPayload = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(params.reciter_source_ids.is_empty());
        assert_eq!(params.first_chapter, 1);
        assert_eq!(params.last_chapter, CHAPTER_COUNT);
    }
}
