//! Periodic job scheduler
//!
//! Schedules are data, not ambient timers: each definition pairs a sync
//! target with an interval and a payload, and ticking just enqueues through
//! the same queue the admin triggers use. A tick is skipped while an
//! earlier job of the same type is still queued or active, so slow runs
//! never pile up behind each other.

use serde_json::{json, Value};
use tokio::time::{interval, Duration};

use crate::jobs::SyncTarget;
use crate::services::job_queue;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct JobDefinition {
    pub target: SyncTarget,
    pub interval_secs: u64,
    pub payload: Value,
}

/// The standing schedule. Prayer times cover the capital region for the
/// next month; other domains run with their catalog defaults.
pub fn default_definitions() -> Vec<JobDefinition> {
    vec![
        JobDefinition {
            target: SyncTarget::CalculationMethods,
            interval_secs: 86400,
            payload: json!({}),
        },
        JobDefinition {
            target: SyncTarget::PrayerTimes,
            interval_secs: 21600,
            payload: json!({
                "latitude": 23.8103,
                "longitude": 90.4125,
                "method": 2,
                "school": 1,
            }),
        },
        JobDefinition {
            target: SyncTarget::Reciters,
            interval_secs: 86400,
            payload: json!({}),
        },
        JobDefinition {
            target: SyncTarget::VerseTranslations,
            interval_secs: 86400,
            payload: json!({ "resource_id": 161, "language": "bn" }),
        },
        JobDefinition {
            target: SyncTarget::Hadith,
            interval_secs: 86400,
            payload: json!({ "collection": "bukhari" }),
        },
        JobDefinition {
            target: SyncTarget::GoldPrices,
            interval_secs: 3600,
            payload: json!({}),
        },
        JobDefinition {
            target: SyncTarget::TranslationSweep,
            interval_secs: 300,
            payload: json!({}),
        },
    ]
}

/// Spawn one ticking loop per definition.
pub async fn start_scheduler(state: AppState, definitions: Vec<JobDefinition>) {
    for definition in definitions {
        let state = state.clone();
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(definition.interval_secs));

            loop {
                ticker.tick().await;

                if let Err(e) = tick(&state, &definition).await {
                    tracing::error!(
                        "[scheduler] Tick failed for {}: {}",
                        definition.target.as_str(),
                        e
                    );
                }
            }
        });
    }
}

async fn tick(
    state: &AppState,
    definition: &JobDefinition,
) -> Result<(), sea_orm::DbErr> {
    let job_type = definition.target.as_str();

    if job_queue::has_pending(&state.db, job_type).await? {
        tracing::debug!("[scheduler] {} already queued or active, skipping tick", job_type);
        return Ok(());
    }

    job_queue::enqueue(
        &state.db,
        job_type,
        definition.target.job_name(),
        definition.payload.clone(),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_target_scheduled_at_most_once() {
        let definitions = default_definitions();
        let mut seen = Vec::new();
        for definition in &definitions {
            assert!(
                !seen.contains(&definition.target),
                "{:?} scheduled twice",
                definition.target
            );
            seen.push(definition.target);
        }
    }

    #[test]
    fn test_intervals_are_sane() {
        for definition in default_definitions() {
            assert!(definition.interval_secs >= 60);
        }
    }

    #[test]
    fn test_payloads_parse_for_their_targets() {
        use crate::jobs::prayer_times_sync::PrayerTimesPayload;
        use crate::jobs::hadith_sync::HadithPayload;
        use crate::jobs::verse_translations_sync::VerseTranslationsPayload;

        for definition in default_definitions() {
            match definition.target {
                SyncTarget::PrayerTimes => {
                    let parsed: Result<PrayerTimesPayload, _> =
                        serde_json::from_value(definition.payload.clone());
                    assert!(parsed.is_ok());
                }
                SyncTarget::Hadith => {
                    let parsed: Result<HadithPayload, _> =
                        serde_json::from_value(definition.payload.clone());
                    assert!(parsed.is_ok());
                }
                SyncTarget::VerseTranslations => {
                    let parsed: Result<VerseTranslationsPayload, _> =
                        serde_json::from_value(definition.payload.clone());
                    assert!(parsed.is_ok());
                }
                _ => {}
            }
        }
    }
}
