//! Prayer time sync (date-ranged variant)
//!
//! Iterates day by day over [start, end] in chronological order, one
//! upstream call per day with an inter-call delay to stay under upstream
//! rate limits. A failed day is recorded and iteration continues.

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{EntityTrait, Set};
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Duration;

use crate::entities::prayer_times::{self, Entity as PrayerTimes};
use crate::jobs::{finish_with_tally, JobContext, RecordTally, SyncOptions, SyncOutcome, SyncError, SyncTarget};
use crate::services::aladhan::DayTimings;
use crate::services::sync_ledger;
use crate::AppState;

const SOURCE: &str = "aladhan";

#[derive(Debug, Deserialize)]
pub struct PrayerTimesPayload {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_method")]
    pub method: i32,
    #[serde(default)]
    pub school: i32,
    /// Defaults to today when absent
    pub start_date: Option<NaiveDate>,
    /// Defaults to start_date when absent
    pub end_date: Option<NaiveDate>,
}

fn default_method() -> i32 {
    2
}

/// Stable resource key for one location/method/school combination. Rounded
/// so nearby float noise maps to the same key.
pub fn location_key(latitude: f64, longitude: f64, method: i32, school: i32) -> String {
    format!("{:.4}:{:.4}:m{}:s{}", latitude, longitude, method, school)
}

/// Chronological list of days in [start, end].
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        current += ChronoDuration::days(1);
    }
    days
}

pub async fn sync_prayer_times(
    state: &AppState,
    payload: &Value,
    options: &SyncOptions,
    ctx: &JobContext,
) -> Result<SyncOutcome, SyncError> {
    let params: PrayerTimesPayload = serde_json::from_value(payload.clone())
        .map_err(|e| SyncError::Payload(e.to_string()))?;

    let job_name = SyncTarget::PrayerTimes.job_name();
    let resource = location_key(params.latitude, params.longitude, params.method, params.school);
    let freshness = state.config.freshness_for(SyncTarget::PrayerTimes);

    if !options.force
        && sync_ledger::recently_synced(&state.db, job_name, &resource, freshness).await?
    {
        return Ok(SyncOutcome::skipped());
    }

    let today = Utc::now().date_naive();
    let start = params.start_date.unwrap_or(today);
    let end = params.end_date.unwrap_or(start);

    if end < start {
        return Err(SyncError::Payload(format!(
            "end_date {} is before start_date {}",
            end, start
        )));
    }

    let run = sync_ledger::begin_run(&state.db, job_name, &resource).await?;
    let days = date_range(start, end);
    let total = days.len();

    tracing::info!(
        "[{}] Syncing {} day(s) for {} ({} to {})",
        job_name,
        total,
        resource,
        start,
        end
    );

    let mut tally = RecordTally::default();
    let mut cancelled = false;

    for (index, date) in days.into_iter().enumerate() {
        if !ctx.should_continue().await {
            tracing::info!("[{}] Stopping early on operator request", job_name);
            cancelled = true;
            break;
        }

        match state
            .aladhan
            .fetch_timings(date, params.latitude, params.longitude, params.method, params.school)
            .await
        {
            Ok(day) => {
                if options.dry_run {
                    tally.ok();
                } else {
                    match upsert_day(state, &params, &resource, date, day).await {
                        Ok(()) => tally.ok(),
                        Err(e) => tally.fail(&format!("day {}", date), e),
                    }
                }
            }
            Err(e) => tally.fail(&format!("day {}", date), e),
        }

        ctx.set_progress(((index + 1) * 100 / total.max(1)) as i32).await;

        // Throttle between per-day calls
        tokio::time::sleep(Duration::from_millis(state.config.day_delay_ms)).await;
    }

    let notes = match (options.dry_run, cancelled) {
        (true, _) => Some("dry run".to_string()),
        (false, true) => Some("stopped early by operator".to_string()),
        (false, false) => None,
    };
    finish_with_tally(&state.db, run, tally, notes).await
}

async fn upsert_day(
    state: &AppState,
    params: &PrayerTimesPayload,
    resource: &str,
    date: NaiveDate,
    day: DayTimings,
) -> Result<(), SyncError> {
    let model = map_day(params, resource, date, day)?;

    PrayerTimes::insert(model)
        .on_conflict(
            OnConflict::columns([
                prayer_times::Column::LocationKey,
                prayer_times::Column::Date,
                prayer_times::Column::Method,
                prayer_times::Column::School,
            ])
            .update_columns([
                prayer_times::Column::Fajr,
                prayer_times::Column::Sunrise,
                prayer_times::Column::Dhuhr,
                prayer_times::Column::Asr,
                prayer_times::Column::Maghrib,
                prayer_times::Column::Isha,
                prayer_times::Column::LastSynced,
                prayer_times::Column::RawResponse,
            ])
            .to_owned(),
        )
        .exec(&state.db)
        .await
        .map_err(SyncError::Storage)?;

    Ok(())
}

/// Map one upstream day into the local row shape. Pure apart from the
/// timestamp; missing timings are a mapping failure for that day.
fn map_day(
    params: &PrayerTimesPayload,
    resource: &str,
    date: NaiveDate,
    day: DayTimings,
) -> Result<prayer_times::ActiveModel, SyncError> {
    let timing = |name: &str| -> Result<String, SyncError> {
        day.timings
            .get(name)
            // Upstream suffixes like "04:32 (+03)" are trimmed to the clock time
            .map(|t| t.split_whitespace().next().unwrap_or(t).to_string())
            .ok_or_else(|| SyncError::Payload(format!("missing timing '{}'", name)))
    };

    Ok(prayer_times::ActiveModel {
        location_key: Set(resource.to_string()),
        date: Set(date),
        method: Set(params.method),
        school: Set(params.school),
        latitude: Set(params.latitude),
        longitude: Set(params.longitude),
        fajr: Set(timing("Fajr")?),
        sunrise: Set(timing("Sunrise")?),
        dhuhr: Set(timing("Dhuhr")?),
        asr: Set(timing("Asr")?),
        maghrib: Set(timing("Maghrib")?),
        isha: Set(timing("Isha")?),
        source: Set(SOURCE.to_string()),
        last_synced: Set(Utc::now().naive_utc()),
        raw_response: Set(Some(day.raw)),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn payload() -> PrayerTimesPayload {
        PrayerTimesPayload {
            latitude: 23.8103,
            longitude: 90.4125,
            method: 2,
            school: 1,
            start_date: None,
            end_date: None,
        }
    }

    fn timings() -> HashMap<String, String> {
        [
            ("Fajr", "04:32 (+06)"),
            ("Sunrise", "05:51"),
            ("Dhuhr", "12:07"),
            ("Asr", "15:31"),
            ("Maghrib", "18:23"),
            ("Isha", "19:42"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_location_key_is_stable() {
        let a = location_key(23.81031, 90.41249, 2, 1);
        let b = location_key(23.81032, 90.41251, 2, 1);
        assert_eq!(a, b);
        assert_ne!(a, location_key(23.81031, 90.41249, 3, 1));
    }

    #[test]
    fn test_date_range_chronological() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();
        let days = date_range(start, end);
        assert_eq!(days.len(), 4);
        assert_eq!(days.first(), Some(&start));
        assert_eq!(days.last(), Some(&end));
        assert!(days.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_date_range_single_day() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(date_range(day, day), vec![day]);
    }

    #[test]
    fn test_map_day_strips_timezone_suffix() {
        let params = payload();
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let day = DayTimings {
            timings: timings(),
            raw: json!({}),
        };

        let model = map_day(&params, "key", date, day).unwrap();
        assert_eq!(model.fajr.clone().unwrap(), "04:32");
        assert_eq!(model.isha.clone().unwrap(), "19:42");
    }

    #[test]
    fn test_map_day_missing_timing_fails() {
        let params = payload();
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let mut incomplete = timings();
        incomplete.remove("Maghrib");
        let day = DayTimings {
            timings: incomplete,
            raw: json!({}),
        };

        assert!(map_day(&params, "key", date, day).is_err());
    }
}
