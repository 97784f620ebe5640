//! Reciter sync
//!
//! Upserts the upstream reciter list keyed by the upstream source id. Local
//! row ids — not source ids — are what audio file rows reference.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{EntityTrait, Set};
use serde_json::Value;

use crate::entities::reciters::{self, Entity as Reciters};
use crate::jobs::{finish_with_tally, JobContext, RecordTally, SyncOptions, SyncOutcome, SyncError, SyncTarget};
use crate::services::quran_api::RecitationInfo;
use crate::services::sync_ledger;
use crate::AppState;

const RESOURCE: &str = "reciters";
const SOURCE: &str = "quran_api";

pub async fn sync_reciters(
    state: &AppState,
    options: &SyncOptions,
    ctx: &JobContext,
) -> Result<SyncOutcome, SyncError> {
    let job_name = SyncTarget::Reciters.job_name();
    let freshness = state.config.freshness_for(SyncTarget::Reciters);

    if !options.force
        && sync_ledger::recently_synced(&state.db, job_name, RESOURCE, freshness).await?
    {
        return Ok(SyncOutcome::skipped());
    }

    let run = sync_ledger::begin_run(&state.db, job_name, RESOURCE).await?;

    let recitations = match state.quran.fetch_recitations().await {
        Ok(recitations) => recitations,
        Err(e) => {
            sync_ledger::fail_run(&state.db, run, &e.to_string()).await?;
            return Err(e.into());
        }
    };

    let mut tally = RecordTally::default();
    let total = recitations.len();

    for (index, (info, raw)) in recitations.into_iter().enumerate() {
        if !ctx.should_continue().await {
            tracing::info!("[{}] Stopping early on operator request", job_name);
            break;
        }

        if options.dry_run {
            tally.ok();
            continue;
        }

        match upsert_reciter(state, &info, raw).await {
            Ok(()) => tally.ok(),
            Err(e) => tally.fail(&format!("reciter {}", info.id), e),
        }

        ctx.set_progress(((index + 1) * 100 / total.max(1)) as i32).await;
    }

    let notes = options.dry_run.then(|| "dry run".to_string());
    finish_with_tally(&state.db, run, tally, notes).await
}

async fn upsert_reciter(
    state: &AppState,
    info: &RecitationInfo,
    raw: Value,
) -> Result<(), sea_orm::DbErr> {
    let model = reciters::ActiveModel {
        source_id: Set(info.id),
        name: Set(info.name.clone()),
        style: Set(info.style.clone()),
        source: Set(SOURCE.to_string()),
        last_synced: Set(Utc::now().naive_utc()),
        raw_response: Set(Some(raw)),
        ..Default::default()
    };

    Reciters::insert(model)
        .on_conflict(
            OnConflict::column(reciters::Column::SourceId)
                .update_columns([
                    reciters::Column::Name,
                    reciters::Column::Style,
                    reciters::Column::LastSynced,
                    reciters::Column::RawResponse,
                ])
                .to_owned(),
        )
        .exec(&state.db)
        .await?;

    Ok(())
}
