//! Calculation method sync
//!
//! Fetches the upstream list of prayer-time calculation methods and upserts
//! them keyed by the upstream method id.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{EntityTrait, Set};
use serde_json::Value;

use crate::entities::calculation_methods::{self, Entity as CalculationMethods};
use crate::jobs::{finish_with_tally, JobContext, RecordTally, SyncOptions, SyncOutcome, SyncError, SyncTarget};
use crate::services::aladhan::MethodInfo;
use crate::services::sync_ledger;
use crate::AppState;

const RESOURCE: &str = "methods";
const SOURCE: &str = "aladhan";

pub async fn sync_calculation_methods(
    state: &AppState,
    options: &SyncOptions,
    ctx: &JobContext,
) -> Result<SyncOutcome, SyncError> {
    let job_name = SyncTarget::CalculationMethods.job_name();
    let freshness = state.config.freshness_for(SyncTarget::CalculationMethods);

    if !options.force
        && sync_ledger::recently_synced(&state.db, job_name, RESOURCE, freshness).await?
    {
        return Ok(SyncOutcome::skipped());
    }

    let run = sync_ledger::begin_run(&state.db, job_name, RESOURCE).await?;

    let methods = match state.aladhan.fetch_methods().await {
        Ok(methods) => methods,
        Err(e) => {
            sync_ledger::fail_run(&state.db, run, &e.to_string()).await?;
            return Err(e.into());
        }
    };

    let mut tally = RecordTally::default();
    let total = methods.len();

    for (index, (info, raw)) in methods.into_iter().enumerate() {
        if !ctx.should_continue().await {
            tracing::info!("[{}] Stopping early on operator request", job_name);
            break;
        }

        if options.dry_run {
            tally.ok();
            continue;
        }

        match upsert_method(state, &info, raw).await {
            Ok(()) => tally.ok(),
            Err(e) => tally.fail(&format!("method {}", info.id), e),
        }

        ctx.set_progress(((index + 1) * 100 / total.max(1)) as i32).await;
    }

    let notes = options.dry_run.then(|| "dry run".to_string());
    finish_with_tally(&state.db, run, tally, notes).await
}

async fn upsert_method(
    state: &AppState,
    info: &MethodInfo,
    raw: Value,
) -> Result<(), sea_orm::DbErr> {
    let model = calculation_methods::ActiveModel {
        method_id: Set(info.id),
        name: Set(info.name.clone()),
        params: Set(Some(info.params.clone())),
        source: Set(SOURCE.to_string()),
        last_synced: Set(Utc::now().naive_utc()),
        raw_response: Set(Some(raw)),
        ..Default::default()
    };

    CalculationMethods::insert(model)
        .on_conflict(
            OnConflict::column(calculation_methods::Column::MethodId)
                .update_columns([
                    calculation_methods::Column::Name,
                    calculation_methods::Column::Params,
                    calculation_methods::Column::LastSynced,
                    calculation_methods::Column::RawResponse,
                ])
                .to_owned(),
        )
        .exec(&state.db)
        .await?;

    Ok(())
}
