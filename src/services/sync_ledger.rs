//! Sync run ledger
//!
//! Append-only audit trail of sync attempts, doubling as the idempotency
//! oracle: a run is skipped when the most recent success/partial run for the
//! same (job_name, resource) is younger than the freshness window.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::sync_runs::{self, Entity as SyncRuns};

/// Ledger status values
pub mod status {
    pub const PENDING: &str = "pending";
    pub const RUNNING: &str = "running";
    pub const SUCCESS: &str = "success";
    pub const PARTIAL: &str = "partial";
    pub const FAILED: &str = "failed";
}

/// Derive the terminal status from per-record accounting.
/// failed only when nothing at all made it through.
pub fn derive_status(records_processed: i32, records_failed: i32) -> &'static str {
    if records_failed == 0 {
        status::SUCCESS
    } else if records_failed < records_processed {
        status::PARTIAL
    } else {
        status::FAILED
    }
}

/// True if the latest success/partial run for (job_name, resource) started
/// less than freshness_secs ago. Checked before any upstream call.
pub async fn recently_synced(
    db: &DatabaseConnection,
    job_name: &str,
    resource: &str,
    freshness_secs: i64,
) -> Result<bool, sea_orm::DbErr> {
    let latest = SyncRuns::find()
        .filter(sync_runs::Column::JobName.eq(job_name))
        .filter(sync_runs::Column::Resource.eq(resource))
        .filter(
            Condition::any()
                .add(sync_runs::Column::Status.eq(status::SUCCESS))
                .add(sync_runs::Column::Status.eq(status::PARTIAL)),
        )
        .order_by(sync_runs::Column::StartedAt, Order::Desc)
        .limit(1)
        .one(db)
        .await?;

    match latest {
        None => Ok(false),
        Some(run) => {
            let age = Utc::now()
                .naive_utc()
                .signed_duration_since(run.started_at);
            let fresh = age < Duration::seconds(freshness_secs);
            if fresh {
                tracing::info!(
                    "[{}] Skipping sync for '{}' - last run was {}s ago (freshness: {}s)",
                    job_name,
                    resource,
                    age.num_seconds(),
                    freshness_secs
                );
            }
            Ok(fresh)
        }
    }
}

/// Open a new ledger row in the running state.
pub async fn begin_run(
    db: &DatabaseConnection,
    job_name: &str,
    resource: &str,
) -> Result<sync_runs::Model, sea_orm::DbErr> {
    let run = sync_runs::ActiveModel {
        job_name: Set(job_name.to_string()),
        resource: Set(resource.to_string()),
        status: Set(status::RUNNING.to_string()),
        started_at: Set(Utc::now().naive_utc()),
        records_processed: Set(0),
        records_failed: Set(0),
        ..Default::default()
    };
    run.insert(db).await
}

/// Close a run: the single running -> terminal transition. The row is never
/// updated again afterward.
pub async fn finish_run(
    db: &DatabaseConnection,
    run: sync_runs::Model,
    records_processed: i32,
    records_failed: i32,
    errors: &[String],
    notes: Option<String>,
) -> Result<sync_runs::Model, sea_orm::DbErr> {
    let now = Utc::now().naive_utc();
    let duration_ms = now.signed_duration_since(run.started_at).num_milliseconds();
    let final_status = derive_status(records_processed, records_failed);

    let error = if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    };

    let mut active: sync_runs::ActiveModel = run.into();
    active.status = Set(final_status.to_string());
    active.finished_at = Set(Some(now));
    active.duration_ms = Set(Some(duration_ms));
    active.records_processed = Set(records_processed);
    active.records_failed = Set(records_failed);
    active.error = Set(error);
    active.notes = Set(notes);
    active.update(db).await
}

/// Close a run as failed before any record was processed (run-level error).
pub async fn fail_run(
    db: &DatabaseConnection,
    run: sync_runs::Model,
    error: &str,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now().naive_utc();
    let duration_ms = now.signed_duration_since(run.started_at).num_milliseconds();

    let mut active: sync_runs::ActiveModel = run.into();
    active.status = Set(status::FAILED.to_string());
    active.finished_at = Set(Some(now));
    active.duration_ms = Set(Some(duration_ms));
    active.error = Set(Some(error.to_string()));
    active.update(db).await?;
    Ok(())
}

/// Filtered, paginated run history for the admin console.
pub struct RunFilter {
    pub job_name: Option<String>,
    pub resource: Option<String>,
    pub status: Option<String>,
    pub from: Option<chrono::NaiveDateTime>,
    pub to: Option<chrono::NaiveDateTime>,
}

pub async fn find_runs(
    db: &DatabaseConnection,
    filter: RunFilter,
    page: u64,
    per_page: u64,
) -> Result<(Vec<sync_runs::Model>, u64), sea_orm::DbErr> {
    let mut query = SyncRuns::find();

    if let Some(job_name) = filter.job_name {
        query = query.filter(sync_runs::Column::JobName.eq(job_name));
    }
    if let Some(resource) = filter.resource {
        query = query.filter(sync_runs::Column::Resource.eq(resource));
    }
    if let Some(status) = filter.status {
        query = query.filter(sync_runs::Column::Status.eq(status));
    }
    if let Some(from) = filter.from {
        query = query.filter(sync_runs::Column::StartedAt.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(sync_runs::Column::StartedAt.lte(to));
    }

    let paginator = query
        .order_by(sync_runs::Column::StartedAt, Order::Desc)
        .paginate(db, per_page);

    let total = paginator.num_items().await?;
    let runs = paginator.fetch_page(page).await?;

    Ok((runs, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_status_all_ok() {
        assert_eq!(derive_status(10, 0), status::SUCCESS);
        assert_eq!(derive_status(0, 0), status::SUCCESS);
    }

    #[test]
    fn test_derive_status_partial() {
        assert_eq!(derive_status(10, 3), status::PARTIAL);
        assert_eq!(derive_status(2, 1), status::PARTIAL);
    }

    #[test]
    fn test_derive_status_all_failed() {
        assert_eq!(derive_status(5, 5), status::FAILED);
    }
}
