//! Durable job queue
//!
//! Job rows live in the relational store so every worker process sees the
//! same state. Claiming uses FOR UPDATE SKIP LOCKED: concurrent workers
//! each pull a distinct job or nothing. Manual admin triggers and the cron
//! scheduler both enqueue through the same path.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseBackend, DatabaseConnection, EntityTrait,
    FromQueryResult, Order, PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
};
use uuid::Uuid;

use crate::entities::sync_jobs::{self, Entity as SyncJobs};

/// Queue status values
pub mod status {
    pub const QUEUED: &str = "queued";
    pub const ACTIVE: &str = "active";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
    pub const PAUSED: &str = "paused";
    pub const CANCELLED: &str = "cancelled";
}

/// Insert a queued job and return its id. The caller gets the handle back
/// immediately; execution happens on a worker.
pub async fn enqueue(
    db: &DatabaseConnection,
    job_type: &str,
    job_name: &str,
    payload: serde_json::Value,
) -> Result<Uuid, sea_orm::DbErr> {
    let id = Uuid::new_v4();

    let job = sync_jobs::ActiveModel {
        id: Set(id),
        job_type: Set(job_type.to_string()),
        job_name: Set(job_name.to_string()),
        payload: Set(payload),
        status: Set(status::QUEUED.to_string()),
        progress_percentage: Set(0),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    job.insert(db).await?;

    tracing::info!("[queue] Enqueued {} job {} ({})", job_type, id, job_name);
    Ok(id)
}

/// Atomically claim the oldest queued job, moving it to active. Returns
/// None when the queue is empty. Safe to call from any number of workers.
pub async fn claim_next(
    db: &DatabaseConnection,
) -> Result<Option<sync_jobs::Model>, sea_orm::DbErr> {
    sync_jobs::Model::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        r#"
        UPDATE sync_jobs
        SET status = 'active', started_at = $1
        WHERE id = (
            SELECT id FROM sync_jobs
            WHERE status = 'queued'
            ORDER BY created_at ASC
            LIMIT 1
            FOR UPDATE SKIP LOCKED
        )
        RETURNING *
        "#,
        vec![Utc::now().naive_utc().into()],
    ))
    .one(db)
    .await
}

/// Re-queue jobs left active by a worker that died mid-run. Called once on
/// worker startup so crashed work is retried instead of silently lost.
pub async fn requeue_stale(db: &DatabaseConnection) -> Result<u64, sea_orm::DbErr> {
    let result = SyncJobs::update_many()
        .col_expr(
            sync_jobs::Column::Status,
            sea_orm::sea_query::Expr::value(status::QUEUED),
        )
        .filter(sync_jobs::Column::Status.eq(status::ACTIVE))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        tracing::warn!(
            "[queue] Re-queued {} job(s) left active by a previous worker",
            result.rows_affected
        );
    }

    Ok(result.rows_affected)
}

pub async fn mark_completed(db: &DatabaseConnection, id: Uuid) -> Result<(), sea_orm::DbErr> {
    finish(db, id, status::COMPLETED, None).await
}

pub async fn mark_failed(
    db: &DatabaseConnection,
    id: Uuid,
    error: &str,
) -> Result<(), sea_orm::DbErr> {
    finish(db, id, status::FAILED, Some(error.to_string())).await
}

async fn finish(
    db: &DatabaseConnection,
    id: Uuid,
    final_status: &str,
    error: Option<String>,
) -> Result<(), sea_orm::DbErr> {
    let Some(job) = SyncJobs::find_by_id(id).one(db).await? else {
        return Ok(());
    };

    // A cancel or pause that landed while the worker was finishing wins:
    // the worker stopped cooperatively, the operator's state stays
    if job.status == status::CANCELLED || job.status == status::PAUSED {
        return Ok(());
    }

    let completed = final_status == status::COMPLETED;
    let mut active: sync_jobs::ActiveModel = job.into();
    active.status = Set(final_status.to_string());
    active.error = Set(error);
    active.finished_at = Set(Some(Utc::now().naive_utc()));
    if completed {
        active.progress_percentage = Set(100);
    }
    active.update(db).await?;
    Ok(())
}

pub async fn set_progress(
    db: &DatabaseConnection,
    id: Uuid,
    progress_percentage: i32,
) -> Result<(), sea_orm::DbErr> {
    SyncJobs::update_many()
        .col_expr(
            sync_jobs::Column::ProgressPercentage,
            sea_orm::sea_query::Expr::value(progress_percentage.clamp(0, 100)),
        )
        .filter(sync_jobs::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn current_status(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<String>, sea_orm::DbErr> {
    Ok(SyncJobs::find_by_id(id).one(db).await?.map(|j| j.status))
}

/// Operator transition validity: pause/cancel apply to queued or active
/// jobs, resume applies to paused jobs.
pub fn transition_allowed(current: &str, requested: &str) -> bool {
    match requested {
        status::PAUSED | status::CANCELLED => {
            current == status::QUEUED || current == status::ACTIVE || current == status::PAUSED
        }
        status::QUEUED => current == status::PAUSED,
        _ => false,
    }
}

/// Apply an operator transition. Returns false when the job does not exist
/// or the transition is not allowed from its current state.
pub async fn request_transition(
    db: &DatabaseConnection,
    id: Uuid,
    requested: &str,
) -> Result<bool, sea_orm::DbErr> {
    let Some(job) = SyncJobs::find_by_id(id).one(db).await? else {
        return Ok(false);
    };

    if !transition_allowed(&job.status, requested) {
        return Ok(false);
    }

    let mut active: sync_jobs::ActiveModel = job.into();
    active.status = Set(requested.to_string());
    if requested == status::CANCELLED {
        active.finished_at = Set(Some(Utc::now().naive_utc()));
    }
    active.update(db).await?;

    tracing::info!("[queue] Job {} -> {}", id, requested);
    Ok(true)
}

pub async fn find_job(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<sync_jobs::Model>, sea_orm::DbErr> {
    SyncJobs::find_by_id(id).one(db).await
}

pub async fn find_jobs(
    db: &DatabaseConnection,
    status_filter: Option<String>,
    job_type: Option<String>,
    page: u64,
    per_page: u64,
) -> Result<(Vec<sync_jobs::Model>, u64), sea_orm::DbErr> {
    let mut query = SyncJobs::find();

    if let Some(status) = status_filter {
        query = query.filter(sync_jobs::Column::Status.eq(status));
    }
    if let Some(job_type) = job_type {
        query = query.filter(sync_jobs::Column::JobType.eq(job_type));
    }

    let paginator = query
        .order_by(sync_jobs::Column::CreatedAt, Order::Desc)
        .paginate(db, per_page);

    let total = paginator.num_items().await?;
    let jobs = paginator.fetch_page(page).await?;

    Ok((jobs, total))
}

/// True when a queued or active job of this type already exists. The cron
/// scheduler uses this so ticks cannot pile up behind a slow run.
pub async fn has_pending(db: &DatabaseConnection, job_type: &str) -> Result<bool, sea_orm::DbErr> {
    let count = SyncJobs::find()
        .filter(sync_jobs::Column::JobType.eq(job_type))
        .filter(
            sea_orm::Condition::any()
                .add(sync_jobs::Column::Status.eq(status::QUEUED))
                .add(sync_jobs::Column::Status.eq(status::ACTIVE)),
        )
        .count(db)
        .await?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_and_cancel_from_running_states() {
        assert!(transition_allowed(status::QUEUED, status::PAUSED));
        assert!(transition_allowed(status::ACTIVE, status::PAUSED));
        assert!(transition_allowed(status::QUEUED, status::CANCELLED));
        assert!(transition_allowed(status::ACTIVE, status::CANCELLED));
        assert!(transition_allowed(status::PAUSED, status::CANCELLED));
    }

    #[test]
    fn test_resume_only_from_paused() {
        assert!(transition_allowed(status::PAUSED, status::QUEUED));
        assert!(!transition_allowed(status::ACTIVE, status::QUEUED));
        assert!(!transition_allowed(status::COMPLETED, status::QUEUED));
    }

    #[test]
    fn test_terminal_states_are_terminal() {
        for terminal in [status::COMPLETED, status::FAILED, status::CANCELLED] {
            assert!(!transition_allowed(terminal, status::PAUSED));
            assert!(!transition_allowed(terminal, status::CANCELLED));
            assert!(!transition_allowed(terminal, status::QUEUED));
        }
    }
}
