use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    entities::{sync_jobs, sync_runs},
    jobs::SyncTarget,
    models::{
        common::{ErrorResponse, Paginated},
        sync::{JobListQuery, SyncRunQuery, TriggerSyncRequest, TriggerSyncResponse},
    },
    services::{job_queue, sync_ledger},
    AppState,
};

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn internal_error(e: impl std::fmt::Display) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Database error: {}", e),
        }),
    )
}

fn bad_request(message: String) -> HandlerError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
}

fn not_found(message: String) -> HandlerError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message }))
}

/// Handler for POST /api/admin/sync/{domain}
/// Enqueues a sync job and returns the handle immediately; progress is
/// polled via the job endpoints, never awaited here.
pub async fn trigger_sync(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(request): Json<TriggerSyncRequest>,
) -> Result<Json<TriggerSyncResponse>, HandlerError> {
    let Some(target) = SyncTarget::from_str(&domain) else {
        return Err(bad_request(format!(
            "Unknown sync domain: '{}'. Valid domains: {}",
            domain,
            SyncTarget::ALL
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )));
    };

    let job_id = job_queue::enqueue(
        &state.db,
        target.as_str(),
        target.job_name(),
        request.into_payload(),
    )
    .await
    .map_err(internal_error)?;

    Ok(Json(TriggerSyncResponse {
        job_id,
        job_type: target.as_str().to_string(),
        status: job_queue::status::QUEUED.to_string(),
    }))
}

/// Handler for GET /api/admin/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<sync_jobs::Model>, HandlerError> {
    let job = job_queue::find_job(&state.db, id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found(format!("Job '{}' not found", id)))?;

    Ok(Json(job))
}

/// Handler for GET /api/admin/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Paginated<sync_jobs::Model>>, HandlerError> {
    let page = query.page.unwrap_or(0);
    let per_page = query.per_page.unwrap_or(25).clamp(1, 200);

    let (jobs, total) = job_queue::find_jobs(
        &state.db,
        query.status.clone(),
        query.job_type.clone(),
        page,
        per_page,
    )
    .await
    .map_err(internal_error)?;

    Ok(Json(Paginated {
        items: jobs,
        total,
        page,
        per_page,
    }))
}

async fn transition(
    state: &AppState,
    id: Uuid,
    requested: &str,
) -> Result<Json<sync_jobs::Model>, HandlerError> {
    let applied = job_queue::request_transition(&state.db, id, requested)
        .await
        .map_err(internal_error)?;

    if !applied {
        return Err(bad_request(format!(
            "Job '{}' not found or cannot transition to {}",
            id, requested
        )));
    }

    let job = job_queue::find_job(&state.db, id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found(format!("Job '{}' not found", id)))?;

    Ok(Json(job))
}

/// Handler for POST /api/admin/jobs/{id}/cancel
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<sync_jobs::Model>, HandlerError> {
    transition(&state, id, job_queue::status::CANCELLED).await
}

/// Handler for POST /api/admin/jobs/{id}/pause
pub async fn pause_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<sync_jobs::Model>, HandlerError> {
    transition(&state, id, job_queue::status::PAUSED).await
}

/// Handler for POST /api/admin/jobs/{id}/resume
pub async fn resume_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<sync_jobs::Model>, HandlerError> {
    transition(&state, id, job_queue::status::QUEUED).await
}

/// Handler for GET /api/admin/sync-runs
pub async fn list_sync_runs(
    State(state): State<AppState>,
    Query(query): Query<SyncRunQuery>,
) -> Result<Json<Paginated<sync_runs::Model>>, HandlerError> {
    if let Err(e) = query.validate() {
        return Err(bad_request(e));
    }

    let page = query.page.unwrap_or(0);
    let per_page = query.per_page.unwrap_or(25).clamp(1, 200);

    let filter = sync_ledger::RunFilter {
        job_name: query.job_name.clone(),
        resource: query.resource.clone(),
        status: query.status.clone(),
        from: query.from_datetime(),
        to: query.to_datetime(),
    };

    let (runs, total) = sync_ledger::find_runs(&state.db, filter, page, per_page)
        .await
        .map_err(internal_error)?;

    Ok(Json(Paginated {
        items: runs,
        total,
        page,
        per_page,
    }))
}
