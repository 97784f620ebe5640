use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::{
    entities::{api_endpoint_stats, translation_jobs},
    jobs::translation_worker,
    models::{
        analytics::AnalyticsWindowQuery,
        common::{ErrorResponse, Paginated},
        sync::TranslationJobQuery,
    },
    services::telemetry,
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

/// Handler for GET /api/admin/analytics/top-endpoints
pub async fn top_endpoints(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsWindowQuery>,
) -> Result<Json<Vec<api_endpoint_stats::Model>>, HandlerError> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let stats = telemetry::top_endpoints(&state.db, query.limit())
        .await
        .map_err(internal_error)?;

    Ok(Json(stats))
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status_code: i32,
    pub count: i64,
}

/// Handler for GET /api/admin/analytics/error-rates
pub async fn error_rates(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsWindowQuery>,
) -> Result<Json<Vec<StatusCount>>, HandlerError> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let counts = telemetry::error_rates_by_status(&state.db, query.hours())
        .await
        .map_err(internal_error)?;

    Ok(Json(
        counts
            .into_iter()
            .map(|(status_code, count)| StatusCount { status_code, count })
            .collect(),
    ))
}

/// Handler for GET /api/admin/analytics/trend
pub async fn traffic_trend(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsWindowQuery>,
) -> Result<Json<Vec<telemetry::TrendBucket>>, HandlerError> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let trend = telemetry::traffic_trend(&state.db, query.hours())
        .await
        .map_err(internal_error)?;

    Ok(Json(trend))
}

/// Handler for GET /api/admin/translation-jobs
pub async fn list_translation_jobs(
    State(state): State<AppState>,
    Query(query): Query<TranslationJobQuery>,
) -> Result<Json<Paginated<translation_jobs::Model>>, HandlerError> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let page = query.page.unwrap_or(0);
    let per_page = query.per_page.unwrap_or(25).clamp(1, 200);

    let mut find = translation_jobs::Entity::find();
    if let Some(status) = query.status {
        find = find.filter(translation_jobs::Column::Status.eq(status));
    }

    let paginator = find
        .order_by(translation_jobs::Column::CreatedAt, Order::Desc)
        .paginate(&state.db, per_page);

    let total = paginator.num_items().await.map_err(internal_error)?;
    let jobs = paginator.fetch_page(page).await.map_err(internal_error)?;

    Ok(Json(Paginated {
        items: jobs,
        total,
        page,
        per_page,
    }))
}

/// Handler for POST /api/admin/translation-jobs/{id}/retry
/// Resets a failed job past the automatic retry cap back to pending.
pub async fn retry_translation_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HandlerError> {
    let reset = translation_worker::retry_job(&state.db, id)
        .await
        .map_err(internal_error)?;

    if !reset {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Translation job '{}' not found or not in failed state", id),
            }),
        ));
    }

    Ok(StatusCode::ACCEPTED)
}
