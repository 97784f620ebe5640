use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Order, QueryOrder, Set};

use crate::{
    entities::rate_limit_rules::{self, Entity as RateLimitRules},
    models::{
        common::ErrorResponse,
        rate_limit::{CreateRateLimitRuleRequest, UpdateRateLimitRuleRequest},
    },
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

/// Handler for GET /api/admin/rate-limit-rules
pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<Vec<rate_limit_rules::Model>>, HandlerError> {
    let rules = RateLimitRules::find()
        .order_by(rate_limit_rules::Column::Id, Order::Asc)
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    Ok(Json(rules))
}

/// Handler for POST /api/admin/rate-limit-rules
pub async fn create_rule(
    State(state): State<AppState>,
    Json(request): Json<CreateRateLimitRuleRequest>,
) -> Result<(StatusCode, Json<rate_limit_rules::Model>), HandlerError> {
    if let Err(e) = request.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let now = Utc::now().naive_utc();
    let rule = rate_limit_rules::ActiveModel {
        endpoint: Set(request.endpoint),
        method: Set(request.method),
        limit_count: Set(request.limit_count),
        window_seconds: Set(request.window_seconds),
        enabled: Set(request.enabled),
        description: Set(request.description),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let rule = rule.insert(&state.db).await.map_err(internal_error)?;
    state.rate_limiter.invalidate_rules().await;

    tracing::info!(
        "Created rate limit rule {} {} -> {}/{}s",
        rule.method,
        rule.endpoint,
        rule.limit_count,
        rule.window_seconds
    );

    Ok((StatusCode::CREATED, Json(rule)))
}

/// Handler for PUT /api/admin/rate-limit-rules/{id}
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateRateLimitRuleRequest>,
) -> Result<Json<rate_limit_rules::Model>, HandlerError> {
    if let Err(e) = request.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let rule = RateLimitRules::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Rule '{}' not found", id),
                }),
            )
        })?;

    let mut active: rate_limit_rules::ActiveModel = rule.into();
    if let Some(limit_count) = request.limit_count {
        active.limit_count = Set(limit_count);
    }
    if let Some(window_seconds) = request.window_seconds {
        active.window_seconds = Set(window_seconds);
    }
    if let Some(enabled) = request.enabled {
        active.enabled = Set(enabled);
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let rule = active.update(&state.db).await.map_err(internal_error)?;
    state.rate_limiter.invalidate_rules().await;

    Ok(Json(rule))
}

/// Handler for DELETE /api/admin/rate-limit-rules/{id}
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, HandlerError> {
    let result = RateLimitRules::delete_by_id(id)
        .exec(&state.db)
        .await
        .map_err(internal_error)?;

    if result.rows_affected == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Rule '{}' not found", id),
            }),
        ));
    }

    state.rate_limiter.invalidate_rules().await;
    Ok(StatusCode::NO_CONTENT)
}
