use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use sea_orm::{EntityTrait, Order, QueryOrder};

use crate::{
    entities::ip_blocking_rules::{self, Entity as IpBlockingRules},
    models::{common::ErrorResponse, rate_limit::BlockIpRequest},
    services::ip_blocklist,
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

/// Handler for GET /api/admin/ip-blocks
pub async fn list_blocks(
    State(state): State<AppState>,
) -> Result<Json<Vec<ip_blocking_rules::Model>>, HandlerError> {
    let rules = IpBlockingRules::find()
        .order_by(ip_blocking_rules::Column::BlockedAt, Order::Desc)
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    Ok(Json(rules))
}

/// Handler for POST /api/admin/ip-blocks
pub async fn block_ip(
    State(state): State<AppState>,
    Json(request): Json<BlockIpRequest>,
) -> Result<(StatusCode, Json<ip_blocking_rules::Model>), HandlerError> {
    if let Err(e) = request.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let expires_at = request
        .expires_in_secs
        .map(|secs| Utc::now().naive_utc() + Duration::seconds(secs));

    let rule = ip_blocklist::block(
        &state.db,
        &request.ip_address,
        request.reason,
        expires_at,
        request.created_by,
    )
    .await
    .map_err(internal_error)?;

    Ok((StatusCode::CREATED, Json(rule)))
}

/// Handler for DELETE /api/admin/ip-blocks/{ip}
pub async fn unblock_ip(
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> Result<StatusCode, HandlerError> {
    let removed = ip_blocklist::unblock(&state.db, &ip)
        .await
        .map_err(internal_error)?;

    if !removed {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("No block rule for '{}'", ip),
            }),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}
