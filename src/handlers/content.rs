use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    entities::{gold_prices, prayer_times, prelude::*},
    jobs::prayer_times_sync::location_key,
    models::{
        common::ErrorResponse,
        content::{GoldPriceQuery, PrayerTimesQuery},
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

/// Handler for GET /api/prayer-times
/// Cached read: serves only what the sync engine has already ingested.
pub async fn get_prayer_times(
    State(state): State<AppState>,
    Query(query): Query<PrayerTimesQuery>,
) -> Result<Json<prayer_times::Model>, HandlerError> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let method = query.method.unwrap_or(2);
    let school = query.school.unwrap_or(0);
    let date = match query.date.as_deref() {
        Some(date) => chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Invalid date: '{}'", date),
                }),
            )
        })?,
        None => Utc::now().date_naive(),
    };

    let key = location_key(query.latitude, query.longitude, method, school);

    let row = PrayerTimes::find()
        .filter(prayer_times::Column::LocationKey.eq(&key))
        .filter(prayer_times::Column::Date.eq(date))
        .one(&state.db)
        .await
        .map_err(internal_error)?;

    let row = row.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!(
                    "No prayer times synced for this location on {}. Trigger a prayer_times sync first",
                    date
                ),
            }),
        )
    })?;

    Ok(Json(row))
}

/// Handler for GET /api/gold-prices
/// Recent observations, newest first, bounded by the days window.
pub async fn get_gold_prices(
    State(state): State<AppState>,
    Query(query): Query<GoldPriceQuery>,
) -> Result<Json<Vec<gold_prices::Model>>, HandlerError> {
    if let Err(e) = query.validate() {
        return Err((StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })));
    }

    let since = Utc::now().naive_utc() - chrono::Duration::days(query.days.unwrap_or(7));

    let mut find = GoldPrices::find().filter(gold_prices::Column::FetchedAt.gte(since));

    if let Some(metal) = query.metal {
        find = find.filter(gold_prices::Column::Metal.eq(metal));
    }
    if let Some(category) = query.category {
        find = find.filter(gold_prices::Column::Category.eq(category));
    }

    let prices = find
        .order_by(gold_prices::Column::FetchedAt, Order::Desc)
        .limit(1000)
        .all(&state.db)
        .await
        .map_err(internal_error)?;

    Ok(Json(prices))
}
