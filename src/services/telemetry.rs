//! Request telemetry aggregator
//!
//! Every request appends an immutable log row and folds its latency into
//! per-endpoint and per-client running aggregates with an online mean:
//! new_avg = (old_avg * old_count + value) / (old_count + 1). The fold is a
//! single atomic upsert, so concurrent requests never lose updates and
//! aggregates are never rebuilt by scanning history.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, FromQueryResult, Order, QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};

use crate::entities::api_endpoint_stats::{self, Entity as ApiEndpointStats};
use crate::entities::request_logs::{self, Entity as RequestLogs};

#[derive(Debug, Clone)]
pub struct RequestEntry {
    pub ip_address: String,
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
    pub latency_ms: i64,
    pub user_agent: Option<String>,
}

/// Fold one value into a running mean.
pub fn online_mean(old_avg: f64, old_count: i64, value: f64) -> f64 {
    (old_avg * old_count as f64 + value) / (old_count + 1) as f64
}

/// Record one request off the response path. Spawned fire-and-forget by the
/// middleware; failures are logged, never surfaced to the client.
pub fn record(db: DatabaseConnection, entry: RequestEntry) {
    tokio::spawn(async move {
        if let Err(e) = record_inner(&db, &entry).await {
            tracing::warn!(
                "Failed to record telemetry for {} {}: {}",
                entry.method,
                entry.endpoint,
                e
            );
        }
    });
}

async fn record_inner(
    db: &DatabaseConnection,
    entry: &RequestEntry,
) -> Result<(), sea_orm::DbErr> {
    let now = Utc::now().naive_utc();
    let is_error = entry.status_code >= 400;

    let log = request_logs::ActiveModel {
        ip_address: Set(entry.ip_address.clone()),
        endpoint: Set(entry.endpoint.clone()),
        method: Set(entry.method.clone()),
        status_code: Set(entry.status_code as i32),
        latency_ms: Set(entry.latency_ms as i32),
        user_agent: Set(entry.user_agent.clone()),
        requested_at: Set(now),
        ..Default::default()
    };
    log.insert(db).await?;

    // Atomic online-mean folds; the arithmetic runs inside the upsert so
    // concurrent writers cannot interleave a read-modify-write
    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        r#"
        INSERT INTO api_endpoint_stats (endpoint, method, request_count, error_count, avg_latency_ms, last_request)
        VALUES ($1, $2, 1, $3, $4, $5)
        ON CONFLICT (endpoint, method) DO UPDATE SET
            avg_latency_ms = (api_endpoint_stats.avg_latency_ms * api_endpoint_stats.request_count + EXCLUDED.avg_latency_ms)
                             / (api_endpoint_stats.request_count + 1),
            request_count = api_endpoint_stats.request_count + 1,
            error_count = api_endpoint_stats.error_count + EXCLUDED.error_count,
            last_request = EXCLUDED.last_request
        "#,
        vec![
            entry.endpoint.clone().into(),
            entry.method.clone().into(),
            i64::from(is_error).into(),
            (entry.latency_ms as f64).into(),
            now.into(),
        ],
    ))
    .await?;

    db.execute(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        r#"
        INSERT INTO client_ip_stats (ip_address, request_count, error_count, avg_latency_ms, last_request, blocked)
        VALUES ($1, 1, $2, $3, $4, false)
        ON CONFLICT (ip_address) DO UPDATE SET
            avg_latency_ms = (client_ip_stats.avg_latency_ms * client_ip_stats.request_count + EXCLUDED.avg_latency_ms)
                             / (client_ip_stats.request_count + 1),
            request_count = client_ip_stats.request_count + 1,
            error_count = client_ip_stats.error_count + EXCLUDED.error_count,
            last_request = EXCLUDED.last_request
        "#,
        vec![
            entry.ip_address.clone().into(),
            i64::from(is_error).into(),
            (entry.latency_ms as f64).into(),
            now.into(),
        ],
    ))
    .await?;

    Ok(())
}

/// Top endpoints by request volume, straight off the pre-aggregated rows.
pub async fn top_endpoints(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<api_endpoint_stats::Model>, sea_orm::DbErr> {
    ApiEndpointStats::find()
        .order_by(api_endpoint_stats::Column::RequestCount, Order::Desc)
        .limit(limit)
        .all(db)
        .await
}

/// Request counts grouped by status code over a bounded recent window.
pub async fn error_rates_by_status(
    db: &DatabaseConnection,
    window_hours: i64,
) -> Result<Vec<(i32, i64)>, sea_orm::DbErr> {
    let since = Utc::now().naive_utc() - Duration::hours(window_hours);

    RequestLogs::find()
        .select_only()
        .column(request_logs::Column::StatusCode)
        .column_as(request_logs::Column::Id.count(), "count")
        .filter(request_logs::Column::RequestedAt.gte(since))
        .group_by(request_logs::Column::StatusCode)
        .into_tuple::<(i32, i64)>()
        .all(db)
        .await
}

#[derive(Debug, FromQueryResult, serde::Serialize)]
pub struct TrendBucket {
    pub bucket: chrono::NaiveDateTime,
    pub request_count: i64,
    pub error_count: i64,
}

/// Hourly request/error trend over a bounded recent window.
pub async fn traffic_trend(
    db: &DatabaseConnection,
    window_hours: i64,
) -> Result<Vec<TrendBucket>, sea_orm::DbErr> {
    let since = Utc::now().naive_utc() - Duration::hours(window_hours);

    TrendBucket::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        r#"
        SELECT
            date_trunc('hour', requested_at) AS bucket,
            COUNT(*) AS request_count,
            COUNT(*) FILTER (WHERE status_code >= 400) AS error_count
        FROM request_logs
        WHERE requested_at >= $1
        GROUP BY bucket
        ORDER BY bucket
        "#,
        vec![since.into()],
    ))
    .all(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_mean_sequence() {
        // [100, 200, 300] arriving one at a time must land on 200
        let mut avg = 0.0;
        let mut count = 0i64;
        for value in [100.0, 200.0, 300.0] {
            avg = online_mean(avg, count, value);
            count += 1;
        }
        assert_eq!(avg, 200.0);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_online_mean_first_value() {
        assert_eq!(online_mean(0.0, 0, 150.0), 150.0);
    }

    #[test]
    fn test_online_mean_matches_full_recompute() {
        let values = [12.0, 99.0, 4.0, 250.0, 31.0];
        let mut avg = 0.0;
        for (i, v) in values.iter().enumerate() {
            avg = online_mean(avg, i as i64, *v);
        }
        let full: f64 = values.iter().sum::<f64>() / values.len() as f64;
        assert!((avg - full).abs() < 1e-9);
    }
}
