//! Integration tests for the admin API surface.
//!
//! These exercise the routers against a real database and Redis; they stay
//! on validation and not-found paths so they hold regardless of what data
//! is present.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use deenhub_backend::{
    handlers::{analytics, rate_limit_rules, sync_admin},
    jobs::SyncConfig,
    scrapers::gold::GoldPriceScraper,
    services::{
        aladhan::AladhanService, quran_api::QuranApiService, rate_limiter::RateLimiterService,
        sunnah_api::SunnahApiService, translator::TranslationService, upstream::UpstreamClient,
    },
    AppState,
};

async fn setup_test_app() -> Router {
    dotenvy::dotenv().ok();

    let db = common::setup_test_db()
        .await
        .expect("Failed to connect to test database");
    let redis = common::setup_test_redis().await;

    let upstream = UpstreamClient::new(5, 0);

    let state = AppState {
        db,
        redis: redis.clone(),
        aladhan: AladhanService::new("http://localhost:9/v1".into(), upstream.clone()),
        quran: QuranApiService::new("http://localhost:9/v4".into(), upstream.clone()),
        sunnah: SunnahApiService::new("http://localhost:9/v1".into(), upstream.clone()),
        translator: TranslationService::new("http://localhost:9/api".into(), upstream.clone()),
        gold_scraper: GoldPriceScraper::new("http://localhost:9/gold".into(), upstream),
        rate_limiter: RateLimiterService::new(redis),
        config: SyncConfig::default(),
    };

    Router::new()
        .route("/api/admin/sync/{domain}", post(sync_admin::trigger_sync))
        .route("/api/admin/jobs/{id}", get(sync_admin::get_job))
        .route("/api/admin/sync-runs", get(sync_admin::list_sync_runs))
        .route(
            "/api/admin/rate-limit-rules",
            get(rate_limit_rules::list_rules).post(rate_limit_rules::create_rule),
        )
        .route(
            "/api/admin/analytics/top-endpoints",
            get(analytics::top_endpoints),
        )
        .with_state(state)
}

async fn body_string(response: axum::response::Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_trigger_sync_unknown_domain() {
    let response = setup_test_app()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/sync/not-a-domain")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("Unknown sync domain"));
}

#[tokio::test]
async fn test_trigger_sync_known_domain_returns_job_handle() {
    let response = setup_test_app()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/sync/gold_prices")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"dry_run": true}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("job_id"));
    assert!(body.contains("queued"));
}

#[tokio::test]
async fn test_get_job_not_found() {
    let response = setup_test_app()
        .await
        .oneshot(
            Request::builder()
                .uri("/api/admin/jobs/00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_runs_invalid_status_filter() {
    let response = setup_test_app()
        .await
        .oneshot(
            Request::builder()
                .uri("/api/admin/sync-runs?status=done")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("Invalid status filter"));
}

#[tokio::test]
async fn test_sync_runs_invalid_date_filter() {
    let response = setup_test_app()
        .await
        .oneshot(
            Request::builder()
                .uri("/api/admin/sync-runs?from=01-01-2026")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sync_runs_valid_filters_return_page() {
    let response = setup_test_app()
        .await
        .oneshot(
            Request::builder()
                .uri("/api/admin/sync-runs?status=partial&from=2026-01-01&per_page=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("items"));
    assert!(body.contains("total"));
}

#[tokio::test]
async fn test_create_rate_limit_rule_rejects_bad_endpoint() {
    let response = setup_test_app()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/rate-limit-rules")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"endpoint": "no-slash", "limit_count": 10, "window_seconds": 60}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_string(response).await;
    assert!(body.contains("must start with '/'"));
}

#[tokio::test]
async fn test_create_rate_limit_rule_rejects_mid_wildcard() {
    let response = setup_test_app()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/rate-limit-rules")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"endpoint": "/a/*/b", "limit_count": 10, "window_seconds": 60}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_rate_limit_rules() {
    let response = setup_test_app()
        .await
        .oneshot(
            Request::builder()
                .uri("/api/admin/rate-limit-rules")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_top_endpoints_rejects_oversize_limit() {
    let response = setup_test_app()
        .await
        .oneshot(
            Request::builder()
                .uri("/api/admin/analytics/top-endpoints?limit=500")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
