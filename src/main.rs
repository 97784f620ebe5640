use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use redis::aio::ConnectionManager;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deenhub_backend::{
    handlers::{analytics, content, ip_blocks, rate_limit_rules, sync_admin},
    jobs::{guard_sweep, scheduler, worker, SyncConfig},
    middleware::guard,
    scrapers::gold::GoldPriceScraper,
    services::{
        aladhan::AladhanService, quran_api::QuranApiService, rate_limiter::RateLimiterService,
        sunnah_api::SunnahApiService, translator::TranslationService, upstream::UpstreamClient,
    },
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,deenhub_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    // Connect to Redis (rate-limit windows)
    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
    tracing::info!("Connecting to Redis...");
    let redis_client = redis::Client::open(redis_url).expect("Invalid REDIS_URL");
    let redis = ConnectionManager::new(redis_client)
        .await
        .expect("Failed to connect to Redis");

    let config = SyncConfig::from_env();

    let timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30);
    let retry_max = env::var("UPSTREAM_RETRY_MAX")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3);
    let upstream = UpstreamClient::new(timeout_secs, retry_max);

    let aladhan_base =
        env::var("ALADHAN_BASE_URL").unwrap_or_else(|_| "https://api.aladhan.com/v1".into());
    let quran_base =
        env::var("QURAN_API_BASE_URL").unwrap_or_else(|_| "https://api.quran.com/api/v4".into());
    let sunnah_base =
        env::var("SUNNAH_API_BASE_URL").unwrap_or_else(|_| "https://api.sunnah.com/v1".into());
    let translator_base = env::var("TRANSLATOR_BASE_URL")
        .unwrap_or_else(|_| "https://translate.example.com/api".into());
    let gold_page_url = env::var("GOLD_PRICE_PAGE_URL")
        .unwrap_or_else(|_| "https://www.bajus.org/gold-price".into());

    let state = AppState {
        db,
        redis: redis.clone(),
        aladhan: AladhanService::new(aladhan_base, upstream.clone()),
        quran: QuranApiService::new(quran_base, upstream.clone()),
        sunnah: SunnahApiService::new(sunnah_base, upstream.clone()),
        translator: TranslationService::new(translator_base, upstream.clone()),
        gold_scraper: GoldPriceScraper::new(gold_page_url, upstream),
        rate_limiter: RateLimiterService::new(redis),
        config,
    };

    // Background tiers: workers drain the queue, the scheduler feeds it,
    // the sweep keeps expired IP blocks honest
    worker::start_workers(state.clone()).await;
    scheduler::start_scheduler(state.clone(), scheduler::default_definitions()).await;
    guard_sweep::start_guard_sweep(state.clone()).await;

    // Build router
    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        // Public cached reads
        .route("/api/prayer-times", get(content::get_prayer_times))
        .route("/api/gold-prices", get(content::get_gold_prices))
        // Sync engine administration
        .route("/api/admin/sync/{domain}", post(sync_admin::trigger_sync))
        .route("/api/admin/jobs", get(sync_admin::list_jobs))
        .route("/api/admin/jobs/{id}", get(sync_admin::get_job))
        .route("/api/admin/jobs/{id}/cancel", post(sync_admin::cancel_job))
        .route("/api/admin/jobs/{id}/pause", post(sync_admin::pause_job))
        .route("/api/admin/jobs/{id}/resume", post(sync_admin::resume_job))
        .route("/api/admin/sync-runs", get(sync_admin::list_sync_runs))
        // Guard rule management
        .route(
            "/api/admin/rate-limit-rules",
            get(rate_limit_rules::list_rules).post(rate_limit_rules::create_rule),
        )
        .route(
            "/api/admin/rate-limit-rules/{id}",
            put(rate_limit_rules::update_rule).delete(rate_limit_rules::delete_rule),
        )
        .route(
            "/api/admin/ip-blocks",
            get(ip_blocks::list_blocks).post(ip_blocks::block_ip),
        )
        .route("/api/admin/ip-blocks/{ip}", delete(ip_blocks::unblock_ip))
        // Telemetry
        .route(
            "/api/admin/analytics/top-endpoints",
            get(analytics::top_endpoints),
        )
        .route("/api/admin/analytics/error-rates", get(analytics::error_rates))
        .route("/api/admin/analytics/trend", get(analytics::traffic_trend))
        .route(
            "/api/admin/translation-jobs",
            get(analytics::list_translation_jobs),
        )
        .route(
            "/api/admin/translation-jobs/{id}/retry",
            post(analytics::retry_translation_job),
        )
        .layer(from_fn_with_state(state.clone(), guard))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let port = env::var("PORT").unwrap_or_else(|_| "3000".into());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

async fn health() -> &'static str {
    "ok"
}
