use redis::aio::ConnectionManager;
use sea_orm::{Database, DatabaseConnection, DbErr};
use std::env;

/// Set up test database connection
/// Uses TEST_DATABASE_URL environment variable or falls back to default
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://deenhub_user@localhost:5432/deenhub_test".to_string()
    });

    Database::connect(&database_url).await
}

/// Set up test Redis connection for rate-limit counters
pub async fn setup_test_redis() -> ConnectionManager {
    let redis_url =
        env::var("TEST_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

    let client = redis::Client::open(redis_url).expect("Invalid TEST_REDIS_URL");
    ConnectionManager::new(client)
        .await
        .expect("Failed to connect to test Redis")
}
