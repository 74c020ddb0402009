// Shared test helpers for database setup and offline scan contexts.
//
// These utilities are used across the integration test files to avoid
// duplicating pool and context construction.

use std::sync::Arc;

use sqlx::SqlitePool;

use url_sentry::initialization::{init_client, init_redirect_client, init_resolver};
use url_sentry::{run_migrations, Config, ScanContext, ScanStats};

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Builds a scan context that never gets a useful network answer: the
/// collector budget is one millisecond, and no reputation, breach, or IP
/// providers are configured. Collectors that need the network settle as
/// unavailable; computed collectors still answer.
#[allow(dead_code)] // Used by other test files
pub fn offline_context(pool: SqlitePool) -> ScanContext {
    let config = Config {
        collector_budget_ms: 1,
        timeout_seconds: 1,
        ..Default::default()
    };
    let client = init_client(&config).expect("client init");
    let redirect_client = init_redirect_client(&config).expect("redirect client init");

    ScanContext {
        client,
        redirect_client,
        resolver: init_resolver(),
        pool: Arc::new(pool),
        config: Arc::new(config),
        stats: Arc::new(ScanStats::new()),
        learning_sink: None,
    }
}
