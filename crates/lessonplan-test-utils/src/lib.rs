//! Shared test utilities for lessonplan integration tests.
//!
//! Provides one PostgreSQL server per test binary. Each test gets its own
//! database on that server, so tests never see each other's rows.
//!
//! Two modes:
//! - **`LESSONPLAN_TEST_PG_URL`** set: use that server directly (CI service
//!   container, local PostgreSQL). The URL must not include a database name.
//! - **No env var**: start a container via testcontainers, shared per test
//!   binary through a `OnceCell`.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::ContainerAsync;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use lessonplan_db::pool;

/// Environment variable naming an already-running server.
pub const EXTERNAL_PG_ENV: &str = "LESSONPLAN_TEST_PG_URL";

struct SharedPg {
    base_url: String,
    /// Keeps the container alive for the lifetime of the test binary.
    _container: Option<ContainerAsync<Postgres>>,
}

static SHARED_PG: OnceCell<SharedPg> = OnceCell::const_new();

async fn init_shared_pg() -> SharedPg {
    if let Ok(url) = std::env::var(EXTERNAL_PG_ENV) {
        return SharedPg {
            base_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("17")
        .start()
        .await
        .expect("failed to start PostgreSQL container");

    let host = container.get_host().await.expect("failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("failed to get mapped port");

    SharedPg {
        base_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Server URL without a database name. Starts the container on first use.
pub async fn pg_url() -> &'static str {
    let shared = SHARED_PG.get_or_init(init_shared_pg).await;
    &shared.base_url
}

async fn maintenance_pool() -> PgPool {
    let url = format!("{}/postgres", pg_url().await);
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&url)
        .await
        .expect("failed to connect to maintenance database")
}

/// Create a uniquely-named database with no tables in it.
///
/// Returns `(pool, db_name)`. Used directly by migration tests; everything
/// else wants [`create_test_db`].
pub async fn create_empty_test_db() -> (PgPool, String) {
    let db_name = format!("lessonplan_test_{}", Uuid::new_v4().simple());

    let maint = maintenance_pool().await;
    maint
        .execute(format!("CREATE DATABASE {db_name}").as_str())
        .await
        .unwrap_or_else(|e| panic!("failed to create temp database {db_name}: {e}"));
    maint.close().await;

    let url = format!("{}/{db_name}", pg_url().await);
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to temp database {db_name}: {e}"));

    (db_pool, db_name)
}

/// Create a uniquely-named database with all migrations applied.
///
/// Call [`drop_test_db`] with the returned name when the test is done.
pub async fn create_test_db() -> (PgPool, String) {
    let (db_pool, db_name) = create_empty_test_db().await;
    pool::run_migrations(&db_pool)
        .await
        .expect("migrations should succeed");
    (db_pool, db_name)
}

/// Drop a database created by this module.
///
/// Terminates lingering connections first. Safe to call twice.
pub async fn drop_test_db(db_name: &str) {
    let maint = maintenance_pool().await;

    let terminate = format!(
        "SELECT pg_terminate_backend(pid) \
         FROM pg_stat_activity \
         WHERE datname = '{db_name}' AND pid <> pg_backend_pid()"
    );
    let _ = maint.execute(terminate.as_str()).await;
    let _ = maint
        .execute(format!("DROP DATABASE IF EXISTS {db_name}").as_str())
        .await;
    maint.close().await;
}
