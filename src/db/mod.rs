pub mod images;
pub mod models;
pub mod recipes;

use crate::config::DatabaseConfig;
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub type DbPool = Pool<Sqlite>;

fn is_in_memory(database_url: &str) -> bool {
    database_url
        .strip_prefix("sqlite:")
        .is_some_and(|path| path.starts_with(":memory:") || path.contains("mode=memory"))
}

/// Create the parent directory of a file-backed SQLite database
async fn ensure_database_dir(database_url: &str) -> Result<()> {
    if is_in_memory(database_url) {
        return Ok(());
    }
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        let path = path.trim_start_matches("//");
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }
    Ok(())
}

/// Initialize database connection pool
pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    ensure_database_dir(database_url).await?;

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    if is_in_memory(database_url) {
        // An in-memory database lives only as long as its connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        return Ok(pool);
    }

    let pool = SqlitePool::connect_with(options).await?;
    Ok(pool)
}

/// Initialize database connection pool with custom configuration
pub async fn init_pool_with_config(config: &DatabaseConfig) -> Result<DbPool> {
    if is_in_memory(&config.url) {
        return init_pool(&config.url).await;
    }
    ensure_database_dir(&config.url).await?;

    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
