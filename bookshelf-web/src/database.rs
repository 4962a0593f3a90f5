//! SQLite persistence for users and books

pub mod books;
pub mod users;

pub use books::SqliteResourceStore;
pub use users::SqliteCredentialStore;

use crate::{WebError, WebResult};
use bookshelf_core::{BookshelfError, DatabaseConfig, ErrorContext};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use tracing::{debug, error, info};

/// Open the pool and make sure the tables exist
pub async fn connect(config: &DatabaseConfig) -> WebResult<SqlitePool> {
    info!("🔗 Connecting to database: {}", config.url);

    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| WebError::Database(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to `:memory:` is a separate database, so keep exactly one alive
    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options.connect_with(options).await.map_err(|e| {
        error!("❌ Database connection failed: {}", e);
        WebError::Database(format!("Failed to connect to database: {}", e))
    })?;

    create_tables(&pool).await?;
    info!("✅ Database ready");

    Ok(pool)
}

async fn create_tables(pool: &SqlitePool) -> WebResult<()> {
    debug!("📋 Creating users table...");
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| WebError::Database(format!("Failed to create users table: {}", e)))?;

    debug!("📋 Creating books table...");
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            owner_id INTEGER NOT NULL REFERENCES users(id),
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| WebError::Database(format!("Failed to create books table: {}", e)))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_books_owner_id ON books(owner_id)")
        .execute(pool)
        .await
        .map_err(|e| WebError::Database(format!("Failed to create books index: {}", e)))?;

    Ok(())
}

/// Wrap a driver failure as an unavailable store, logging it once here
pub(crate) fn store_failure(operation: &str, e: sqlx::Error) -> BookshelfError {
    error!("Database {} failed: {}", operation, e);
    BookshelfError::StoreUnavailable {
        message: format!("{operation} failed"),
        source: Some(Box::new(e)),
        context: ErrorContext::new("sqlite").with_operation(operation),
    }
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, BookshelfError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| bookshelf_core::internal_error!(format!("Bad timestamp '{raw}'"), "sqlite", e))
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    connect(&DatabaseConfig::default()).await.unwrap()
}
