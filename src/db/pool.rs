//! Database connection pool
//!
//! This module creates the SQLite connection pool used by the repositories.
//! File-backed databases get their parent directory created on demand and
//! are opened in read-write-create mode, so a fresh deployment needs no
//! manual setup.

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Create the SQLite connection pool from configuration.
///
/// Accepts `:memory:`, `sqlite:...` URLs, or plain file paths. Foreign key
/// enforcement is switched on for every pool; the schema relies on
/// `ON DELETE CASCADE` for module and content rows.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let url = &config.url;
    let is_memory = url == ":memory:" || url.starts_with("sqlite::memory:");

    // Ensure the database directory exists for file-based SQLite
    if !is_memory {
        let path = url.strip_prefix("sqlite:").unwrap_or(url);
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }
    }

    let connection_url = if url.starts_with("sqlite:") {
        url.to_string()
    } else if is_memory {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}", url)
    };

    // foreign_keys is a per-connection pragma, so it goes in the connect
    // options rather than a one-off query against the pool
    let options = SqliteConnectOptions::from_str(&connection_url)
        .with_context(|| format!("Invalid SQLite URL: {}", url))?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database exists per connection; the pool must hold
    // exactly one and never recycle it, or the schema vanishes
    let pool_options = if is_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(20)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", url))?;

    Ok(pool)
}

/// Create an in-memory database pool for testing
pub async fn create_test_pool() -> Result<SqlitePool> {
    let config = DatabaseConfig {
        url: ":memory:".to_string(),
    };
    create_pool(&config).await
}
