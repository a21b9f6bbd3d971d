//! Database layer
//!
//! This module provides database access for the Coursely service. SQLite is
//! the only backend, chosen for single-binary deployment; migrations are
//! embedded in the binary as SQL strings.
//!
//! # Usage
//!
//! ```ignore
//! use coursely::config::DatabaseConfig;
//! use coursely::db::{create_pool, migrations};
//!
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
