//! Database migrations module
//!
//! Code-based migrations for the Coursely service. All migrations are
//! embedded as SQL strings for single-binary deployment and tracked in a
//! `_migrations` table.
//!
//! # Usage
//!
//! ```ignore
//! use coursely::db::{create_pool, migrations};
//!
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number (must be unique and sequential)
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements
    pub up: &'static str,
}

/// Migration record stored in the database
#[derive(Debug, Clone)]
pub struct MigrationRecord {
    /// Migration version number
    pub version: i64,
    /// Migration name/description
    pub name: String,
    /// When the migration was applied
    pub applied_at: DateTime<Utc>,
}

/// All migrations for the Coursely service.
pub const MIGRATIONS: &[Migration] = &[
    // Migration 1: users
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                email VARCHAR(255) NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                role VARCHAR(20) NOT NULL DEFAULT 'student',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_username ON users(username);
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
        "#,
    },
    // Migration 2: sessions
    Migration {
        version: 2,
        name: "create_sessions",
        up: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#,
    },
    // Migration 3: subjects (static reference taxonomy, default row seeded)
    Migration {
        version: 3,
        name: "create_subjects",
        up: r#"
            CREATE TABLE IF NOT EXISTS subjects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(200) NOT NULL,
                slug VARCHAR(200) NOT NULL UNIQUE
            );
            CREATE INDEX IF NOT EXISTS idx_subjects_slug ON subjects(slug);
            INSERT OR IGNORE INTO subjects (title, slug)
            VALUES ('General', 'general');
        "#,
    },
    // Migration 4: courses
    Migration {
        version: 4,
        name: "create_courses",
        up: r#"
            CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                subject_id INTEGER NOT NULL,
                title VARCHAR(200) NOT NULL,
                slug VARCHAR(200) NOT NULL UNIQUE,
                overview TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (subject_id) REFERENCES subjects(id)
            );
            CREATE INDEX IF NOT EXISTS idx_courses_owner_id ON courses(owner_id);
            CREATE INDEX IF NOT EXISTS idx_courses_subject_id ON courses(subject_id);
            CREATE INDEX IF NOT EXISTS idx_courses_slug ON courses(slug);
        "#,
    },
    // Migration 5: modules
    // sort_order is renumbered contiguously inside formset transactions, so
    // it carries a plain index rather than a UNIQUE constraint.
    Migration {
        version: 5,
        name: "create_modules",
        up: r#"
            CREATE TABLE IF NOT EXISTS modules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_id INTEGER NOT NULL,
                title VARCHAR(200) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (course_id) REFERENCES courses(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_modules_course_order ON modules(course_id, sort_order);
        "#,
    },
    // Migration 6: polymorphic item tables
    Migration {
        version: 6,
        name: "create_items",
        up: r#"
            CREATE TABLE IF NOT EXISTS text_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                title VARCHAR(250) NOT NULL,
                body TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS video_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                title VARCHAR(250) NOT NULL,
                url VARCHAR(2000) NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS image_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                title VARCHAR(250) NOT NULL,
                image VARCHAR(2000) NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE TABLE IF NOT EXISTS file_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                title VARCHAR(250) NOT NULL,
                file VARCHAR(2000) NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            );
        "#,
    },
    // Migration 7: content associations
    // (item_kind, item_id) is a tagged reference into one of the four item
    // tables, so it cannot carry a foreign key; item cleanup is done by the
    // services inside the same transaction as the association delete.
    Migration {
        version: 7,
        name: "create_contents",
        up: r#"
            CREATE TABLE IF NOT EXISTS contents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                module_id INTEGER NOT NULL,
                item_kind VARCHAR(10) NOT NULL,
                item_id INTEGER NOT NULL,
                sort_order INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (module_id) REFERENCES modules(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_contents_module_order ON contents(module_id, sort_order);
            CREATE INDEX IF NOT EXISTS idx_contents_item ON contents(item_kind, item_id);
        "#,
    },
];

/// Run all pending migrations.
///
/// Returns the number of migrations applied.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize> {
    create_migrations_table(pool).await?;

    let applied = get_applied_migrations(pool).await?;
    let applied_versions: Vec<i32> = applied.iter().map(|m| m.version as i32).collect();

    let mut count = 0;

    for migration in MIGRATIONS {
        if !applied_versions.contains(&migration.version) {
            tracing::info!(
                "Applying migration {}: {}",
                migration.version,
                migration.name
            );
            apply_migration(pool, migration)
                .await
                .with_context(|| format!("Failed to apply migration: {}", migration.name))?;
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Applied {} migration(s)", count);
    } else {
        tracing::debug!("No pending migrations");
    }

    Ok(count)
}

/// Create the migrations tracking table if it doesn't exist
async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create migrations table")?;
    Ok(())
}

/// Get list of already applied migrations
async fn get_applied_migrations(pool: &SqlitePool) -> Result<Vec<MigrationRecord>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await?;

    let mut records = Vec::new();
    for row in rows {
        records.push(MigrationRecord {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        });
    }

    Ok(records)
}

/// Apply a single migration
async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    // Execute migration SQL (may contain multiple statements)
    for statement in split_sql_statements(migration.up) {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement)
                .execute(pool)
                .await
                .with_context(|| format!("Failed to execute: {}", truncate_sql(statement)))?;
        }
    }

    // Record the migration
    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await?;

    Ok(())
}

/// Truncate SQL for error messages, backing off to a char boundary
fn truncate_sql(sql: &str) -> String {
    const MAX_LEN: usize = 100;
    if sql.len() <= MAX_LEN {
        return sql.to_string();
    }
    let mut end = MAX_LEN;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &sql[..end])
}

/// Split SQL into individual statements, handling comments properly
fn split_sql_statements(sql: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let mut current_start = 0;
    let mut in_statement = false;

    for (i, c) in sql.char_indices() {
        match c {
            ';' => {
                if in_statement {
                    let stmt = sql[current_start..i].trim();
                    if !stmt.is_empty() && !is_comment_only(stmt) {
                        statements.push(stmt);
                    }
                    in_statement = false;
                }
                current_start = i + 1;
            }
            _ if !c.is_whitespace() && !in_statement => {
                current_start = i;
                in_statement = true;
            }
            _ => {}
        }
    }

    // Handle last statement without trailing semicolon
    if in_statement {
        let stmt = sql[current_start..].trim();
        if !stmt.is_empty() && !is_comment_only(stmt) {
            statements.push(stmt);
        }
    }

    statements
}

/// Check if a string contains only SQL comments
fn is_comment_only(s: &str) -> bool {
    for line in s.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with("--") {
            return false;
        }
    }
    true
}

/// Check if migrations are up to date
pub async fn is_up_to_date(pool: &SqlitePool) -> Result<bool> {
    let _ = create_migrations_table(pool).await;
    let applied = get_applied_migrations(pool).await?;
    Ok(applied.len() == MIGRATIONS.len())
}

/// Get the total number of migrations defined
pub fn total_migrations() -> usize {
    MIGRATIONS.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[test]
    fn test_truncate_sql_respects_char_boundaries() {
        let short = "SELECT 1";
        assert_eq!(truncate_sql(short), short);

        // Multi-byte char straddling the cut point must not split
        let long = format!("{}é{}", "-".repeat(99), "-".repeat(50));
        let truncated = truncate_sql(&long);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 103);
    }

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = create_test_pool().await.expect("Failed to create test pool");

        let count = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(count, MIGRATIONS.len());

        // Second run applies nothing
        let count = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_is_up_to_date() {
        let pool = create_test_pool().await.expect("Failed to create test pool");

        assert!(!is_up_to_date(&pool).await.expect("Check failed"));
        run_migrations(&pool).await.expect("Failed to run migrations");
        assert!(is_up_to_date(&pool).await.expect("Check failed"));
    }

    #[tokio::test]
    async fn test_default_subject_seeded() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        let row = sqlx::query("SELECT title FROM subjects WHERE slug = 'general'")
            .fetch_one(&pool)
            .await
            .expect("Default subject should exist");
        let title: String = row.get("title");
        assert_eq!(title, "General");
    }

    #[tokio::test]
    async fn test_module_cascade_on_course_delete() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        sqlx::query("INSERT INTO users (username, email, password_hash, role) VALUES ('u', 'u@e.c', 'h', 'instructor')")
            .execute(&pool)
            .await
            .expect("Failed to create user");
        sqlx::query("INSERT INTO courses (owner_id, subject_id, title, slug) VALUES (1, 1, 'C', 'c')")
            .execute(&pool)
            .await
            .expect("Failed to create course");
        sqlx::query("INSERT INTO modules (course_id, title) VALUES (1, 'M')")
            .execute(&pool)
            .await
            .expect("Failed to create module");

        sqlx::query("DELETE FROM courses WHERE id = 1")
            .execute(&pool)
            .await
            .expect("Failed to delete course");

        let row = sqlx::query("SELECT COUNT(*) as count FROM modules")
            .fetch_one(&pool)
            .await
            .expect("Count failed");
        let count: i64 = row.get("count");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_content_cascade_on_module_delete() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        sqlx::query("INSERT INTO users (username, email, password_hash, role) VALUES ('u', 'u@e.c', 'h', 'instructor')")
            .execute(&pool)
            .await
            .expect("Failed to create user");
        sqlx::query("INSERT INTO courses (owner_id, subject_id, title, slug) VALUES (1, 1, 'C', 'c')")
            .execute(&pool)
            .await
            .expect("Failed to create course");
        sqlx::query("INSERT INTO modules (course_id, title) VALUES (1, 'M')")
            .execute(&pool)
            .await
            .expect("Failed to create module");
        sqlx::query("INSERT INTO contents (module_id, item_kind, item_id, sort_order) VALUES (1, 'text', 1, 0)")
            .execute(&pool)
            .await
            .expect("Failed to create content");

        sqlx::query("DELETE FROM modules WHERE id = 1")
            .execute(&pool)
            .await
            .expect("Failed to delete module");

        let row = sqlx::query("SELECT COUNT(*) as count FROM contents")
            .fetch_one(&pool)
            .await
            .expect("Count failed");
        let count: i64 = row.get("count");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_course_slug_rejected() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        run_migrations(&pool).await.expect("Failed to run migrations");

        sqlx::query("INSERT INTO users (username, email, password_hash, role) VALUES ('u', 'u@e.c', 'h', 'instructor')")
            .execute(&pool)
            .await
            .expect("Failed to create user");
        sqlx::query("INSERT INTO courses (owner_id, subject_id, title, slug) VALUES (1, 1, 'A', 'dup')")
            .execute(&pool)
            .await
            .expect("Failed to create course");

        let result = sqlx::query(
            "INSERT INTO courses (owner_id, subject_id, title, slug) VALUES (1, 1, 'B', 'dup')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "Duplicate slug should be rejected");
    }

    #[test]
    fn test_split_sql_statements() {
        let sql = "CREATE TABLE a (id INT); CREATE TABLE b (id INT);";
        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);

        let sql_with_comments = "-- Comment\nCREATE TABLE a (id INT);";
        let statements = split_sql_statements(sql_with_comments);
        assert_eq!(statements.len(), 1);
    }

    #[test]
    fn test_is_comment_only() {
        assert!(is_comment_only("-- This is a comment"));
        assert!(is_comment_only("-- Line 1\n-- Line 2"));
        assert!(!is_comment_only("CREATE TABLE test"));
        assert!(!is_comment_only("-- Comment\nCREATE TABLE test"));
    }

    #[test]
    fn test_total_migrations() {
        assert_eq!(total_migrations(), 7);
    }
}
