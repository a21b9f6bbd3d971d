//! Module repository
//!
//! Database operations for course modules, including the formset batch
//! apply. The batch runs in one transaction: deletes (with polymorphic item
//! cleanup), updates, appends, then a contiguous renumbering of whatever
//! survives.

use crate::models::Module;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// A validated batch of module changes for one course
#[derive(Debug, Default)]
pub struct ModuleChanges {
    /// Module IDs to delete
    pub deletes: Vec<i64>,
    /// (id, title, description) for existing modules
    pub updates: Vec<(i64, String, String)>,
    /// (title, description) for new modules, appended in order
    pub creates: Vec<(String, String)>,
}

impl ModuleChanges {
    /// Whether the batch contains no operations
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.updates.is_empty() && self.creates.is_empty()
    }
}

/// Module repository trait
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Get module by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Module>>;

    /// List modules of a course ordered by position
    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Module>>;

    /// Apply a validated formset batch atomically and return the surviving
    /// modules, renumbered contiguously from 0
    async fn apply_changes(&self, course_id: i64, changes: ModuleChanges) -> Result<Vec<Module>>;
}

/// SQLx-based module repository implementation
pub struct SqlxModuleRepository {
    pool: SqlitePool,
}

impl SqlxModuleRepository {
    /// Create a new SQLx module repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ModuleRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ModuleRepository for SqlxModuleRepository {
    async fn get_by_id(&self, id: i64) -> Result<Option<Module>> {
        let row = sqlx::query(
            "SELECT id, course_id, title, description, sort_order, created_at FROM modules WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get module by ID")?;

        Ok(row.map(|r| row_to_module(&r)))
    }

    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Module>> {
        let rows = sqlx::query(
            "SELECT id, course_id, title, description, sort_order, created_at
             FROM modules WHERE course_id = ? ORDER BY sort_order, id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list modules")?;

        Ok(rows.iter().map(row_to_module).collect())
    }

    async fn apply_changes(&self, course_id: i64, changes: ModuleChanges) -> Result<Vec<Module>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        // Deletes first, cleaning up the polymorphic item rows their
        // contents reference before the cascade removes the association rows.
        for module_id in &changes.deletes {
            for kind in ["text", "video", "image", "file"] {
                let sql = format!(
                    "DELETE FROM {}_items WHERE id IN (
                        SELECT c.item_id FROM contents c
                        JOIN modules m ON m.id = c.module_id
                        WHERE c.module_id = ? AND m.course_id = ? AND c.item_kind = ?
                    )",
                    kind
                );
                sqlx::query(&sql)
                    .bind(module_id)
                    .bind(course_id)
                    .bind(kind)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("Failed to delete {} items", kind))?;
            }

            sqlx::query("DELETE FROM modules WHERE id = ? AND course_id = ?")
                .bind(module_id)
                .bind(course_id)
                .execute(&mut *tx)
                .await
                .context("Failed to delete module")?;
        }

        for (id, title, description) in &changes.updates {
            sqlx::query(
                "UPDATE modules SET title = ?, description = ? WHERE id = ? AND course_id = ?",
            )
            .bind(title)
            .bind(description)
            .bind(id)
            .bind(course_id)
            .execute(&mut *tx)
            .await
            .context("Failed to update module")?;
        }

        // Append creates after the current maximum position
        let row = sqlx::query(
            "SELECT COALESCE(MAX(sort_order), -1) as max_order FROM modules WHERE course_id = ?",
        )
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read max module order")?;
        let mut next_order: i64 = row.get::<i64, _>("max_order") + 1;

        let now = Utc::now();
        for (title, description) in &changes.creates {
            sqlx::query(
                "INSERT INTO modules (course_id, title, description, sort_order, created_at)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(course_id)
            .bind(title)
            .bind(description)
            .bind(next_order)
            .bind(now)
            .execute(&mut *tx)
            .await
            .context("Failed to create module")?;
            next_order += 1;
        }

        // Renumber survivors contiguously from 0, preserving relative order
        let rows = sqlx::query(
            "SELECT id FROM modules WHERE course_id = ? ORDER BY sort_order, id",
        )
        .bind(course_id)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to list modules for renumbering")?;

        for (index, row) in rows.iter().enumerate() {
            let id: i64 = row.get("id");
            sqlx::query("UPDATE modules SET sort_order = ? WHERE id = ?")
                .bind(index as i64)
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("Failed to renumber module")?;
        }

        tx.commit().await.context("Failed to commit module changes")?;

        self.list_by_course(course_id).await
    }
}

fn row_to_module(row: &sqlx::sqlite::SqliteRow) -> Module {
    Module {
        id: row.get("id"),
        course_id: row.get("course_id"),
        title: row.get("title"),
        description: row.get("description"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{CourseRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Course, User, UserRole};

    async fn setup() -> (SqlitePool, SqlxModuleRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = super::super::SqlxUserRepository::new(pool.clone());
        let user = user_repo
            .create(&User::new(
                "ines".to_string(),
                "ines@example.com".to_string(),
                "hash".to_string(),
                UserRole::Instructor,
            ))
            .await
            .expect("Failed to create user");

        let course_repo = super::super::SqlxCourseRepository::new(pool.clone());
        let course = course_repo
            .create(&Course::new(
                user.id,
                1,
                "Python Basics".to_string(),
                "python-basics".to_string(),
                String::new(),
            ))
            .await
            .expect("Failed to create course");

        (pool.clone(), SqlxModuleRepository::new(pool), course.id)
    }

    #[tokio::test]
    async fn test_create_via_changes() {
        let (_pool, repo, course_id) = setup().await;

        let modules = repo
            .apply_changes(
                course_id,
                ModuleChanges {
                    creates: vec![
                        ("Intro".to_string(), String::new()),
                        ("Variables".to_string(), String::new()),
                    ],
                    ..Default::default()
                },
            )
            .await
            .expect("Apply failed");

        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].title, "Intro");
        assert_eq!(modules[0].sort_order, 0);
        assert_eq!(modules[1].title, "Variables");
        assert_eq!(modules[1].sort_order, 1);
    }

    #[tokio::test]
    async fn test_delete_and_update_commit_together() {
        let (_pool, repo, course_id) = setup().await;
        let modules = repo
            .apply_changes(
                course_id,
                ModuleChanges {
                    creates: vec![
                        ("One".to_string(), String::new()),
                        ("Two".to_string(), String::new()),
                    ],
                    ..Default::default()
                },
            )
            .await
            .expect("Apply failed");

        let survivors = repo
            .apply_changes(
                course_id,
                ModuleChanges {
                    deletes: vec![modules[0].id],
                    updates: vec![(modules[1].id, "Two updated".to_string(), "d".to_string())],
                    ..Default::default()
                },
            )
            .await
            .expect("Apply failed");

        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].title, "Two updated");
        assert_eq!(survivors[0].description, "d");
    }

    #[tokio::test]
    async fn test_renumbering_after_delete_is_contiguous() {
        let (_pool, repo, course_id) = setup().await;
        let modules = repo
            .apply_changes(
                course_id,
                ModuleChanges {
                    creates: vec![
                        ("A".to_string(), String::new()),
                        ("B".to_string(), String::new()),
                        ("C".to_string(), String::new()),
                    ],
                    ..Default::default()
                },
            )
            .await
            .expect("Apply failed");

        // Delete the middle module and add one at the end
        let survivors = repo
            .apply_changes(
                course_id,
                ModuleChanges {
                    deletes: vec![modules[1].id],
                    creates: vec![("D".to_string(), String::new())],
                    ..Default::default()
                },
            )
            .await
            .expect("Apply failed");

        let titles: Vec<&str> = survivors.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["A", "C", "D"]);
        let orders: Vec<i64> = survivors.iter().map(|m| m.sort_order).collect();
        assert_eq!(orders, [0, 1, 2]);
    }

    #[tokio::test]
    async fn test_delete_cleans_up_items() {
        let (pool, repo, course_id) = setup().await;
        let modules = repo
            .apply_changes(
                course_id,
                ModuleChanges {
                    creates: vec![("M".to_string(), String::new())],
                    ..Default::default()
                },
            )
            .await
            .expect("Apply failed");

        sqlx::query("INSERT INTO video_items (owner_id, title, url) VALUES (1, 'V', 'u')")
            .execute(&pool)
            .await
            .expect("Failed to create item");
        sqlx::query(
            "INSERT INTO contents (module_id, item_kind, item_id, sort_order) VALUES (?, 'video', 1, 0)",
        )
        .bind(modules[0].id)
        .execute(&pool)
        .await
        .expect("Failed to create content");

        repo.apply_changes(
            course_id,
            ModuleChanges {
                deletes: vec![modules[0].id],
                ..Default::default()
            },
        )
        .await
        .expect("Apply failed");

        let row = sqlx::query("SELECT COUNT(*) as count FROM video_items")
            .fetch_one(&pool)
            .await
            .expect("Count failed");
        let count: i64 = row.get("count");
        assert_eq!(count, 0, "Item rows of deleted modules must be cleaned up");
    }

    #[tokio::test]
    async fn test_delete_scoped_to_course() {
        let (pool, repo, course_id) = setup().await;

        // A second course owned by the same user
        let course_repo = super::super::SqlxCourseRepository::new(pool.clone());
        let other = course_repo
            .create(&Course::new(
                1,
                1,
                "Other".to_string(),
                "other".to_string(),
                String::new(),
            ))
            .await
            .expect("Failed to create course");
        let other_modules = repo
            .apply_changes(
                other.id,
                ModuleChanges {
                    creates: vec![("Foreign".to_string(), String::new())],
                    ..Default::default()
                },
            )
            .await
            .expect("Apply failed");

        // Deleting the foreign module through the first course is a no-op
        repo.apply_changes(
            course_id,
            ModuleChanges {
                deletes: vec![other_modules[0].id],
                ..Default::default()
            },
        )
        .await
        .expect("Apply failed");

        let still_there = repo
            .get_by_id(other_modules[0].id)
            .await
            .expect("Query failed");
        assert!(still_there.is_some());
    }

    #[tokio::test]
    async fn test_list_empty_course() {
        let (_pool, repo, course_id) = setup().await;
        let modules = repo.list_by_course(course_id).await.expect("List failed");
        assert!(modules.is_empty());
    }
}
