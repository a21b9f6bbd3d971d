//! Course repository
//!
//! Database operations for courses. Management queries are owner-scoped:
//! a lookup for the wrong owner returns `None`, which the API layer reports
//! as not found rather than forbidden.

use crate::models::Course;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Course repository trait
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Create a new course
    async fn create(&self, course: &Course) -> Result<Course>;

    /// Get course by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Course>>;

    /// Get course by ID, owner-scoped
    async fn get_by_id_for_owner(&self, id: i64, owner_id: i64) -> Result<Option<Course>>;

    /// Get course by slug (public)
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Course>>;

    /// Get course by slug, owner-scoped
    async fn get_by_slug_for_owner(&self, slug: &str, owner_id: i64) -> Result<Option<Course>>;

    /// List courses owned by the given user, newest first
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Course>>;

    /// List all courses (public), optionally filtered by subject, newest first
    async fn list_public(&self, subject_id: Option<i64>) -> Result<Vec<Course>>;

    /// Update a course
    async fn update(&self, course: &Course) -> Result<Course>;

    /// Check if a course slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Delete a course together with its modules, content associations, and
    /// the polymorphic item rows those associations reference, in one
    /// transaction
    async fn delete_with_contents(&self, id: i64) -> Result<()>;
}

/// SQLx-based course repository implementation
pub struct SqlxCourseRepository {
    pool: SqlitePool,
}

impl SqlxCourseRepository {
    /// Create a new SQLx course repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CourseRepository> {
        Arc::new(Self::new(pool))
    }
}

const COURSE_COLUMNS: &str = "id, owner_id, subject_id, title, slug, overview, created_at";

#[async_trait]
impl CourseRepository for SqlxCourseRepository {
    async fn create(&self, course: &Course) -> Result<Course> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO courses (owner_id, subject_id, title, slug, overview, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(course.owner_id)
        .bind(course.subject_id)
        .bind(&course.title)
        .bind(&course.slug)
        .bind(&course.overview)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create course")?;

        Ok(Course {
            id: result.last_insert_rowid(),
            owner_id: course.owner_id,
            subject_id: course.subject_id,
            title: course.title.clone(),
            slug: course.slug.clone(),
            overview: course.overview.clone(),
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Course>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM courses WHERE id = ?",
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get course by ID")?;

        Ok(row.map(|r| row_to_course(&r)))
    }

    async fn get_by_id_for_owner(&self, id: i64, owner_id: i64) -> Result<Option<Course>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM courses WHERE id = ? AND owner_id = ?",
            COURSE_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get course by ID for owner")?;

        Ok(row.map(|r| row_to_course(&r)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Course>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM courses WHERE slug = ?",
            COURSE_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get course by slug")?;

        Ok(row.map(|r| row_to_course(&r)))
    }

    async fn get_by_slug_for_owner(&self, slug: &str, owner_id: i64) -> Result<Option<Course>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM courses WHERE slug = ? AND owner_id = ?",
            COURSE_COLUMNS
        ))
        .bind(slug)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get course by slug for owner")?;

        Ok(row.map(|r| row_to_course(&r)))
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Course>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM courses WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
            COURSE_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list courses by owner")?;

        Ok(rows.iter().map(row_to_course).collect())
    }

    async fn list_public(&self, subject_id: Option<i64>) -> Result<Vec<Course>> {
        let rows = match subject_id {
            Some(subject_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM courses WHERE subject_id = ? ORDER BY created_at DESC, id DESC",
                    COURSE_COLUMNS
                ))
                .bind(subject_id)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM courses ORDER BY created_at DESC, id DESC",
                    COURSE_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list courses")?;

        Ok(rows.iter().map(row_to_course).collect())
    }

    async fn update(&self, course: &Course) -> Result<Course> {
        sqlx::query(
            "UPDATE courses SET subject_id = ?, title = ?, slug = ?, overview = ? WHERE id = ?",
        )
        .bind(course.subject_id)
        .bind(&course.title)
        .bind(&course.slug)
        .bind(&course.overview)
        .bind(course.id)
        .execute(&self.pool)
        .await
        .context("Failed to update course")?;

        self.get_by_id(course.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Course not found after update"))
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM courses WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check course slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn delete_with_contents(&self, id: i64) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        // Item rows first: once the course row goes, the cascade removes the
        // contents rows we need to find them.
        for kind in ["text", "video", "image", "file"] {
            let sql = format!(
                "DELETE FROM {}_items WHERE id IN (
                    SELECT c.item_id FROM contents c
                    JOIN modules m ON m.id = c.module_id
                    WHERE m.course_id = ? AND c.item_kind = ?
                )",
                kind
            );
            sqlx::query(&sql)
                .bind(id)
                .bind(kind)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to delete {} items", kind))?;
        }

        sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete course")?;

        tx.commit().await.context("Failed to commit course delete")?;
        Ok(())
    }
}

fn row_to_course(row: &sqlx::sqlite::SqliteRow) -> Course {
    Course {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        subject_id: row.get("subject_id"),
        title: row.get("title"),
        slug: row.get("slug"),
        overview: row.get("overview"),
        created_at: row.get("created_at"),
    }
}
