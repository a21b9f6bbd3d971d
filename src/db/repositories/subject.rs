//! Subject repository
//!
//! Database operations for the subject taxonomy. Subjects are reference
//! data; only list/lookup and a create used by seeding and tests.

use crate::models::Subject;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Subject repository trait
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Create a new subject
    async fn create(&self, title: &str, slug: &str) -> Result<Subject>;

    /// Get subject by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Subject>>;

    /// Get subject by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Subject>>;

    /// List all subjects ordered by title
    async fn list(&self) -> Result<Vec<Subject>>;
}

/// SQLx-based subject repository implementation
pub struct SqlxSubjectRepository {
    pool: SqlitePool,
}

impl SqlxSubjectRepository {
    /// Create a new SQLx subject repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SubjectRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SubjectRepository for SqlxSubjectRepository {
    async fn create(&self, title: &str, slug: &str) -> Result<Subject> {
        let result = sqlx::query("INSERT INTO subjects (title, slug) VALUES (?, ?)")
            .bind(title)
            .bind(slug)
            .execute(&self.pool)
            .await
            .context("Failed to create subject")?;

        Ok(Subject {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            slug: slug.to_string(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Subject>> {
        let row = sqlx::query("SELECT id, title, slug FROM subjects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get subject by ID")?;

        Ok(row.map(|r| row_to_subject(&r)))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Subject>> {
        let row = sqlx::query("SELECT id, title, slug FROM subjects WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get subject by slug")?;

        Ok(row.map(|r| row_to_subject(&r)))
    }

    async fn list(&self) -> Result<Vec<Subject>> {
        let rows = sqlx::query("SELECT id, title, slug FROM subjects ORDER BY title")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list subjects")?;

        Ok(rows.iter().map(row_to_subject).collect())
    }
}

fn row_to_subject(row: &sqlx::sqlite::SqliteRow) -> Subject {
    Subject {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxSubjectRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxSubjectRepository::new(pool)
    }

    #[tokio::test]
    async fn test_default_subject_present() {
        let repo = setup_test_repo().await;

        let general = repo
            .get_by_slug("general")
            .await
            .expect("Query failed")
            .expect("Seeded subject missing");
        assert_eq!(general.title, "General");
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let repo = setup_test_repo().await;
        repo.create("Programming", "programming")
            .await
            .expect("Failed to create subject");
        repo.create("Mathematics", "mathematics")
            .await
            .expect("Failed to create subject");

        let subjects = repo.list().await.expect("List failed");
        // Seeded 'General' plus the two created, ordered by title
        assert_eq!(subjects.len(), 3);
        assert_eq!(subjects[0].title, "General");
        assert_eq!(subjects[1].title, "Mathematics");
        assert_eq!(subjects[2].title, "Programming");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let repo = setup_test_repo().await;
        assert!(repo.get_by_id(999).await.expect("Query failed").is_none());
    }
}
