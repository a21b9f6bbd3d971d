//! Subject service
//!
//! Thin wrapper over the subject repository. Subjects are static reference
//! data seeded by migration; there is no management surface for them.

use crate::db::repositories::SubjectRepository;
use crate::models::Subject;
use anyhow::Result;
use std::sync::Arc;

/// Subject service
pub struct SubjectService {
    repo: Arc<dyn SubjectRepository>,
}

impl SubjectService {
    /// Create a new subject service
    pub fn new(repo: Arc<dyn SubjectRepository>) -> Self {
        Self { repo }
    }

    /// List all subjects ordered by title
    pub async fn list(&self) -> Result<Vec<Subject>> {
        self.repo.list().await
    }

    /// Get a subject by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Subject>> {
        self.repo.get_by_slug(slug).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxSubjectRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SubjectService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        SubjectService::new(SqlxSubjectRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_list_includes_seeded_subject() {
        let service = setup().await;
        let subjects = service.list().await.expect("List failed");
        assert!(subjects.iter().any(|s| s.slug == "general"));
    }

    #[tokio::test]
    async fn test_get_by_slug() {
        let service = setup().await;
        let subject = service
            .get_by_slug("general")
            .await
            .expect("Query failed")
            .expect("Seeded subject missing");
        assert_eq!(subject.title, "General");

        let missing = service.get_by_slug("astrology").await.expect("Query failed");
        assert!(missing.is_none());
    }
}
