//! Course service
//!
//! Business logic for course management and the public catalog. All
//! management operations are scoped to the acting owner: a course belonging
//! to someone else is indistinguishable from a missing one.

use crate::db::repositories::{CourseRepository, ModuleRepository, SubjectRepository};
use crate::models::{Course, CourseWithModules, CreateCourseInput, UpdateCourseInput};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for course service operations
#[derive(Debug, thiserror::Error)]
pub enum CourseServiceError {
    /// Course not found (or not owned by the acting user)
    #[error("Course not found")]
    NotFound,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Course slug already exists: {0}")]
    DuplicateSlug(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Course service
pub struct CourseService {
    course_repo: Arc<dyn CourseRepository>,
    module_repo: Arc<dyn ModuleRepository>,
    subject_repo: Arc<dyn SubjectRepository>,
}

impl CourseService {
    /// Create a new course service with the given repositories
    pub fn new(
        course_repo: Arc<dyn CourseRepository>,
        module_repo: Arc<dyn ModuleRepository>,
        subject_repo: Arc<dyn SubjectRepository>,
    ) -> Self {
        Self {
            course_repo,
            module_repo,
            subject_repo,
        }
    }

    /// Create a course owned by the acting user.
    ///
    /// The slug is generated from the title when not supplied.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the title is empty or the subject is unknown
    /// - `DuplicateSlug` if the slug is already taken
    pub async fn create(
        &self,
        owner_id: i64,
        mut input: CreateCourseInput,
    ) -> Result<Course, CourseServiceError> {
        if input.title.trim().is_empty() {
            return Err(CourseServiceError::ValidationError(
                "Title cannot be empty".to_string(),
            ));
        }

        if self
            .subject_repo
            .get_by_id(input.subject_id)
            .await
            .context("Failed to check subject")?
            .is_none()
        {
            return Err(CourseServiceError::ValidationError(format!(
                "Unknown subject ID: {}",
                input.subject_id
            )));
        }

        if input.slug.trim().is_empty() {
            input.slug = generate_slug(&input.title);
        }
        if input.slug.is_empty() {
            return Err(CourseServiceError::ValidationError(
                "Slug cannot be empty".to_string(),
            ));
        }

        if self
            .course_repo
            .exists_by_slug(&input.slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(CourseServiceError::DuplicateSlug(input.slug));
        }

        let course = Course::new(
            owner_id,
            input.subject_id,
            input.title,
            input.slug,
            input.overview,
        );

        let created = self
            .course_repo
            .create(&course)
            .await
            .context("Failed to create course")?;

        Ok(created)
    }

    /// List the acting user's own courses (management list)
    pub async fn list_owned(&self, owner_id: i64) -> Result<Vec<Course>, CourseServiceError> {
        let courses = self
            .course_repo
            .list_by_owner(owner_id)
            .await
            .context("Failed to list courses")?;

        Ok(courses)
    }

    /// Get one of the acting user's courses by slug (management detail).
    ///
    /// # Errors
    ///
    /// `NotFound` when the slug does not exist or belongs to someone else.
    pub async fn get_owned(
        &self,
        slug: &str,
        owner_id: i64,
    ) -> Result<Course, CourseServiceError> {
        self.course_repo
            .get_by_slug_for_owner(slug, owner_id)
            .await
            .context("Failed to get course")?
            .ok_or(CourseServiceError::NotFound)
    }

    /// Get one of the acting user's courses by ID
    pub async fn get_owned_by_id(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<Course, CourseServiceError> {
        self.course_repo
            .get_by_id_for_owner(id, owner_id)
            .await
            .context("Failed to get course")?
            .ok_or(CourseServiceError::NotFound)
    }

    /// Update one of the acting user's courses.
    ///
    /// Only the supplied fields change. A new slug must remain unique; a new
    /// subject must exist.
    pub async fn update(
        &self,
        slug: &str,
        owner_id: i64,
        input: UpdateCourseInput,
    ) -> Result<Course, CourseServiceError> {
        let mut course = self.get_owned(slug, owner_id).await?;

        if !input.has_changes() {
            return Ok(course);
        }

        if let Some(subject_id) = input.subject_id {
            if self
                .subject_repo
                .get_by_id(subject_id)
                .await
                .context("Failed to check subject")?
                .is_none()
            {
                return Err(CourseServiceError::ValidationError(format!(
                    "Unknown subject ID: {}",
                    subject_id
                )));
            }
            course.subject_id = subject_id;
        }

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(CourseServiceError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
            course.title = title;
        }

        if let Some(new_slug) = input.slug {
            if new_slug.trim().is_empty() {
                return Err(CourseServiceError::ValidationError(
                    "Slug cannot be empty".to_string(),
                ));
            }
            if new_slug != course.slug
                && self
                    .course_repo
                    .exists_by_slug(&new_slug)
                    .await
                    .context("Failed to check slug uniqueness")?
            {
                return Err(CourseServiceError::DuplicateSlug(new_slug));
            }
            course.slug = new_slug;
        }

        if let Some(overview) = input.overview {
            course.overview = overview;
        }

        let updated = self
            .course_repo
            .update(&course)
            .await
            .context("Failed to update course")?;

        Ok(updated)
    }

    /// Delete one of the acting user's courses together with its modules,
    /// contents, and their item rows.
    pub async fn delete(&self, slug: &str, owner_id: i64) -> Result<(), CourseServiceError> {
        let course = self.get_owned(slug, owner_id).await?;

        self.course_repo
            .delete_with_contents(course.id)
            .await
            .context("Failed to delete course")?;

        Ok(())
    }

    /// Public course list, optionally filtered by subject slug
    pub async fn list_public(
        &self,
        subject_slug: Option<&str>,
    ) -> Result<Vec<Course>, CourseServiceError> {
        let subject_id = match subject_slug {
            Some(slug) => {
                let subject = self
                    .subject_repo
                    .get_by_slug(slug)
                    .await
                    .context("Failed to get subject")?
                    .ok_or(CourseServiceError::NotFound)?;
                Some(subject.id)
            }
            None => None,
        };

        let courses = self
            .course_repo
            .list_public(subject_id)
            .await
            .context("Failed to list courses")?;

        Ok(courses)
    }

    /// Public course detail with its ordered modules
    pub async fn get_public(&self, slug: &str) -> Result<CourseWithModules, CourseServiceError> {
        let course = self
            .course_repo
            .get_by_slug(slug)
            .await
            .context("Failed to get course")?
            .ok_or(CourseServiceError::NotFound)?;

        let modules = self
            .module_repo
            .list_by_course(course.id)
            .await
            .context("Failed to list modules")?;

        Ok(CourseWithModules { course, modules })
    }
}

/// Generate a URL-friendly slug from a title.
///
/// Lowercases, maps separators and ASCII punctuation to hyphens, keeps
/// non-ASCII characters, and collapses hyphen runs.
pub fn generate_slug(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || !c.is_ascii() {
                c
            } else {
                '-'
            }
        })
        .collect();

    // Collapse consecutive hyphens and trim them from both ends
    let mut result = String::new();
    let mut prev_hyphen = false;

    for c in slug.chars() {
        if c == '-' {
            if !prev_hyphen && !result.is_empty() {
                result.push(c);
                prev_hyphen = true;
            }
        } else {
            result.push(c);
            prev_hyphen = false;
        }
    }

    result.trim_end_matches('-').to_string()
}
