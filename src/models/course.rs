//! Course model
//!
//! This module provides:
//! - `Course` entity owned by an instructor and categorized by a subject
//! - Input types for creating and updating courses
//! - `CourseWithModules` for the public detail view

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Module;

/// Course entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier
    pub id: i64,
    /// Owning instructor's user ID
    pub owner_id: i64,
    /// Subject ID
    pub subject_id: i64,
    /// Course title
    pub title: String,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Course overview text
    pub overview: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Course {
    /// Create a new course with the given parameters
    pub fn new(
        owner_id: i64,
        subject_id: i64,
        title: String,
        slug: String,
        overview: String,
    ) -> Self {
        Self {
            id: 0, // Will be set by the database
            owner_id,
            subject_id,
            title,
            slug,
            overview,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a new course
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseInput {
    /// Subject ID
    pub subject_id: i64,
    /// Course title
    pub title: String,
    /// URL-friendly slug (generated from the title when empty)
    #[serde(default)]
    pub slug: String,
    /// Course overview text
    #[serde(default)]
    pub overview: String,
}

/// Input for updating an existing course
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseInput {
    /// New subject ID (optional)
    pub subject_id: Option<i64>,
    /// New title (optional)
    pub title: Option<String>,
    /// New slug (optional)
    pub slug: Option<String>,
    /// New overview (optional)
    pub overview: Option<String>,
}

impl UpdateCourseInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.subject_id.is_some()
            || self.title.is_some()
            || self.slug.is_some()
            || self.overview.is_some()
    }
}

/// A course together with its ordered modules (public detail view)
#[derive(Debug, Clone, Serialize)]
pub struct CourseWithModules {
    /// The course
    #[serde(flatten)]
    pub course: Course,
    /// Modules ordered by their position
    pub modules: Vec<Module>,
}
