//! Module model
//!
//! This module provides:
//! - `Module` entity, an ordered section within a course
//! - `ModuleFormset` / `ModuleForm`, the batch edit submission accepted by
//!   the formset endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Module entity.
///
/// `sort_order` is 0-based and kept contiguous per course: the formset
/// handler renumbers surviving modules after every commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Unique identifier
    pub id: i64,
    /// Owning course ID
    pub course_id: i64,
    /// Module title
    pub title: String,
    /// Module description
    pub description: String,
    /// 0-based position within the course
    pub sort_order: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Module {
    /// Create a new module with the given parameters
    pub fn new(course_id: i64, title: String, description: String, sort_order: i64) -> Self {
        Self {
            id: 0, // Will be set by the database
            course_id,
            title,
            description,
            sort_order,
            created_at: Utc::now(),
        }
    }
}

/// One entry of a module formset submission.
///
/// `id` present: update (or delete, when `delete` is set) that module.
/// `id` absent: create a new module appended at the end.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleForm {
    /// Existing module ID (absent for creates)
    pub id: Option<i64>,
    /// Module title
    #[serde(default)]
    pub title: String,
    /// Module description
    #[serde(default)]
    pub description: String,
    /// Delete this module instead of upserting it
    #[serde(default)]
    pub delete: bool,
}

/// Batch of module edits scoped to one course, applied atomically
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleFormset {
    /// The module entries
    pub modules: Vec<ModuleForm>,
}
