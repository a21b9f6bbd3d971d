//! Module service
//!
//! Validates and applies the module formset: one batch of creates, updates,
//! and deletes for a single course, committed atomically. Validation
//! produces field-level errors keyed by row index, and nothing is written
//! unless every row passes.

use crate::db::repositories::{CourseRepository, ModuleChanges, ModuleRepository};
use crate::models::{Module, ModuleForm, ModuleFormset};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// One field-level formset validation error
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FormsetError {
    /// 0-based row index in the submitted formset
    pub index: usize,
    /// Offending field name
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl FormsetError {
    fn new(index: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            index,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Error types for module service operations
#[derive(Debug, thiserror::Error)]
pub enum ModuleServiceError {
    /// Course not found (or not owned by the acting user)
    #[error("Course not found")]
    CourseNotFound,

    /// Formset validation failed; nothing was written
    #[error("Formset validation failed")]
    FormsetInvalid(Vec<FormsetError>),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Module service
pub struct ModuleService {
    module_repo: Arc<dyn ModuleRepository>,
    course_repo: Arc<dyn CourseRepository>,
}

impl ModuleService {
    /// Create a new module service with the given repositories
    pub fn new(
        module_repo: Arc<dyn ModuleRepository>,
        course_repo: Arc<dyn CourseRepository>,
    ) -> Self {
        Self {
            module_repo,
            course_repo,
        }
    }

    /// List modules of a public course
    pub async fn list_public(&self, course_id: i64) -> Result<Vec<Module>, ModuleServiceError> {
        if self
            .course_repo
            .get_by_id(course_id)
            .await
            .context("Failed to get course")?
            .is_none()
        {
            return Err(ModuleServiceError::CourseNotFound);
        }

        let modules = self
            .module_repo
            .list_by_course(course_id)
            .await
            .context("Failed to list modules")?;

        Ok(modules)
    }

    /// List modules of one of the acting user's courses (formset GET)
    pub async fn list_for_owner(
        &self,
        course_id: i64,
        owner_id: i64,
    ) -> Result<Vec<Module>, ModuleServiceError> {
        self.require_owned(course_id, owner_id).await?;

        let modules = self
            .module_repo
            .list_by_course(course_id)
            .await
            .context("Failed to list modules")?;

        Ok(modules)
    }

    /// Validate and apply a formset against one of the acting user's courses.
    ///
    /// Returns the surviving modules, renumbered contiguously from 0.
    ///
    /// # Errors
    ///
    /// - `CourseNotFound` for unknown or foreign courses
    /// - `FormsetInvalid` with per-row errors; the batch is all-or-nothing
    pub async fn apply_formset(
        &self,
        course_id: i64,
        owner_id: i64,
        formset: ModuleFormset,
    ) -> Result<Vec<Module>, ModuleServiceError> {
        self.require_owned(course_id, owner_id).await?;

        let existing = self
            .module_repo
            .list_by_course(course_id)
            .await
            .context("Failed to list modules")?;
        let known_ids: HashSet<i64> = existing.iter().map(|m| m.id).collect();

        let changes = validate_formset(&formset.modules, &known_ids)
            .map_err(ModuleServiceError::FormsetInvalid)?;

        let modules = self
            .module_repo
            .apply_changes(course_id, changes)
            .await
            .context("Failed to apply module changes")?;

        Ok(modules)
    }

    async fn require_owned(&self, course_id: i64, owner_id: i64) -> Result<(), ModuleServiceError> {
        self.course_repo
            .get_by_id_for_owner(course_id, owner_id)
            .await
            .context("Failed to get course")?
            .ok_or(ModuleServiceError::CourseNotFound)?;
        Ok(())
    }
}

/// Validate submitted formset rows against a course's known module IDs.
///
/// Every row is checked before anything is applied; all failures are
/// reported together.
fn validate_formset(
    rows: &[ModuleForm],
    known_ids: &HashSet<i64>,
) -> Result<ModuleChanges, Vec<FormsetError>> {
    let mut errors = Vec::new();
    let mut changes = ModuleChanges::default();
    let mut seen_ids = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        if let Some(id) = row.id {
            if !known_ids.contains(&id) {
                errors.push(FormsetError::new(
                    index,
                    "id",
                    format!("Unknown module ID: {}", id),
                ));
                continue;
            }
            if !seen_ids.insert(id) {
                errors.push(FormsetError::new(
                    index,
                    "id",
                    format!("Duplicate module ID: {}", id),
                ));
                continue;
            }
        }

        if row.delete {
            // A delete row without an ID has nothing to delete
            if let Some(id) = row.id {
                changes.deletes.push(id);
            }
            continue;
        }

        if row.title.trim().is_empty() {
            errors.push(FormsetError::new(index, "title", "Title cannot be empty"));
            continue;
        }

        match row.id {
            Some(id) => changes
                .updates
                .push((id, row.title.clone(), row.description.clone())),
            None => changes
                .creates
                .push((row.title.clone(), row.description.clone())),
        }
    }

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}
