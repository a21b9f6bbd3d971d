//! Content service
//!
//! Business logic for polymorphic content items. The kind comes from a URL
//! token and is resolved against the closed set of item types; an unknown
//! token is reported as not found. The owner of a created item is always
//! the authenticated user, regardless of what the request body carries.

use crate::db::repositories::{ContentRepository, CourseRepository, ModuleRepository};
use crate::models::{ContentForm, ContentItem, ContentKind, ContentWithItem, Module};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for content service operations
#[derive(Debug, thiserror::Error)]
pub enum ContentServiceError {
    /// Module, content, item, or kind token not found (or not owned)
    #[error("Content not found")]
    NotFound,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Content service
pub struct ContentService {
    content_repo: Arc<dyn ContentRepository>,
    module_repo: Arc<dyn ModuleRepository>,
    course_repo: Arc<dyn CourseRepository>,
}

impl ContentService {
    /// Create a new content service with the given repositories
    pub fn new(
        content_repo: Arc<dyn ContentRepository>,
        module_repo: Arc<dyn ModuleRepository>,
        course_repo: Arc<dyn CourseRepository>,
    ) -> Self {
        Self {
            content_repo,
            module_repo,
            course_repo,
        }
    }

    /// Resolve a kind token, reporting unknown tokens as not found
    pub fn resolve_kind(token: &str) -> Result<ContentKind, ContentServiceError> {
        ContentKind::from_token(token).ok_or(ContentServiceError::NotFound)
    }

    /// List a public module's contents with items resolved, in order
    pub async fn list_public(
        &self,
        module_id: i64,
    ) -> Result<Vec<ContentWithItem>, ContentServiceError> {
        if self
            .module_repo
            .get_by_id(module_id)
            .await
            .context("Failed to get module")?
            .is_none()
        {
            return Err(ContentServiceError::NotFound);
        }

        let contents = self
            .content_repo
            .list_by_module(module_id)
            .await
            .context("Failed to list contents")?;

        Ok(contents)
    }

    /// Get an item of the acting user's for editing (form GET)
    pub async fn get_owned_item(
        &self,
        module_id: i64,
        kind: ContentKind,
        item_id: i64,
        owner_id: i64,
    ) -> Result<ContentItem, ContentServiceError> {
        self.require_owned_module(module_id, owner_id).await?;

        let item = self
            .content_repo
            .get_item(kind, item_id)
            .await
            .context("Failed to get item")?
            .ok_or(ContentServiceError::NotFound)?;

        if item.owner_id() != owner_id {
            return Err(ContentServiceError::NotFound);
        }

        Ok(item)
    }

    /// Create an item in one of the acting user's modules.
    ///
    /// The item is appended at the module's tail, and ownership is taken
    /// from the session, never the body.
    pub async fn create(
        &self,
        module_id: i64,
        kind: ContentKind,
        owner_id: i64,
        form: ContentForm,
    ) -> Result<ContentWithItem, ContentServiceError> {
        self.require_owned_module(module_id, owner_id).await?;
        let (title, payload) = validate_form(kind, &form)?;

        let created = self
            .content_repo
            .create_item(module_id, kind, owner_id, title, payload)
            .await
            .context("Failed to create content")?;

        Ok(created)
    }

    /// Update one of the acting user's items in place
    pub async fn update(
        &self,
        module_id: i64,
        kind: ContentKind,
        item_id: i64,
        owner_id: i64,
        form: ContentForm,
    ) -> Result<ContentItem, ContentServiceError> {
        // Ownership check up front so a foreign item 404s before validation
        self.get_owned_item(module_id, kind, item_id, owner_id)
            .await?;
        let (title, payload) = validate_form(kind, &form)?;

        let updated = self
            .content_repo
            .update_item(kind, item_id, title, payload)
            .await
            .context("Failed to update item")?
            .ok_or(ContentServiceError::NotFound)?;

        Ok(updated)
    }

    /// Delete one of the acting user's content associations together with
    /// its item, renumbering the module's surviving contents
    pub async fn delete(
        &self,
        content_id: i64,
        owner_id: i64,
    ) -> Result<(), ContentServiceError> {
        let content = self
            .content_repo
            .get_by_id(content_id)
            .await
            .context("Failed to get content")?
            .ok_or(ContentServiceError::NotFound)?;

        self.require_owned_module(content.module_id, owner_id)
            .await?;

        let deleted = self
            .content_repo
            .delete(content_id)
            .await
            .context("Failed to delete content")?;
        if !deleted {
            return Err(ContentServiceError::NotFound);
        }

        Ok(())
    }

    /// Resolve a module and require that its course belongs to the acting
    /// user. Foreign and missing modules are indistinguishable.
    pub async fn require_owned_module(
        &self,
        module_id: i64,
        owner_id: i64,
    ) -> Result<Module, ContentServiceError> {
        let module = self
            .module_repo
            .get_by_id(module_id)
            .await
            .context("Failed to get module")?
            .ok_or(ContentServiceError::NotFound)?;

        self.course_repo
            .get_by_id_for_owner(module.course_id, owner_id)
            .await
            .context("Failed to get course")?
            .ok_or(ContentServiceError::NotFound)?;

        Ok(module)
    }
}

/// Check the allow-listed fields for a kind, returning (title, payload)
fn validate_form(
    kind: ContentKind,
    form: &ContentForm,
) -> Result<(&str, &str), ContentServiceError> {
    if form.title.trim().is_empty() {
        return Err(ContentServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }

    let payload = form.payload_for(kind).unwrap_or_default();
    if payload.trim().is_empty() {
        let field = match kind {
            ContentKind::Text => "body",
            ContentKind::Video => "url",
            ContentKind::Image => "image",
            ContentKind::File => "file",
        };
        return Err(ContentServiceError::ValidationError(format!(
            "Field '{}' is required for {} content",
            field, kind
        )));
    }

    Ok((&form.title, payload))
}
