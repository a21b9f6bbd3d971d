//! Content API endpoints
//!
//! - GET    /api/v1/courses/content_list/{module_id} (public)
//! - GET    /api/v1/courses/content/{module_id}/{kind} (owner, form schema)
//! - POST   /api/v1/courses/content/{module_id}/{kind} (owner, create)
//! - GET    /api/v1/courses/content/{module_id}/{kind}/{id} (owner, edit form)
//! - POST   /api/v1/courses/content/{module_id}/{kind}/{id} (owner, update)
//! - DELETE /api/v1/courses/content/{id} (owner)
//!
//! The `{kind}` path segment is one of the four item type tokens; anything
//! else is a 404. Form GET responses carry the allow-listed field schema so
//! clients never guess at server-managed fields.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{form_fields, ContentForm, ContentItem, ContentWithItem, FieldSpec};
use crate::services::{ContentService, ContentServiceError};

fn map_content_error(e: ContentServiceError) -> ApiError {
    match e {
        ContentServiceError::NotFound => ApiError::not_found("Content not found"),
        ContentServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        ContentServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// Response for content listings
#[derive(Debug, Serialize)]
pub struct ContentListResponse {
    pub module_id: i64,
    pub contents: Vec<ContentWithItem>,
}

/// Form description for a content kind, optionally with current values
#[derive(Debug, Serialize)]
pub struct ContentFormResponse {
    pub kind: &'static str,
    pub fields: &'static [FieldSpec],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ContentItem>,
}

/// GET /api/v1/courses/content_list/{module_id} - public resolved contents
pub async fn list_public(
    State(state): State<AppState>,
    Path(module_id): Path<i64>,
) -> Result<Json<ContentListResponse>, ApiError> {
    let contents = state
        .content_service
        .list_public(module_id)
        .await
        .map_err(map_content_error)?;

    Ok(Json(ContentListResponse {
        module_id,
        contents,
    }))
}

/// GET /api/v1/courses/content/{module_id}/{kind} - blank form schema
pub async fn get_create_form(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((module_id, kind_token)): Path<(i64, String)>,
) -> Result<Json<ContentFormResponse>, ApiError> {
    let kind = ContentService::resolve_kind(&kind_token).map_err(map_content_error)?;

    // The module must exist and belong to the acting user
    state
        .content_service
        .require_owned_module(module_id, user.id)
        .await
        .map_err(map_content_error)?;

    Ok(Json(ContentFormResponse {
        kind: kind.as_str(),
        fields: form_fields(kind),
        item: None,
    }))
}

/// POST /api/v1/courses/content/{module_id}/{kind} - create an item
pub async fn create_content(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((module_id, kind_token)): Path<(i64, String)>,
    Json(form): Json<ContentForm>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = ContentService::resolve_kind(&kind_token).map_err(map_content_error)?;

    let created = state
        .content_service
        .create(module_id, kind, user.id, form)
        .await
        .map_err(map_content_error)?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/courses/content/{module_id}/{kind}/{id} - edit form with
/// current values
pub async fn get_edit_form(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((module_id, kind_token, item_id)): Path<(i64, String, i64)>,
) -> Result<Json<ContentFormResponse>, ApiError> {
    let kind = ContentService::resolve_kind(&kind_token).map_err(map_content_error)?;

    let item = state
        .content_service
        .get_owned_item(module_id, kind, item_id, user.id)
        .await
        .map_err(map_content_error)?;

    Ok(Json(ContentFormResponse {
        kind: kind.as_str(),
        fields: form_fields(kind),
        item: Some(item),
    }))
}

/// POST /api/v1/courses/content/{module_id}/{kind}/{id} - update an item
pub async fn update_content(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path((module_id, kind_token, item_id)): Path<(i64, String, i64)>,
    Json(form): Json<ContentForm>,
) -> Result<Json<ContentItem>, ApiError> {
    let kind = ContentService::resolve_kind(&kind_token).map_err(map_content_error)?;

    let updated = state
        .content_service
        .update(module_id, kind, item_id, user.id, form)
        .await
        .map_err(map_content_error)?;

    Ok(Json(updated))
}

/// DELETE /api/v1/courses/content/{id} - delete an association and its item
pub async fn delete_content(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(content_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .content_service
        .delete(content_id, user.id)
        .await
        .map_err(map_content_error)?;

    Ok(StatusCode::NO_CONTENT)
}
