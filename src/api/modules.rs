//! Module API endpoints
//!
//! - GET  /api/v1/courses/module_list/{course_id} (public)
//! - GET  /api/v1/courses/module/{course_id} (owner, formset GET)
//! - POST /api/v1/courses/module/{course_id} (owner, formset apply)

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Module, ModuleFormset};
use crate::services::ModuleServiceError;

fn map_module_error(e: ModuleServiceError) -> ApiError {
    match e {
        ModuleServiceError::CourseNotFound => ApiError::not_found("Course not found"),
        ModuleServiceError::FormsetInvalid(errors) => ApiError::with_details(
            "VALIDATION_ERROR",
            "Formset validation failed",
            serde_json::json!(errors),
        ),
        ModuleServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// Response for module listings
#[derive(Debug, Serialize)]
pub struct ModuleListResponse {
    pub course_id: i64,
    pub modules: Vec<Module>,
}

/// GET /api/v1/courses/module_list/{course_id} - public module list
pub async fn list_public(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> Result<Json<ModuleListResponse>, ApiError> {
    let modules = state
        .module_service
        .list_public(course_id)
        .await
        .map_err(map_module_error)?;

    Ok(Json(ModuleListResponse { course_id, modules }))
}

/// GET /api/v1/courses/module/{course_id} - current rows for the formset
pub async fn get_formset(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(course_id): Path<i64>,
) -> Result<Json<ModuleListResponse>, ApiError> {
    let modules = state
        .module_service
        .list_for_owner(course_id, user.id)
        .await
        .map_err(map_module_error)?;

    Ok(Json(ModuleListResponse { course_id, modules }))
}

/// POST /api/v1/courses/module/{course_id} - apply a formset batch.
///
/// All-or-nothing: validation failures return the full error list and
/// write nothing.
pub async fn apply_formset(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(course_id): Path<i64>,
    Json(formset): Json<ModuleFormset>,
) -> Result<Json<ModuleListResponse>, ApiError> {
    let modules = state
        .module_service
        .apply_formset(course_id, user.id, formset)
        .await
        .map_err(map_module_error)?;

    Ok(Json(ModuleListResponse { course_id, modules }))
}
