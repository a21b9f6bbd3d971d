//! Course API endpoints
//!
//! Management routes (permission-gated, owner-scoped):
//! - GET    /api/v1/courses/manage
//! - POST   /api/v1/courses/add
//! - GET    /api/v1/courses/update/{slug}
//! - PUT    /api/v1/courses/update/{slug}
//! - DELETE /api/v1/courses/delete/{slug}
//!
//! Public routes:
//! - GET /api/v1/courses?subject={slug}
//! - GET /api/v1/courses/{slug}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Course, CourseWithModules, CreateCourseInput, UpdateCourseInput};
use crate::services::CourseServiceError;

fn map_course_error(e: CourseServiceError) -> ApiError {
    match e {
        CourseServiceError::NotFound => ApiError::not_found("Course not found"),
        CourseServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        CourseServiceError::DuplicateSlug(slug) => {
            ApiError::conflict(format!("Course slug already exists: {}", slug))
        }
        CourseServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
    }
}

/// Query parameters for the public course list
#[derive(Debug, Deserialize)]
pub struct ListCoursesQuery {
    /// Subject slug filter
    pub subject: Option<String>,
}

/// GET /api/v1/courses/manage - the acting user's own courses
pub async fn list_manage(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = state
        .course_service
        .list_owned(user.id)
        .await
        .map_err(map_course_error)?;

    Ok(Json(courses))
}

/// POST /api/v1/courses/add - create a course owned by the acting user
pub async fn create_course(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(input): Json<CreateCourseInput>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state
        .course_service
        .create(user.id, input)
        .await
        .map_err(map_course_error)?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/v1/courses/update/{slug} - current values for the edit form
pub async fn get_for_update(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(slug): Path<String>,
) -> Result<Json<Course>, ApiError> {
    let course = state
        .course_service
        .get_owned(&slug, user.id)
        .await
        .map_err(map_course_error)?;

    Ok(Json(course))
}

/// PUT /api/v1/courses/update/{slug} - partial update of an owned course
pub async fn update_course(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(slug): Path<String>,
    Json(input): Json<UpdateCourseInput>,
) -> Result<Json<Course>, ApiError> {
    let course = state
        .course_service
        .update(&slug, user.id, input)
        .await
        .map_err(map_course_error)?;

    Ok(Json(course))
}

/// DELETE /api/v1/courses/delete/{slug} - delete an owned course and
/// everything under it
pub async fn delete_course(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .course_service
        .delete(&slug, user.id)
        .await
        .map_err(map_course_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/courses - public catalog, optionally filtered by subject slug
pub async fn list_public(
    State(state): State<AppState>,
    Query(query): Query<ListCoursesQuery>,
) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = state
        .course_service
        .list_public(query.subject.as_deref())
        .await
        .map_err(map_course_error)?;

    Ok(Json(courses))
}

/// GET /api/v1/courses/{slug} - public detail with ordered modules
pub async fn public_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CourseWithModules>, ApiError> {
    let detail = state
        .course_service
        .get_public(&slug)
        .await
        .map_err(map_course_error)?;

    Ok(Json(detail))
}
