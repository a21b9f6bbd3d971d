//! Subject API endpoints
//!
//! - GET /api/v1/subjects

use axum::{extract::State, routing::get, Json, Router};

use crate::api::middleware::{ApiError, AppState};
use crate::models::Subject;

/// Build the subject router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_subjects))
}

/// GET /api/v1/subjects - all subjects ordered by title
async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<Subject>>, ApiError> {
    let subjects = state
        .subject_service
        .list()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(subjects))
}
