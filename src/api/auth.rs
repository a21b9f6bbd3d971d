//! Authentication API endpoints
//!
//! - POST /api/v1/auth/register
//! - POST /api/v1/auth/login
//! - POST /api/v1/auth/logout
//! - GET  /api/v1/auth/me

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::UserRole;
use crate::services::{LoginInput, RegisterInput, UserServiceError};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Requested role ("instructor" or "student"); defaults to student
    pub role: Option<String>,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Response for user info
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<crate::models::User> for UserResponse {
    fn from(user: crate::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

/// Cookie lifetime in seconds, matched to the configured session lifetime
/// so the cookie and the session row expire together
fn session_cookie_max_age(state: &AppState) -> i64 {
    state.user_service.session_expiration_days() * 24 * 60 * 60
}

fn session_cookie_headers(token: &str, max_age: i64) -> Result<HeaderMap, ApiError> {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token, max_age
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::internal_error(format!("Invalid cookie value: {}", e)))?,
    );
    Ok(headers)
}

/// POST /api/v1/auth/register - register and log in
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role = match body.role.as_deref() {
        Some(token) => UserRole::from_str(token)
            .map_err(|_| ApiError::validation_error(format!("Unknown role: {}", token)))?,
        None => UserRole::default(),
    };
    if role == UserRole::Admin {
        return Err(ApiError::validation_error(
            "Cannot self-register as admin".to_string(),
        ));
    }

    let password = body.password.clone();
    let input = RegisterInput::new(body.username, body.email, body.password).with_role(role);

    let user = state
        .user_service
        .register(input)
        .await
        .map_err(|e| match e {
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::UserExists(msg) => ApiError::conflict(msg),
            _ => ApiError::internal_error(e.to_string()),
        })?;

    // Log the new account in right away
    let session = state
        .user_service
        .login(LoginInput::new(&user.username, &password))
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    let headers = session_cookie_headers(&session.id, session_cookie_max_age(&state))?;

    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
        }),
    ))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = LoginInput::new(body.username_or_email, body.password);

    let session = state.user_service.login(input).await.map_err(|e| match e {
        UserServiceError::AuthenticationError(_) => {
            ApiError::unauthorized("Invalid username or password")
        }
        _ => ApiError::internal_error(e.to_string()),
    })?;

    let user = state
        .user_service
        .validate_session(&session.id)
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?
        .ok_or_else(|| ApiError::internal_error("Session validation failed"))?;

    let headers = session_cookie_headers(&session.id, session_cookie_max_age(&state))?;

    Ok((
        StatusCode::OK,
        headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
        }),
    ))
}

/// POST /api/v1/auth/logout - invalidate the current session
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    // Best effort: drop whichever token the request carried
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|h| h.to_str().ok())
                .and_then(|cookies| {
                    cookies
                        .split(';')
                        .map(str::trim)
                        .find_map(|c| c.strip_prefix("session="))
                        .map(str::to_string)
                })
        });

    if let Some(token) = token {
        state
            .user_service
            .logout(&token)
            .await
            .map_err(|e| ApiError::internal_error(e.to_string()))?;
    }

    // Expire the cookie
    let clear = session_cookie_headers("", 0)?;
    Ok((StatusCode::OK, clear, Json(serde_json::json!({"ok": true}))))
}

/// GET /api/v1/auth/me - current user info
async fn get_current_user(
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(user.into()))
}
