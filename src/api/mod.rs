//! API layer - HTTP handlers and routing
//!
//! All routes live under `/api/v1`. Management routes stack two layers:
//! `require_auth` (outer) resolves the session, then a per-route permission
//! check. Owner scoping happens below, in the services, so a foreign
//! resource 404s rather than 403s.

pub mod auth;
pub mod contents;
pub mod courses;
pub mod middleware;
pub mod modules;
pub mod subjects;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Course management, one permission per route
    let manage_routes = Router::new()
        .route(
            "/courses/manage",
            get(courses::list_manage)
                .route_layer(axum_middleware::from_fn(middleware::require_view_course)),
        )
        .route(
            "/courses/add",
            post(courses::create_course)
                .route_layer(axum_middleware::from_fn(middleware::require_add_course)),
        )
        .route(
            "/courses/update/{slug}",
            get(courses::get_for_update)
                .put(courses::update_course)
                .route_layer(axum_middleware::from_fn(middleware::require_change_course)),
        )
        .route(
            "/courses/delete/{slug}",
            delete(courses::delete_course)
                .route_layer(axum_middleware::from_fn(middleware::require_delete_course)),
        );

    // Module/content editing: authenticated, ownership enforced in services
    let owner_routes = Router::new()
        .route(
            "/courses/module/{course_id}",
            get(modules::get_formset).post(modules::apply_formset),
        )
        .route(
            "/courses/content/{module_id}/{kind}",
            get(contents::get_create_form).post(contents::create_content),
        )
        .route(
            "/courses/content/{module_id}/{kind}/{id}",
            get(contents::get_edit_form).post(contents::update_content),
        )
        .route("/courses/content/{id}", delete(contents::delete_content));

    let protected_routes = Router::new()
        .merge(manage_routes)
        .merge(owner_routes)
        .nest("/auth", auth::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .route("/courses", get(courses::list_public))
        .route("/courses/{slug}", get(courses::public_detail))
        .route(
            "/courses/module_list/{course_id}",
            get(modules::list_public),
        )
        .route(
            "/courses/content_list/{module_id}",
            get(contents::list_public),
        )
        .nest("/subjects", subjects::router())
        .nest("/auth", auth::public_router())
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
