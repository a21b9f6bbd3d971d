//! Coursely - an online course management service

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursely::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxContentRepository, SqlxCourseRepository, SqlxModuleRepository,
            SqlxSessionRepository, SqlxSubjectRepository, SqlxUserRepository,
        },
    },
    services::{ContentService, CourseService, ModuleService, SubjectService, UserService},
};

/// Expired-session sweep interval in seconds
const SESSION_CLEANUP_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coursely=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Coursely...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let subject_repo = SqlxSubjectRepository::boxed(pool.clone());
    let course_repo = SqlxCourseRepository::boxed(pool.clone());
    let module_repo = SqlxModuleRepository::boxed(pool.clone());
    let content_repo = SqlxContentRepository::boxed(pool.clone());

    // Wire up services
    let user_service = Arc::new(UserService::with_session_expiration(
        user_repo,
        session_repo,
        config.auth.session_days,
    ));
    let subject_service = Arc::new(SubjectService::new(subject_repo.clone()));
    let course_service = Arc::new(CourseService::new(
        course_repo.clone(),
        module_repo.clone(),
        subject_repo,
    ));
    let module_service = Arc::new(ModuleService::new(module_repo.clone(), course_repo.clone()));
    let content_service = Arc::new(ContentService::new(content_repo, module_repo, course_repo));

    let state = AppState {
        pool: pool.clone(),
        user_service: user_service.clone(),
        subject_service,
        course_service,
        module_service,
        content_service,
    };

    // Periodic expired-session sweep
    {
        let user_service = user_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(
                SESSION_CLEANUP_INTERVAL_SECS,
            ));
            loop {
                interval.tick().await;
                match user_service.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Cleaned up {} expired sessions", n),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
