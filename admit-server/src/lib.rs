//! admit-server library - admissions training web service
//!
//! Serves the trainee and manager UIs, persists progress, proxies
//! speech-to-text and feedback generation, and reports to managers.

use admit_common::content::Catalog;
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;

pub mod api;
pub mod config;
pub mod error;
pub mod services;

/// Largest accepted request body (voice recordings)
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

use config::ServerConfig;
use services::{AudioStore, FeedbackGenerator, Transcriber};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Training sections and assessment questions
    pub catalog: Arc<Catalog>,
    pub config: Arc<ServerConfig>,
    pub transcriber: Arc<dyn Transcriber>,
    pub feedback: Arc<dyn FeedbackGenerator>,
    pub audio: AudioStore,
    /// Signs manager session tokens
    pub session_secret: Arc<str>,
    /// Server startup time (for uptime calculation)
    pub startup_time: Instant,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        catalog: Catalog,
        config: ServerConfig,
        transcriber: Arc<dyn Transcriber>,
        feedback: Arc<dyn FeedbackGenerator>,
        audio: AudioStore,
        session_secret: String,
    ) -> Self {
        Self {
            db,
            catalog: Arc::new(catalog),
            config: Arc::new(config),
            transcriber,
            feedback,
            audio,
            session_secret: session_secret.into(),
            startup_time: Instant::now(),
        }
    }
}

/// Build application router
///
/// Manager-only endpoints sit behind the session middleware; everything
/// else (trainee API, pages, static assets, health) is public.
pub fn build_router(state: AppState) -> Router {
    use axum::extract::DefaultBodyLimit;
    use axum::middleware;
    use axum::routing::{get, post};
    use tower_cookies::CookieManagerLayer;
    use tower_http::services::ServeDir;
    use tower_http::trace::TraceLayer;

    // Protected routes (require a manager session)
    let protected = Router::new()
        .route("/api/trainee", post(api::create_trainee))
        .route("/api/manager", get(api::list_trainees))
        .route("/api/manager/trainee/:id", get(api::get_trainee_detail))
        .route("/api/content/preview", get(api::content_preview))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_manager,
        ));

    // Public routes
    let public = Router::new()
        .route("/api/trainee", get(api::get_trainee))
        .route(
            "/api/progress",
            post(api::update_progress).put(api::store_response),
        )
        .route("/api/transcribe", post(api::transcribe))
        .route("/api/feedback", post(api::feedback))
        .route("/api/voice", post(api::voice_pipeline))
        .route(
            "/api/assessment",
            get(api::list_attempts).post(api::save_attempt),
        )
        .route("/api/assessment/questions", get(api::assessment_questions))
        .route("/api/assessment/submit", post(api::submit_assessment))
        .route("/api/content/sections", get(api::list_sections))
        .route("/api/content/sections/:id", get(api::get_section))
        .route("/api/manager", post(api::login))
        .route("/api/manager/logout", post(api::logout))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::ui_routes())
        .merge(api::health_routes());

    let audio_files = ServeDir::new(state.audio.root());

    Router::new()
        .merge(protected)
        .merge(public)
        .nest_service(services::audio_store::AUDIO_URL_PREFIX, audio_files)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
