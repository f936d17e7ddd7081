use axum::{
    Router,
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::config::Credentials;
use crate::data_models::SessionReport;
use crate::pipeline::ReportPipeline;

pub mod handlers;
pub mod models;

/// UI state kept between requests.
///
/// There is one slot per server, not per browser: every client sees and can
/// download the most recent report, and concurrent runs overwrite each other
/// (last write wins). Fine for the default loopback bind; a shared deployment
/// would need a session key per client.
#[derive(Debug, Default)]
pub struct UiSession {
    pub last_report: Option<SessionReport>,
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReportPipeline>,
    pub credentials: Credentials,
    pub session: Arc<Mutex<UiSession>>,
}

impl AppState {
    pub fn new(pipeline: ReportPipeline, credentials: Credentials) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            credentials,
            session: Arc::new(Mutex::new(UiSession::default())),
        }
    }
}

pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/status", get(handlers::status_handler))
        .route("/api/credentials", post(handlers::credentials_handler))
        .route("/api/report", post(handlers::report_handler))
        .route("/api/report/last", get(handlers::last_report_handler))
        .route("/api/report/download", get(handlers::download_handler))
        .with_state(state)
        // Static file serving for the UI
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
}
