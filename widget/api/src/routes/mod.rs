//! Router assembly.
//!
//! ```text
//!   POST /api/log_chat      question/response pairs from the chat widget
//!   POST /api/save_input    raw submitted questions
//!   POST /api/clear_inputs  truncate the input log
//!   GET  /api/visits        bump and read the visit counter
//!   GET  /api/spotify       now playing (10 s cache)
//!   GET  /data/*            content JSON (experience, projects, ai_config, ...)
//! ```
//!
//! Store files are never served under `/data`, even when the store and the
//! content share a directory.

pub mod logs;
pub mod spotify;
pub mod visits;

use std::path::Path;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::store::STORE_FILES;

/// `{success, message}` reply shared by the log endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiReply {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ApiReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            id: None,
        }
    }
}

/// Build the full router
pub fn app(state: AppState, content_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/log_chat", post(logs::log_chat))
        .route("/api/save_input", post(logs::save_input))
        .route("/api/clear_inputs", post(logs::clear_inputs))
        .route("/api/visits", get(visits::visits))
        .route("/api/spotify", get(spotify::now_playing))
        .merge(content_routes(content_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Static content under `/data`, minus the store's own files
fn content_routes<S: Clone + Send + Sync + 'static>(content_dir: &Path) -> Router<S> {
    Router::new()
        .nest_service("/data", ServeDir::new(content_dir))
        .layer(middleware::from_fn(hide_store_files))
}

async fn hide_store_files(request: Request, next: Next) -> Response {
    if is_hidden(request.uri().path()) {
        tracing::debug!(path = %request.uri().path(), "Refusing to serve store file");
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}

/// Store files, and any name with percent escapes (content names never need them)
fn is_hidden(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.contains('%') || STORE_FILES.iter().any(|file| name.eq_ignore_ascii_case(file))
}
