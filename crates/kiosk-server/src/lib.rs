//! Kiosk server library logic.

pub mod api;
pub mod config;
pub mod conversation;
pub mod kiosk;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use kiosk::Kiosk;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single kiosk visit.
    ///
    /// An async mutex: interactions hold it across every hosted-service
    /// call, which keeps one interaction in flight at a time.
    pub kiosk: Arc<Mutex<Kiosk>>,
}

impl AppState {
    pub fn new(kiosk: Kiosk) -> Self {
        Self {
            kiosk: Arc::new(Mutex::new(kiosk)),
        }
    }
}

/// Maximum request body size (16 MiB). Audio clips arrive base64-encoded.
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/session",
            get(api::get_session_handler).post(api::create_session_handler),
        )
        .route("/api/session/sdp", post(api::submit_answer_handler))
        .route("/api/session/ice", post(api::submit_ice_handler))
        .route("/api/modes", get(api::list_modes_handler))
        .route("/api/modes/{mode}", post(api::enter_mode_handler))
        .route("/api/mode", delete(api::exit_mode_handler))
        .route("/api/query", post(api::query_handler))
        .route("/api/audio", post(api::audio_handler))
        .route("/api/transcript", get(api::transcript_handler))
        .route("/api/context", get(api::context_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
