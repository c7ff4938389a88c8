//! API handlers for the kiosk server.

use crate::kiosk::{AudioOutcome, Exchange, KioskError};
use crate::AppState;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use kiosk_assist::Coordinates;
use kiosk_types::{ConversationTurn, Mode};
use kiosk_voice::{IceCandidate, Session, SessionDescription, VoiceError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Request body for `POST /api/query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub text: String,
    /// Position reported by the visitor's device, when it shares one.
    #[serde(default)]
    pub location: Option<Coordinates>,
}

/// Request body for `POST /api/audio`.
#[derive(Debug, Deserialize)]
pub struct AudioRequest {
    /// Identifier of the recording, used to drop re-submissions.
    #[serde(rename = "captureId")]
    pub capture_id: String,
    /// Base64-encoded WAV clip.
    pub audio: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModeInfo {
    pub mode: Mode,
    pub label: String,
}

/// Response body for `GET /api/modes`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModesResponse {
    pub modes: Vec<ModeInfo>,
    pub active: Option<Mode>,
}

/// Response body for `POST /api/modes/{mode}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EnterModeResponse {
    pub mode: Mode,
    pub greeting: ConversationTurn,
}

/// Response body for `GET /api/transcript`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub mode: Option<Mode>,
    pub turns: Vec<ConversationTurn>,
}

/// Response body for `GET /api/context`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContextResponse {
    pub location: String,
    #[serde(rename = "routeOrigin")]
    pub route_origin: String,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("upstream service error: {0}")]
    BadGateway(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<KioskError> for ApiError {
    fn from(err: KioskError) -> Self {
        match err {
            KioskError::SessionUnavailable | KioskError::Voice(VoiceError::NoSession) => {
                ApiError::Conflict("no active avatar session; create one first".to_string())
            }
            KioskError::EmptyQuery => ApiError::BadRequest("query is empty".to_string()),
            KioskError::Voice(VoiceError::Config(msg)) => ApiError::InternalServerError(msg),
            KioskError::Voice(e) => ApiError::BadGateway(e.to_string()),
            KioskError::Assist(e) => ApiError::BadGateway(e.to_string()),
        }
    }
}

/// Handler for `GET /api/session`.
pub async fn get_session_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Session>, ApiError> {
    let kiosk = state.kiosk.lock().await;
    kiosk
        .session()
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no active avatar session".to_string()))
}

/// Handler for `POST /api/session`.
///
/// Creates a fresh avatar stream. This is also the manual retry after a
/// failed creation.
pub async fn create_session_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let mut kiosk = state.kiosk.lock().await;
    let session = kiosk.create_session().await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Handler for `POST /api/session/sdp`.
pub async fn submit_answer_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(answer): Json<SessionDescription>,
) -> Result<StatusCode, ApiError> {
    if answer.sdp.trim().is_empty() {
        return Err(ApiError::BadRequest("sdp answer is empty".to_string()));
    }
    let kiosk = state.kiosk.lock().await;
    kiosk.submit_answer(&answer).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `POST /api/session/ice`.
pub async fn submit_ice_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(candidate): Json<IceCandidate>,
) -> Result<StatusCode, ApiError> {
    let kiosk = state.kiosk.lock().await;
    kiosk.submit_ice_candidate(&candidate).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `GET /api/modes`.
pub async fn list_modes_handler(Extension(state): Extension<Arc<AppState>>) -> Json<ModesResponse> {
    let active = state.kiosk.lock().await.mode();
    let modes = Mode::ALL
        .iter()
        .map(|mode| ModeInfo {
            mode: *mode,
            label: mode.label().to_string(),
        })
        .collect();
    Json(ModesResponse { modes, active })
}

/// Handler for `POST /api/modes/{mode}`.
pub async fn enter_mode_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(mode): Path<String>,
) -> Result<Json<EnterModeResponse>, ApiError> {
    let mode: Mode = mode
        .parse()
        .map_err(|e: kiosk_types::ParseModeError| ApiError::BadRequest(e.to_string()))?;

    let mut kiosk = state.kiosk.lock().await;
    let greeting = kiosk.enter_mode(mode).await;
    Ok(Json(EnterModeResponse { mode, greeting }))
}

/// Handler for `DELETE /api/mode`.
pub async fn exit_mode_handler(Extension(state): Extension<Arc<AppState>>) -> StatusCode {
    state.kiosk.lock().await.exit_mode();
    StatusCode::NO_CONTENT
}

/// Handler for `POST /api/query`.
pub async fn query_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<Exchange>, ApiError> {
    if payload.location.is_some_and(|c| !c.is_valid()) {
        return Err(ApiError::BadRequest(
            "location is outside the valid latitude/longitude range".to_string(),
        ));
    }
    let mut kiosk = state.kiosk.lock().await;
    let exchange = kiosk
        .handle_query_near(&payload.text, payload.location)
        .await?;
    Ok(Json(exchange))
}

/// Handler for `POST /api/audio`.
pub async fn audio_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<AudioRequest>,
) -> Result<Json<AudioOutcome>, ApiError> {
    if payload.capture_id.trim().is_empty() {
        return Err(ApiError::BadRequest("captureId is required".to_string()));
    }
    let audio = STANDARD
        .decode(payload.audio.trim())
        .map_err(|e| ApiError::BadRequest(format!("audio is not valid base64: {}", e)))?;

    let mut kiosk = state.kiosk.lock().await;
    let outcome = kiosk.handle_audio(&payload.capture_id, &audio).await?;
    Ok(Json(outcome))
}

/// Handler for `GET /api/transcript`.
pub async fn transcript_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<TranscriptResponse> {
    let kiosk = state.kiosk.lock().await;
    Json(TranscriptResponse {
        mode: kiosk.mode(),
        turns: kiosk.transcript().to_vec(),
    })
}

/// Handler for `GET /api/context`.
pub async fn context_handler(Extension(state): Extension<Arc<AppState>>) -> Json<ContextResponse> {
    let kiosk = state.kiosk.lock().await;
    Json(ContextResponse {
        location: kiosk.context().await,
        route_origin: kiosk.settings().route_origin.clone(),
    })
}
