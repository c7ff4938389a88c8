//! Client for the hosted avatar streaming service.

use crate::config::AvatarConfig;
use crate::error::VoiceError;
use crate::session::{IceCandidate, Session, SessionDescription};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, error};

/// Remote avatar stream operations.
#[async_trait]
pub trait AvatarStream: Send + Sync {
    /// Opens a new stream and returns its descriptor.
    async fn create_stream(&self) -> Result<Session, VoiceError>;

    /// Makes the avatar speak `text` on the given stream.
    async fn speak(&self, session: &Session, text: &str) -> Result<(), VoiceError>;

    async fn submit_answer(
        &self,
        session: &Session,
        answer: &SessionDescription,
    ) -> Result<(), VoiceError>;

    async fn submit_ice_candidate(
        &self,
        session: &Session,
        candidate: &IceCandidate,
    ) -> Result<(), VoiceError>;

    async fn close_stream(&self, session: &Session) -> Result<(), VoiceError>;
}

/// Builds the `Authorization` value for the avatar service.
///
/// Keys already carrying the `Basic` scheme are used verbatim.
pub fn authorization_header(api_key: &str) -> String {
    if api_key.starts_with("Basic") {
        api_key.to_string()
    } else {
        format!("Basic {}", BASE64_STANDARD.encode(api_key.as_bytes()))
    }
}

/// Interprets a stream-creation body.
///
/// Error payloads and bodies without a stream id are rejected so that no
/// half-initialized session is ever stored.
pub(crate) fn parse_session(body: &str) -> Result<Session, VoiceError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| VoiceError::RemoteService(format!("malformed stream response: {}", e)))?;

    if value.get("error").is_some() {
        let details = value
            .get("details")
            .map(|d| match d {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| "unknown avatar service error".to_string());
        return Err(VoiceError::RemoteService(details));
    }

    match value.get("id").and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => {}
        _ => {
            return Err(VoiceError::RemoteService(
                "stream response has no id".to_string(),
            ))
        }
    }

    serde_json::from_value(value)
        .map_err(|e| VoiceError::RemoteService(format!("malformed stream descriptor: {}", e)))
}

/// reqwest-backed [`AvatarStream`].
#[derive(Debug, Clone)]
pub struct AvatarClient {
    config: AvatarConfig,
    client: Client,
    auth_header: String,
}

impl AvatarClient {
    pub fn new(config: AvatarConfig) -> Result<Self, VoiceError> {
        if config.api_key.trim().is_empty() || config.agent_id.trim().is_empty() {
            return Err(VoiceError::Config(
                "avatar api_key and agent_id are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))?;
        let auth_header = authorization_header(&config.api_key);

        Ok(Self {
            config,
            client,
            auth_header,
        })
    }

    pub fn agent_id(&self) -> &str {
        &self.config.agent_id
    }

    fn streams_path(&self) -> String {
        format!("agents/{}/streams", self.config.agent_id)
    }

    /// Sends one request and returns the body of a successful response.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<String, VoiceError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        debug!(%method, %url, "avatar service request");

        let mut request = self
            .client
            .request(method, &url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            error!(%url, timeout = e.is_timeout(), "avatar request failed: {}", e);
            VoiceError::Transport(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_client_error() || status.is_server_error() {
            error!(status = status.as_u16(), body = %text, "avatar service returned an error");
            return Err(VoiceError::RemoteService(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl AvatarStream for AvatarClient {
    async fn create_stream(&self) -> Result<Session, VoiceError> {
        let body = self
            .request(Method::POST, &self.streams_path(), Some(json!({})))
            .await?;
        parse_session(&body)
    }

    async fn speak(&self, session: &Session, text: &str) -> Result<(), VoiceError> {
        let payload = json!({
            "script": {
                "type": "text",
                "input": text,
                "provider": self.config.voice,
            },
            "session_id": session.session_id,
        });
        let path = format!("{}/{}", self.streams_path(), session.id);
        self.request(Method::POST, &path, Some(payload)).await?;
        Ok(())
    }

    async fn submit_answer(
        &self,
        session: &Session,
        answer: &SessionDescription,
    ) -> Result<(), VoiceError> {
        let payload = json!({
            "answer": answer,
            "session_id": session.session_id,
        });
        let path = format!("{}/{}/sdp", self.streams_path(), session.id);
        self.request(Method::POST, &path, Some(payload)).await?;
        Ok(())
    }

    async fn submit_ice_candidate(
        &self,
        session: &Session,
        candidate: &IceCandidate,
    ) -> Result<(), VoiceError> {
        let payload = json!({
            "candidate": candidate.candidate,
            "sdpMid": candidate.sdp_mid,
            "sdpMLineIndex": candidate.sdp_m_line_index,
            "session_id": session.session_id,
        });
        let path = format!("{}/{}/ice", self.streams_path(), session.id);
        self.request(Method::POST, &path, Some(payload)).await?;
        Ok(())
    }

    async fn close_stream(&self, session: &Session) -> Result<(), VoiceError> {
        let payload = json!({ "session_id": session.session_id });
        let path = format!("{}/{}", self.streams_path(), session.id);
        self.request(Method::DELETE, &path, Some(payload)).await?;
        Ok(())
    }
}
