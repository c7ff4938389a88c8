//! Avatar session descriptor and its owner.

use crate::avatar::AvatarStream;
use crate::error::VoiceError;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

/// ICE (STUN/TURN) server handed to the browser's peer connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    /// The service sends either a single URL or a list.
    #[serde(deserialize_with = "one_or_many")]
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub credential: String,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(url) => vec![url],
        OneOrMany::Many(urls) => urls,
    })
}

/// SDP offer or answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub kind: String,
    pub sdp: String,
}

/// A trickled ICE candidate from the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(rename = "sdpMid", default)]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", default)]
    pub sdp_m_line_index: Option<u32>,
}

/// One live avatar stream.
///
/// Field names follow the avatar service so the descriptor can be passed to
/// the presentation surface untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stream identifier.
    pub id: String,
    pub session_id: String,
    pub offer: SessionDescription,
    #[serde(default)]
    pub ice_servers: Vec<IceServer>,
}

/// Owns the single avatar session of a kiosk visit.
///
/// A failed creation clears any previous session; the caller decides when to
/// try again.
pub struct AvatarSessionManager {
    stream: Arc<dyn AvatarStream>,
    session: Option<Session>,
}

impl AvatarSessionManager {
    pub fn new(stream: Arc<dyn AvatarStream>) -> Self {
        Self {
            stream,
            session: None,
        }
    }

    /// The live session, if one was created successfully.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Creates a fresh stream and stores it as the live session.
    ///
    /// Any previous stream is closed first, so a reload or a retry never
    /// leaves an orphaned stream on the remote side. If creation fails the
    /// manager is left without a session.
    pub async fn create_session(&mut self) -> Result<&Session, VoiceError> {
        self.close_session().await;

        match self.stream.create_stream().await {
            Ok(session) => {
                info!(
                    stream_id = %session.id,
                    ice_servers = session.ice_servers.len(),
                    "avatar session created"
                );
                Ok(self.session.insert(session))
            }
            Err(e) => {
                warn!(error = %e, "avatar session creation failed");
                Err(e)
            }
        }
    }

    /// Pushes text into the live stream.
    ///
    /// Failures are logged and otherwise ignored; session state is unchanged.
    pub async fn send_text(&self, text: &str) {
        let Some(session) = &self.session else {
            warn!("dropping avatar speech, no active session");
            return;
        };

        if let Err(e) = self.stream.speak(session, text).await {
            error!(stream_id = %session.id, error = %e, "failed to push text to avatar stream");
        }
    }

    /// Relays the browser's SDP answer.
    pub async fn submit_answer(&self, answer: &SessionDescription) -> Result<(), VoiceError> {
        let session = self.session.as_ref().ok_or(VoiceError::NoSession)?;
        self.stream.submit_answer(session, answer).await
    }

    /// Relays one ICE candidate gathered by the browser.
    pub async fn submit_ice_candidate(&self, candidate: &IceCandidate) -> Result<(), VoiceError> {
        let session = self.session.as_ref().ok_or(VoiceError::NoSession)?;
        self.stream.submit_ice_candidate(session, candidate).await
    }

    /// Tears the live stream down, best effort.
    pub async fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            match self.stream.close_stream(&session).await {
                Ok(()) => info!(stream_id = %session.id, "avatar session closed"),
                Err(e) => warn!(stream_id = %session.id, error = %e, "failed to close avatar session"),
            }
        }
    }
}
