//! Transcript turn types.

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Map overlay attached to an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapReference {
    pub origin: String,
    pub destination: String,
    /// Travel mode passed to the map surface. Always `transit` today.
    pub travel_mode: String,
    /// Embeddable URL the presentation surface renders in an iframe.
    pub embed_url: String,
}

/// One entry of the append-only transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<MapReference>,
    /// Pre-rendered avatar clip for canned answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl ConversationTurn {
    /// A visitor turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            map: None,
            video: None,
        }
    }

    /// An assistant turn without attachments.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            map: None,
            video: None,
        }
    }

    pub fn with_map(mut self, map: MapReference) -> Self {
        self.map = Some(map);
        self
    }

    pub fn with_video(mut self, video: impl Into<String>) -> Self {
        self.video = Some(video.into());
        self
    }
}
