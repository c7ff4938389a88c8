//! Structured assistant reply.

use serde::{Deserialize, Serialize};

/// Reply produced by the intent responder.
///
/// Invariant: when `show_route` is set, `destination` holds a non-blank
/// place name. Use [`Reply::validate`] on anything parsed from model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Text the avatar speaks.
    #[serde(rename = "responseText")]
    pub response_text: String,
    /// Whether a route map should be rendered for `destination`.
    #[serde(rename = "showRoute", default)]
    pub show_route: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// Ways a reply can break its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplyError {
    #[error("reply has no spoken text")]
    EmptyText,
    #[error("reply asks for a route without a destination")]
    MissingDestination,
}

impl Reply {
    /// A spoken-only reply.
    pub fn spoken(text: impl Into<String>) -> Self {
        Self {
            response_text: text.into(),
            show_route: false,
            destination: None,
        }
    }

    /// A reply that requests a route map to `destination`.
    pub fn with_route(text: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            response_text: text.into(),
            show_route: true,
            destination: Some(destination.into()),
        }
    }

    /// Checks the reply invariants.
    pub fn validate(&self) -> Result<(), ReplyError> {
        if self.response_text.trim().is_empty() {
            return Err(ReplyError::EmptyText);
        }
        if self.show_route && self.route_destination().is_none() {
            return Err(ReplyError::MissingDestination);
        }
        Ok(())
    }

    /// Destination to route to, only when the reply asks for a route.
    pub fn route_destination(&self) -> Option<&str> {
        if !self.show_route {
            return None;
        }
        self.destination
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}
