//! Shared types for the Metro kiosk.
//!
//! This crate holds the domain vocabulary used across the workspace: the
//! conversation modes a visitor can pick, the structured reply produced by
//! the assistant, transcript turns, intent categories, and the coarse
//! crowding indicator reported alongside the kiosk location.
//!
//! Every other kiosk crate depends on `kiosk-types` for these definitions
//! and nothing else, which keeps the dependency graph a tree.

use serde::{Deserialize, Serialize};

pub mod conversation;
pub mod reply;

pub use conversation::{ConversationTurn, MapReference, Role};
pub use reply::{Reply, ReplyError};

/// Topic/persona context selected by the visitor.
///
/// Each mode selects its own system prompt and greeting. Selecting a mode
/// resets the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Route directions inside the transit network.
    Routes,
    /// Information about World Cup matches and fan events.
    WorldCup,
    /// Tourism tips around the city.
    Tourism,
    /// Incident and security reporting.
    SecurityReport,
}

impl Mode {
    /// Every mode in display order.
    pub const ALL: [Mode; 4] = [
        Mode::Routes,
        Mode::WorldCup,
        Mode::Tourism,
        Mode::SecurityReport,
    ];

    /// Returns the wire token for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Routes => "routes",
            Self::WorldCup => "world_cup",
            Self::Tourism => "tourism",
            Self::SecurityReport => "security_report",
        }
    }

    /// Returns the label shown on the kiosk buttons.
    pub fn label(self) -> &'static str {
        match self {
            Self::Routes => "Rutas",
            Self::WorldCup => "Mundial 2026",
            Self::Tourism => "Turismo",
            Self::SecurityReport => "Reporte de seguridad",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "routes" => Ok(Self::Routes),
            "world_cup" => Ok(Self::WorldCup),
            "tourism" => Ok(Self::Tourism),
            "security_report" => Ok(Self::SecurityReport),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown mode token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode: {0}")]
pub struct ParseModeError(pub String);

/// Intent categories recognised by the closed-set classifier.
///
/// The classifier model is asked to answer with exactly one token. Any token
/// outside this set maps to [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Directions to the stadium.
    StadiumRoute,
    /// Service hours.
    Schedule,
    /// Ticket price and payment.
    Fare,
    /// Fan festival information.
    FanFest,
    /// Incident or security report.
    SecurityReport,
    /// Greeting with no concrete question.
    Greeting,
    /// Anything else; the idle bundle.
    Other,
}

impl Category {
    /// Every category, `Other` last.
    pub const ALL: [Category; 7] = [
        Category::StadiumRoute,
        Category::Schedule,
        Category::Fare,
        Category::FanFest,
        Category::SecurityReport,
        Category::Greeting,
        Category::Other,
    ];

    /// Returns the token the classifier model is expected to emit.
    pub fn token(self) -> &'static str {
        match self {
            Self::StadiumRoute => "ruta_estadio",
            Self::Schedule => "horarios",
            Self::Fare => "tarifa",
            Self::FanFest => "fan_fest",
            Self::SecurityReport => "reporte_seguridad",
            Self::Greeting => "saludo",
            Self::Other => "otro",
        }
    }

    /// Maps raw model output to a category.
    ///
    /// Surrounding whitespace, quotes, trailing punctuation and case are
    /// ignored. Unknown output falls back to [`Category::Other`].
    pub fn from_token(raw: &str) -> Self {
        let cleaned = raw
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
            .trim()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|category| category.token() == cleaned)
            .unwrap_or(Self::Other)
    }
}

/// Coarse congestion indicator derived from an occupancy percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrowdingLevel {
    /// Occupancy of 75 or more.
    High,
    /// Occupancy between 40 and 74.
    Medium,
    /// Occupancy below 40.
    Agile,
}

impl CrowdingLevel {
    /// Classifies an occupancy value.
    pub fn from_occupancy(occupancy: u8) -> Self {
        match occupancy {
            75.. => Self::High,
            40..=74 => Self::Medium,
            _ => Self::Agile,
        }
    }

    /// Returns the label embedded in the location context.
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Agile => "Agile",
        }
    }
}
