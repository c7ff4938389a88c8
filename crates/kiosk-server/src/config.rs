//! Kiosk configuration loading from file and environment variables.

use kiosk_assist::{Coordinates, LlmConfig, MapsConfig};
use kiosk_voice::{AvatarConfig, SpeechConfig};
use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use thiserror::Error;

/// Top-level kiosk configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Avatar streaming service. Key and agent id usually come from the
    /// environment.
    #[serde(default)]
    pub avatar: AvatarConfig,

    /// Hosted speech recognizer.
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Hosted language model.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Directions, places and map embeds.
    #[serde(default)]
    pub maps: MapsConfig,

    /// Conversation behavior.
    #[serde(default)]
    pub kiosk: KioskConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "kiosk_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// How replies are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStrategy {
    /// Free-form structured replies from the language model.
    #[default]
    Generated,
    /// Category classification mapped to canned answers and clips.
    Canned,
}

impl ResponseStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseStrategy::Generated => "generated",
            ResponseStrategy::Canned => "canned",
        }
    }
}

impl fmt::Display for ResponseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown response strategy: {0}")]
pub struct ParseStrategyError(pub String);

impl FromStr for ResponseStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generated" => Ok(ResponseStrategy::Generated),
            "canned" => Ok(ResponseStrategy::Canned),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

/// Conversation behavior of the kiosk.
#[derive(Debug, Clone, Deserialize)]
pub struct KioskConfig {
    /// Where every narrated route starts.
    #[serde(default = "default_route_origin")]
    pub route_origin: String,

    #[serde(default)]
    pub strategy: ResponseStrategy,

    /// Kiosk coordinates. Without them the location context is unknown
    /// unless crowding is simulated.
    #[serde(default)]
    pub location: Option<Coordinates>,

    /// Report a synthetic crowding level instead of looking up the nearest
    /// station.
    #[serde(default = "default_simulate_crowding")]
    pub simulate_crowding: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_route_origin() -> String {
    "Zócalo, CDMX".to_string()
}

fn default_simulate_crowding() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            route_origin: default_route_origin(),
            strategy: ResponseStrategy::default(),
            location: None,
            simulate_crowding: default_simulate_crowding(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required credential is absent.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}

impl Config {
    /// Checks the credentials the kiosk cannot run without.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingCredential` naming the environment
    /// variable that supplies the first missing value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.avatar.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("DID_API_KEY"));
        }
        if self.avatar.agent_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential("DID_AGENT_ID"));
        }
        if self.llm.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("GOOGLE_API_KEY"));
        }
        Ok(())
    }

    /// Maps and speech reuse the language-model key unless given their own.
    fn share_google_key(&mut self) {
        if self.maps.api_key.is_empty() {
            self.maps.api_key = self.llm.api_key.clone();
        }
        if self.speech.api_key.is_empty() {
            self.speech.api_key = self.llm.api_key.clone();
        }
    }
}

/// Applies environment overrides through `lookup`.
fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(host) = lookup("KIOSK_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("KIOSK_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = lookup("KIOSK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("KIOSK_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(key) = lookup("DID_API_KEY") {
        config.avatar.api_key = key;
    }
    if let Some(agent_id) = lookup("DID_AGENT_ID") {
        config.avatar.agent_id = agent_id;
    }
    if let Some(key) = lookup("GOOGLE_API_KEY") {
        config.llm.api_key = key;
    }
    if let Some(key) = lookup("GOOGLE_MAPS_API_KEY") {
        config.maps.api_key = key;
    }
    if let Some(origin) = lookup("KIOSK_ROUTE_ORIGIN") {
        if !origin.trim().is_empty() {
            config.kiosk.route_origin = origin;
        }
    }
    if let Some(strategy) = lookup("KIOSK_STRATEGY") {
        match strategy.parse() {
            Ok(parsed) => config.kiosk.strategy = parsed,
            Err(e) => tracing::warn!(error = %e, "ignoring KIOSK_STRATEGY"),
        }
    }
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `KIOSK_HOST` overrides `server.host`
/// - `KIOSK_PORT` overrides `server.port`
/// - `KIOSK_LOG_LEVEL` overrides `logging.level`
/// - `KIOSK_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `DID_API_KEY` / `DID_AGENT_ID` set the avatar credentials
/// - `GOOGLE_API_KEY` sets the language-model key
/// - `GOOGLE_MAPS_API_KEY` overrides `maps.api_key`
/// - `KIOSK_ROUTE_ORIGIN` overrides `kiosk.route_origin`
/// - `KIOSK_STRATEGY` overrides `kiosk.strategy` (`generated` or `canned`)
///
/// Credentials are not checked here; see [`Config::validate`].
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok());
    config.share_google_key();

    Ok(config)
}
