use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Public endpoint of the avatar streaming service.
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://api.d-id.com";

/// Public endpoint of the hosted speech recognizer.
pub const DEFAULT_SPEECH_BASE_URL: &str = "https://speech.googleapis.com/v1";

fn default_avatar_base_url() -> String {
    DEFAULT_AVATAR_BASE_URL.to_string()
}

fn default_speech_base_url() -> String {
    DEFAULT_SPEECH_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_locale() -> String {
    "es-MX".to_string()
}

/// Voice the avatar speaks with.
///
/// Serialized as the `provider` object of a stream script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// TTS provider name as understood by the avatar service.
    #[serde(rename = "type")]
    pub provider: String,
    pub voice_id: String,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            provider: "microsoft".to_string(),
            voice_id: "es-MX-JorgeNeural".to_string(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AvatarConfig {
    #[serde(default = "default_avatar_base_url")]
    pub base_url: String,
    /// Raw API key, or a value already prefixed with `Basic `.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default)]
    pub agent_id: String,
    /// Per-request timeout in seconds. Default: 30.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub voice: VoiceProfile,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_url: default_avatar_base_url(),
            api_key: String::new(),
            agent_id: String::new(),
            timeout_seconds: default_timeout_seconds(),
            voice: VoiceProfile::default(),
        }
    }
}

impl fmt::Debug for AvatarConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("agent_id", &self.agent_id)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("voice", &self.voice)
            .finish()
    }
}

impl AvatarConfig {
    pub fn new(api_key: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            agent_id: agent_id.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,
    /// Falls back to the language-model key when left empty.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// BCP-47 locale passed to the recognizer.
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            api_key: String::new(),
            locale: default_locale(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("locale", &self.locale)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl SpeechConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
