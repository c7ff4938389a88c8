use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoiceError {
    /// The remote service answered with an error status or an unusable body.
    #[error("remote service error: {0}")]
    RemoteService(String),

    /// The request never produced a response (connect failure, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    #[error("no active avatar session")]
    NoSession,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("invalid audio: {0}")]
    InvalidAudio(String),

    #[error("STT error: {0}")]
    Stt(String),
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        VoiceError::Transport(err.to_string())
    }
}
