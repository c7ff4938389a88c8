use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssistError {
    /// A hosted API answered with an error status or error payload.
    #[error("remote service error: {0}")]
    RemoteService(String),

    #[error("transport error: {0}")]
    Transport(String),

    /// Model output could not be turned into the expected shape.
    #[error("model contract violation: {0}")]
    ModelContractViolation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AssistError {
    fn from(err: reqwest::Error) -> Self {
        AssistError::Transport(err.to_string())
    }
}
