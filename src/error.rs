use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Parser already finished")]
    AlreadyFinished,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
