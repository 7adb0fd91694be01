use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadbrainError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type ReadbrainResult<T> = Result<T, ReadbrainError>;
