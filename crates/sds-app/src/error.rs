use reqwest::StatusCode;
use sds_core::error::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("search failed (HTTP {0})")]
    SearchFailed(StatusCode),

    /// Message reported by the generation backend, kept verbatim.
    #[error("{0}")]
    BackendError(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("a submission is already in progress")]
    Busy,

    #[error("unknown model field: {0}")]
    UnknownField(String),

    #[error("no result at index {0}")]
    ResultNotFound(usize),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, AppError>;
