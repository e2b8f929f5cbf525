use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single fetch cycle
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed responded with status {0}")]
    Status(StatusCode),

    #[error("failed to decode feed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("fetch task failed: {0}")]
    Task(String),
}
