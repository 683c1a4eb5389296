use std::time::Duration;

use thiserror::Error;

/// Errors raised by the ingestion pipeline stages.
///
/// Stage-local conditions (`NotFound`, `Publish`) are caught and counted by the
/// stage that raises them; everything else ends the run with an `error` status.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("feed request failed: {0}")]
    Feed(#[from] reqwest::Error),
    #[error("feed responded with status {0}")]
    FeedStatus(reqwest::StatusCode),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("{kind} not found: {value:?}")]
    NotFound { kind: &'static str, value: String },
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("could not publish to {target}: {reason}")]
    Publish { target: String, reason: String },
    #[error("pipeline run timed out after {0:?}")]
    Timeout(Duration),
}

impl PipelineError {
    pub fn not_found(kind: &'static str, value: impl Into<String>) -> Self {
        PipelineError::NotFound {
            kind,
            value: value.into(),
        }
    }

    /// Whether the next scheduled run can reasonably be expected to succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Feed(_) | PipelineError::Timeout(_) | PipelineError::Publish { .. } => {
                true
            }
            PipelineError::FeedStatus(status) => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            PipelineError::Storage(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
            PipelineError::InvalidInput(_) | PipelineError::NotFound { .. } => false,
        }
    }
}
