use thiserror::Error;

use vt_core::VtError;

/// Errors produced by `vt-aggregate`.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error(transparent)]
    Core(#[from] VtError),

    #[error("record stream error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AggregateResult<T> = Result<T, AggregateError>;
