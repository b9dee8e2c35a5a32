//! Pipeline error type.
//!
//! Sub-crates define their own error enums and wrap `VtError` as one variant
//! via `#[from]`.

use thiserror::Error;

/// The top-level error type for `vt-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum VtError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("bin ({t_index}, {x_index}) outside {n_time}×{n_space} grid")]
    BinOutOfRange {
        t_index: usize,
        x_index: usize,
        n_time:  usize,
        n_space: usize,
    },

    #[error("field shape mismatch: expected {expected} cells, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
}

/// Shorthand result type for all `vt-*` crates.
pub type VtResult<T> = Result<T, VtError>;
