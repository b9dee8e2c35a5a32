//! Reconstruction error types.
//!
//! Errors are per trajectory: a failing seed never affects other seeds.

use thiserror::Error;

use vt_core::{VehicleId, VtError};

/// Why the interpolant could not be evaluated at a point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum SupportFailure {
    #[error("{0} field points in the support window")]
    TooFewPoints(usize),

    #[error("support points do not span both axes")]
    DegenerateAxis,

    #[error("support points do not form a complete grid")]
    IncompleteGrid,

    #[error("query lies outside the support points")]
    OutsideSupport,

    #[error("interpolated value is not finite")]
    NonFinite,
}

/// Errors produced by `vt-reconstruct`.
#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error(transparent)]
    Core(#[from] VtError),

    #[error("{vehicle}: insufficient interpolation data at (t={t}, x={x}): {reason}")]
    InsufficientData {
        vehicle: VehicleId,
        t:       f64,
        x:       f64,
        reason:  SupportFailure,
    },

    #[error("{vehicle}: start position {x0} is not below the end position {x_end}")]
    StartBeyondEnd {
        vehicle: VehicleId,
        x0:      f64,
        x_end:   f64,
    },

    #[error("{vehicle}: step budget of {max_steps} exhausted at (t={t}, x={x})")]
    StepBudgetExhausted {
        vehicle:   VehicleId,
        max_steps: usize,
        t:         f64,
        x:         f64,
    },
}

pub type ReconstructResult<T> = Result<T, ReconstructError>;
