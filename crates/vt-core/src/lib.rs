//! `vt-core` — foundational types for the virtual-trajectory pipeline.
//!
//! This crate is a dependency of every other `vt-*` crate.  It has no `vt-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `VehicleId`                                               |
//! | [`config`]      | `GridConfig`, `LaneBand`, `SmoothingConfig`, …            |
//! | [`field`]       | `RawSpeedField`, `SmoothedSpeedField`, `FieldPoint`       |
//! | [`trajectory`]  | `TrajectorySample`, `VirtualTrajectory`                   |
//! | [`error`]       | `VtError`, `VtResult`                                     |
//!
//! # Units
//!
//! Time is seconds relative to the aggregation window start; space is miles.
//! Raw-field space coordinates are relative to the corridor's minimum
//! milemarker, smoothed-field coordinates are absolute milemarkers.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod field;
pub mod ids;
pub mod trajectory;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    GridConfig, LaneBand, PipelineConfig, ReconstructionConfig, SmoothingConfig,
};
pub use error::{VtError, VtResult};
pub use field::{FieldPoint, RawSpeedField, SmoothedRow, SmoothedSpeedField};
pub use ids::VehicleId;
pub use trajectory::{TrajectorySample, VirtualTrajectory};
