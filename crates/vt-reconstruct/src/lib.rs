//! `vt-reconstruct` — virtual trajectories through a smoothed speed field.
//!
//! # Integration
//!
//! ```text
//! window field to [t0 − lookback, t0 − lookback + horizon)
//! v = interp(t0, x0);  push (t0, x0, v)
//! while x < x_end:
//!     v = interp(t, x)
//!     x += time_step · v / 3600
//!     t  = round(t + time_step, time_decimals)
//!     push (t, x, v)
//! ```
//!
//! Every step depends only on the previous one, so a single trajectory is
//! strictly sequential.  Independent seeds share nothing but the read-only
//! field and can run in parallel (feature `parallel`).
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`interp`]      | `LocalBicubic`, windowed bicubic Hermite interpolant  |
//! | [`reconstruct`] | `TrajectoryReconstructor`, `Seed`                     |
//! | [`error`]       | `ReconstructError`, `SupportFailure`                  |

pub mod error;
pub mod interp;
pub mod reconstruct;


pub use error::{ReconstructError, ReconstructResult, SupportFailure};
pub use interp::LocalBicubic;
pub use reconstruct::{Seed, TrajectoryReconstructor};
