//! `vt-smooth` — adaptive smoothing of raw Edie speed fields.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`filter`]  | `kernel_weight`, `adaptive_smooth`, `RegimeEstimate`        |
//! | [`index`]   | `FieldIndex`, R-tree over `(t, x)` observation points       |
//! | [`builder`] | `FieldBuilder`, `smooth_raw_field`                          |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Smooths grid cells on Rayon's thread pool.               |

pub mod builder;
pub mod filter;
pub mod index;

#[cfg(test)]
mod tests;

pub use builder::{FieldBuilder, smooth_raw_field};
pub use filter::{RegimeEstimate, adaptive_smooth, in_window, kernel_weight};
pub use index::FieldIndex;
