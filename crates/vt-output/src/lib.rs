//! `vt-output` — writers for pipeline results.
//!
//! Two backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                                |
//! |-----------|---------|--------------------------------------------------------------|
//! | *(none)*  | CSV     | `raw_field.csv`, `smoothed_field.csv`, `trajectories.csv`    |
//! | `sqlite`  | SQLite  | `output.db`                                                  |
//!
//! Both implement [`OutputWriter`].  Undefined speeds (`NaN`) are written as
//! empty CSV cells or SQL `NULL`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use vt_output::{CsvWriter, OutputWriter};
//!
//! let mut w = CsvWriter::new(Path::new("./output"))?;
//! w.write_smoothed_field(&smoothed)?;
//! for traj in &trajectories {
//!     w.write_trajectory(traj)?;
//! }
//! w.finish()?;
//! ```

pub mod csv;
pub mod error;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
