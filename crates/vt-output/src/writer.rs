//! The `OutputWriter` trait implemented by all backend writers.

use vt_core::{RawSpeedField, SmoothedSpeedField, VirtualTrajectory};

use crate::OutputResult;

/// Trait implemented by the CSV and SQLite writers.
pub trait OutputWriter {
    /// Write every cell of the raw Edie field as `(t_index, x_index, speed)`.
    fn write_raw_field(&mut self, field: &RawSpeedField) -> OutputResult<()>;

    /// Write every row of the smoothed field.
    fn write_smoothed_field(&mut self, field: &SmoothedSpeedField) -> OutputResult<()>;

    /// Append one trajectory's samples.
    fn write_trajectory(&mut self, traj: &VirtualTrajectory) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
