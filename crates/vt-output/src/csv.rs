//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `raw_field.csv`
//! - `smoothed_field.csv`
//! - `trajectories.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use vt_core::{RawSpeedField, SmoothedSpeedField, VirtualTrajectory};

use crate::OutputResult;
use crate::writer::OutputWriter;

/// `NaN` becomes an empty cell.
fn speed_cell(v: f64) -> String {
    if v.is_nan() { String::new() } else { v.to_string() }
}

/// Writes pipeline output to three CSV files.
pub struct CsvWriter {
    raw:          Writer<File>,
    smoothed:     Writer<File>,
    trajectories: Writer<File>,
    finished:     bool,
}

impl CsvWriter {
    /// Open (or create) the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut raw = Writer::from_path(dir.join("raw_field.csv"))?;
        raw.write_record(["t_index", "x_index", "speed"])?;

        let mut smoothed = Writer::from_path(dir.join("smoothed_field.csv"))?;
        smoothed.write_record(["t_index", "x_index", "raw_speed", "time", "milemarker", "speed"])?;

        let mut trajectories = Writer::from_path(dir.join("trajectories.csv"))?;
        trajectories.write_record(["time", "space", "speed", "v_id"])?;

        Ok(Self {
            raw,
            smoothed,
            trajectories,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_raw_field(&mut self, field: &RawSpeedField) -> OutputResult<()> {
        for (t_index, x_index, speed) in field.cells() {
            self.raw.write_record(&[t_index.to_string(), x_index.to_string(), speed_cell(speed)])?;
        }
        Ok(())
    }

    fn write_smoothed_field(&mut self, field: &SmoothedSpeedField) -> OutputResult<()> {
        for row in field {
            self.smoothed.write_record(&[
                row.t_index.to_string(),
                row.x_index.to_string(),
                speed_cell(row.raw_speed),
                row.time.to_string(),
                row.milemarker.to_string(),
                speed_cell(row.speed),
            ])?;
        }
        Ok(())
    }

    fn write_trajectory(&mut self, traj: &VirtualTrajectory) -> OutputResult<()> {
        for s in traj.samples() {
            self.trajectories.write_record(&[
                s.time.to_string(),
                s.space.to_string(),
                speed_cell(s.speed),
                s.vehicle.0.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.raw.flush()?;
        self.smoothed.flush()?;
        self.trajectories.flush()?;
        Ok(())
    }
}
