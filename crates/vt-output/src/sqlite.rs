//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `raw_field`, `smoothed_field` and `trajectories`.

use std::path::Path;

use rusqlite::Connection;

use vt_core::{RawSpeedField, SmoothedSpeedField, VirtualTrajectory};

use crate::OutputResult;
use crate::writer::OutputWriter;

/// `NaN` becomes `NULL`.
fn speed_value(v: f64) -> Option<f64> {
    (!v.is_nan()).then_some(v)
}

/// Writes pipeline output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS raw_field (
                 t_index INTEGER NOT NULL,
                 x_index INTEGER NOT NULL,
                 speed   REAL,
                 PRIMARY KEY (t_index, x_index)
             );
             CREATE TABLE IF NOT EXISTS smoothed_field (
                 t_index    INTEGER NOT NULL,
                 x_index    INTEGER NOT NULL,
                 raw_speed  REAL,
                 time       REAL    NOT NULL,
                 milemarker REAL    NOT NULL,
                 speed      REAL,
                 PRIMARY KEY (t_index, x_index)
             );
             CREATE TABLE IF NOT EXISTS trajectories (
                 time  REAL    NOT NULL,
                 space REAL    NOT NULL,
                 speed REAL,
                 v_id  INTEGER NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_raw_field(&mut self, field: &RawSpeedField) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO raw_field (t_index, x_index, speed) VALUES (?1, ?2, ?3)",
            )?;
            for (t_index, x_index, speed) in field.cells() {
                stmt.execute(rusqlite::params![t_index as i64, x_index as i64, speed_value(speed)])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_smoothed_field(&mut self, field: &SmoothedSpeedField) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO smoothed_field \
                 (t_index, x_index, raw_speed, time, milemarker, speed) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in field {
                stmt.execute(rusqlite::params![
                    row.t_index as i64,
                    row.x_index as i64,
                    speed_value(row.raw_speed),
                    row.time,
                    row.milemarker,
                    speed_value(row.speed),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_trajectory(&mut self, traj: &VirtualTrajectory) -> OutputResult<()> {
        if traj.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO trajectories (time, space, speed, v_id) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for s in traj.samples() {
                stmt.execute(rusqlite::params![s.time, s.space, speed_value(s.speed), s.vehicle.0])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
