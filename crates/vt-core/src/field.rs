//! Raw and smoothed speed fields.
//!
//! # Layout
//!
//! [`RawSpeedField`] is a dense row-major matrix indexed by
//! `(t_index, x_index)`:
//!
//! ```text
//! speeds[ t_index * n_space + x_index ]
//! ```
//!
//! Cells with no observed travel time hold `NaN`.  The NaN is data, not an
//! error: downstream stages skip it when selecting candidates but never
//! replace it.
//!
//! [`SmoothedSpeedField`] is a table with one [`SmoothedRow`] per raw cell, in
//! the raw field's row-major order.

use crate::{GridConfig, VtError, VtResult};

// ── FieldPoint ────────────────────────────────────────────────────────────────

/// A single speed observation at a space-time location.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldPoint {
    /// Seconds.
    pub t:     f64,
    /// Miles.
    pub x:     f64,
    /// Miles per hour.
    pub speed: f64,
}

impl FieldPoint {
    #[inline]
    pub fn new(t: f64, x: f64, speed: f64) -> Self {
        Self { t, x, speed }
    }
}

// ── RawSpeedField ─────────────────────────────────────────────────────────────

/// Edie's-box space-mean speed per bin, in mph.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSpeedField {
    n_time:  usize,
    n_space: usize,
    speeds:  Vec<f64>,
}

impl RawSpeedField {
    /// Wrap a row-major speed matrix.
    pub fn new(n_time: usize, n_space: usize, speeds: Vec<f64>) -> VtResult<Self> {
        let expected = n_time * n_space;
        if speeds.len() != expected {
            return Err(VtError::ShapeMismatch { expected, got: speeds.len() });
        }
        Ok(Self { n_time, n_space, speeds })
    }

    /// Build from accumulated total travel distance (miles) and total travel
    /// time (seconds): `speed = 3600 · TTD / TTT`.
    ///
    /// A bin with `TTT == 0` yields `NaN` (0/0 or x/0 is not coerced).
    pub fn from_totals(n_time: usize, n_space: usize, ttd: &[f64], ttt: &[f64]) -> VtResult<Self> {
        let expected = n_time * n_space;
        for got in [ttd.len(), ttt.len()] {
            if got != expected {
                return Err(VtError::ShapeMismatch { expected, got });
            }
        }
        let speeds = ttd
            .iter()
            .zip(ttt)
            .map(|(&d, &t)| if t == 0.0 { f64::NAN } else { 3600.0 * d / t })
            .collect();
        Ok(Self { n_time, n_space, speeds })
    }

    /// A field of the given shape with every cell undefined.
    pub fn undefined(n_time: usize, n_space: usize) -> Self {
        Self { n_time, n_space, speeds: vec![f64::NAN; n_time * n_space] }
    }

    pub fn n_time(&self) -> usize {
        self.n_time
    }

    pub fn n_space(&self) -> usize {
        self.n_space
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    /// Speed at a cell, `None` if the indices are out of range.  A defined
    /// index can still return `Some(NaN)`.
    #[inline]
    pub fn get(&self, t_index: usize, x_index: usize) -> Option<f64> {
        (t_index < self.n_time && x_index < self.n_space)
            .then(|| self.speeds[t_index * self.n_space + x_index])
    }

    /// Overwrite one cell.
    pub fn set(&mut self, t_index: usize, x_index: usize, speed: f64) -> VtResult<()> {
        if t_index >= self.n_time || x_index >= self.n_space {
            return Err(VtError::BinOutOfRange {
                t_index,
                x_index,
                n_time: self.n_time,
                n_space: self.n_space,
            });
        }
        self.speeds[t_index * self.n_space + x_index] = speed;
        Ok(())
    }

    /// Row-major slice of all speeds.
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    /// `(t_index, x_index, speed)` for every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let n_space = self.n_space.max(1);
        self.speeds
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i / n_space, i % n_space, v))
    }

    /// Number of cells with a defined (finite) speed.
    pub fn defined_count(&self) -> usize {
        self.speeds.iter().filter(|v| v.is_finite()).count()
    }

    /// Defined cells as points in smoothing coordinates: `t = dt · t_index`
    /// seconds, `x = dx · x_index + min_milemarker`.
    pub fn observations(&self, grid: &GridConfig) -> Vec<FieldPoint> {
        self.cells()
            .filter(|(_, _, v)| v.is_finite())
            .map(|(ti, xi, v)| FieldPoint::new(grid.cell_time(ti), grid.cell_milemarker(xi), v))
            .collect()
    }
}

// ── SmoothedSpeedField ────────────────────────────────────────────────────────

/// One grid cell of the smoothed field.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmoothedRow {
    pub t_index:    usize,
    pub x_index:    usize,
    /// Raw Edie speed of this cell (may be `NaN`).
    pub raw_speed:  f64,
    /// Seconds since the aggregation window start.
    pub time:       f64,
    /// Absolute milemarker.
    pub milemarker: f64,
    /// Smoothed speed estimate (mph).
    pub speed:      f64,
}

impl SmoothedRow {
    #[inline]
    pub fn point(&self) -> FieldPoint {
        FieldPoint::new(self.time, self.milemarker, self.speed)
    }
}

/// The smoothed field, one row per grid cell in raw row-major order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SmoothedSpeedField {
    pub rows: Vec<SmoothedRow>,
}

impl SmoothedSpeedField {
    pub fn new(rows: Vec<SmoothedRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SmoothedRow> {
        self.rows.iter()
    }

    /// `(time, milemarker, speed)` of every row.
    pub fn points(&self) -> impl Iterator<Item = FieldPoint> + '_ {
        self.rows.iter().map(SmoothedRow::point)
    }
}

impl<'a> IntoIterator for &'a SmoothedSpeedField {
    type Item = &'a SmoothedRow;
    type IntoIter = std::slice::Iter<'a, SmoothedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
