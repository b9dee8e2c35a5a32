//! Drive the smoothing filter over every cell of a raw field.
//!
//! Each output row keeps the raw cell's indices and raw speed next to the
//! derived coordinates:
//!
//! ```text
//! time       = dt · t_index                 (seconds from window start)
//! milemarker = dx · x_index + min_milemarker
//! speed      = adaptive_smooth(time, milemarker, window candidates)
//! ```
//!
//! Undefined raw cells still get a row; their smoothed value comes from
//! their defined neighbours (or the fallback speed).

use vt_core::{GridConfig, RawSpeedField, SmoothedRow, SmoothedSpeedField, SmoothingConfig, VtResult};

use crate::filter::{RegimeEstimate, adaptive_smooth};
use crate::FieldIndex;

/// Builds a [`SmoothedSpeedField`] from a [`RawSpeedField`].
#[derive(Clone, Debug)]
pub struct FieldBuilder {
    cfg: SmoothingConfig,
}

impl FieldBuilder {
    pub fn new(cfg: SmoothingConfig) -> VtResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &SmoothingConfig {
        &self.cfg
    }

    /// Smooth a single query point against an observation index.
    pub fn smooth_at(&self, index: &FieldIndex, t: f64, x: f64) -> RegimeEstimate {
        let half_t = self.cfg.t_window / 2.0;
        let half_x = self.cfg.x_window / 2.0;
        adaptive_smooth(t, x, index.within(t, x, half_t, half_x), &self.cfg)
    }

    /// One row per raw cell, in the raw field's row-major order.
    pub fn build(&self, raw: &RawSpeedField, grid: &GridConfig) -> SmoothedSpeedField {
        let index = FieldIndex::new(raw.observations(grid));
        log::debug!(
            "smoothing {}×{} grid from {} defined cells",
            raw.n_time(),
            raw.n_space(),
            index.len()
        );

        let row = |(t_index, x_index, raw_speed): (usize, usize, f64)| {
            let time = grid.cell_time(t_index);
            let milemarker = grid.cell_milemarker(x_index);
            SmoothedRow {
                t_index,
                x_index,
                raw_speed,
                time,
                milemarker,
                speed: self.smooth_at(&index, time, milemarker).smoothed,
            }
        };

        #[cfg(not(feature = "parallel"))]
        let rows: Vec<SmoothedRow> = raw.cells().map(row).collect();

        #[cfg(feature = "parallel")]
        let rows: Vec<SmoothedRow> = {
            use rayon::prelude::*;

            let cells: Vec<_> = raw.cells().collect();
            cells.into_par_iter().map(row).collect()
        };

        SmoothedSpeedField::new(rows)
    }
}

/// Validate `cfg` and smooth `raw` in one call.
pub fn smooth_raw_field(
    raw:  &RawSpeedField,
    grid: &GridConfig,
    cfg:  &SmoothingConfig,
) -> VtResult<SmoothedSpeedField> {
    Ok(FieldBuilder::new(cfg.clone())?.build(raw, grid))
}
