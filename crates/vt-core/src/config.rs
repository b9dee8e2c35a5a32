//! Pipeline configuration.
//!
//! Every constant the numeric stages depend on lives in one of these structs
//! and is passed explicitly into each call; no stage reads a module-level
//! default.  Typically the application crate loads a [`PipelineConfig`] from
//! JSON (feature `serde`) or builds one from CLI flags.

use crate::{VtError, VtResult};

/// Feet per mile.  Raw `x_position` samples are recorded in feet.
pub const FEET_PER_MILE: f64 = 5_280.0;

/// Tolerance used when turning a span/step ratio into a bin count, so that
/// `4.0 / 0.02` yields 200 bins rather than 201 after rounding error.
const BIN_COUNT_EPS: f64 = 1e-9;

/// Largest accepted `ReconstructionConfig::time_decimals`; finer rounding
/// falls below the resolution of an `f64` timestamp.
const MAX_TIME_DECIMALS: i32 = 9;

// ── GridConfig ────────────────────────────────────────────────────────────────

/// Space-time discretization of the corridor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridConfig {
    /// Spatial bin size in miles.
    pub dx: f64,
    /// Temporal bin size in seconds.
    pub dt: f64,
    /// Absolute start of the aggregation window (Unix seconds).
    pub start_time: f64,
    /// Absolute end of the aggregation window (Unix seconds).
    pub end_time: f64,
    /// Length of the instrumented corridor in miles.  Default: 4.
    pub corridor_miles: f64,
    /// Milemarker of the corridor's lower end.  Default: 58.7.
    pub min_milemarker: f64,
    /// Travel direction selected for aggregation.  Default: −1.
    pub direction: i32,
}

impl GridConfig {
    /// Grid over `[start_time, end_time]` with the default corridor geometry.
    pub fn new(dx: f64, dt: f64, start_time: f64, end_time: f64) -> Self {
        Self {
            dx,
            dt,
            start_time,
            end_time,
            corridor_miles: 4.0,
            min_milemarker: 58.7,
            direction: -1,
        }
    }

    pub fn validate(&self) -> VtResult<()> {
        if !(self.dx.is_finite() && self.dx > 0.0) {
            return Err(VtError::Config(format!("dx must be positive, got {}", self.dx)));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(VtError::Config(format!("dt must be positive, got {}", self.dt)));
        }
        if !(self.end_time > self.start_time) {
            return Err(VtError::Config(format!(
                "end_time {} must be after start_time {}",
                self.end_time, self.start_time
            )));
        }
        if !(self.corridor_miles.is_finite() && self.corridor_miles > 0.0) {
            return Err(VtError::Config(format!(
                "corridor_miles must be positive, got {}",
                self.corridor_miles
            )));
        }
        Ok(())
    }

    /// Number of temporal bins: ⌈(end − start) / dt⌉.
    pub fn n_time_bins(&self) -> usize {
        bin_count(self.end_time - self.start_time, self.dt)
    }

    /// Number of spatial bins: ⌈corridor_miles / dx⌉.
    pub fn n_space_bins(&self) -> usize {
        bin_count(self.corridor_miles, self.dx)
    }

    /// Bin containing a sample at relative time `t` and relative position
    /// `x`, or `None` if it falls outside the grid.
    #[inline]
    pub fn bin_of(&self, t: f64, x: f64) -> Option<(usize, usize)> {
        let ti = (t / self.dt).floor();
        let xi = (x / self.dx).floor();
        if !(ti >= 0.0 && xi >= 0.0) {
            return None;
        }
        let (ti, xi) = (ti as usize, xi as usize);
        (ti < self.n_time_bins() && xi < self.n_space_bins()).then_some((ti, xi))
    }

    /// Relative time (seconds) assigned to a temporal bin in the smoothed field.
    #[inline]
    pub fn cell_time(&self, t_index: usize) -> f64 {
        self.dt * t_index as f64
    }

    /// Absolute milemarker assigned to a spatial bin in the smoothed field.
    #[inline]
    pub fn cell_milemarker(&self, x_index: usize) -> f64 {
        self.dx * x_index as f64 + self.min_milemarker
    }
}

fn bin_count(span: f64, step: f64) -> usize {
    let n = (span / step - BIN_COUNT_EPS).ceil();
    if n > 0.0 { n as usize } else { 0 }
}

// ── LaneBand ──────────────────────────────────────────────────────────────────

/// One of the four lateral-position bands used to select a lane.
///
/// Lane 1 is the leftmost (HOV) lane; lane 4 the rightmost.  Each band spans
/// 12 ft: lane *n* covers `[12·n, 12·(n+1))`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LaneBand {
    Lane1,
    Lane2,
    Lane3,
    Lane4,
}

impl LaneBand {
    pub const ALL: [LaneBand; 4] = [LaneBand::Lane1, LaneBand::Lane2, LaneBand::Lane3, LaneBand::Lane4];

    pub fn from_number(n: u8) -> VtResult<Self> {
        match n {
            1 => Ok(LaneBand::Lane1),
            2 => Ok(LaneBand::Lane2),
            3 => Ok(LaneBand::Lane3),
            4 => Ok(LaneBand::Lane4),
            _ => Err(VtError::Config(format!("lane number must be 1–4, got {n}"))),
        }
    }

    pub fn number(self) -> u8 {
        match self {
            LaneBand::Lane1 => 1,
            LaneBand::Lane2 => 2,
            LaneBand::Lane3 => 3,
            LaneBand::Lane4 => 4,
        }
    }

    /// Lateral bounds `(lower, upper)` in feet.
    pub fn bounds(self) -> (f64, f64) {
        let lower = 12.0 * self.number() as f64;
        (lower, lower + 12.0)
    }

    /// Inclusive-lower / exclusive-upper membership test.
    #[inline]
    pub fn contains(self, y: f64) -> bool {
        let (lower, upper) = self.bounds();
        y >= lower && y < upper
    }
}

// ── SmoothingConfig ───────────────────────────────────────────────────────────

/// Parameters of the two-regime adaptive smoothing filter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmoothingConfig {
    /// Full spatial window width in miles.  Candidates lie within
    /// `x_window / 2` of the query; the kernel scales by `x_window`.
    pub x_window: f64,
    /// Full temporal window width in seconds.
    pub t_window: f64,
    /// Free-flow wave speed (mph).  Negative: waves travel with the flow.
    pub c_free: f64,
    /// Congested wave speed (mph).
    pub c_cong: f64,
    /// Speed (mph) at which the regime blend weight is 0.5.
    pub transition_speed: f64,
    /// Width (mph) of the tanh regime transition.
    pub transition_width: f64,
    /// Speed returned for both regimes when no candidate carries weight.
    pub fallback_speed: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            x_window:         0.15,
            t_window:         36.0,
            c_free:           -70.0,
            c_cong:           13.0,
            transition_speed: 36.0,
            transition_width: 3.1,
            fallback_speed:   80.0,
        }
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> VtResult<()> {
        for (name, v) in [
            ("x_window", self.x_window),
            ("t_window", self.t_window),
            ("transition_width", self.transition_width),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(VtError::Config(format!("{name} must be positive, got {v}")));
            }
        }
        if self.c_free == 0.0 || self.c_cong == 0.0 {
            return Err(VtError::Config("wave speeds must be non-zero".into()));
        }
        Ok(())
    }
}

// ── ReconstructionConfig ──────────────────────────────────────────────────────

/// Parameters of virtual-trajectory integration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReconstructionConfig {
    /// Seconds before the seed time kept in the field window.
    pub lookback: f64,
    /// Total length of the field window in seconds.
    pub horizon: f64,
    /// Half-width (seconds) of the interpolation support rectangle.
    pub support_t: f64,
    /// Half-width (miles) of the interpolation support rectangle.
    pub support_x: f64,
    /// Integration time step in seconds.
    pub time_step: f64,
    /// Decimal places the time coordinate is rounded to after each step.
    pub time_decimals: i32,
    /// Default start position (corridor entry).
    pub x_start: f64,
    /// Far boundary; integration stops once position reaches it.
    pub x_end: f64,
    /// Axis used to mirror the field for reverse-direction reconstruction.
    pub reflection_axis: f64,
    /// Upper bound on integration steps per trajectory.
    pub max_steps: usize,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            lookback:        30.0,
            horizon:         900.0,
            support_t:       8.0,
            support_x:       0.04,
            time_step:       0.1,
            time_decimals:   1,
            x_start:         0.32,
            x_end:           4.3,
            reflection_axis: 63.0,
            max_steps:       20_000,
        }
    }
}

impl ReconstructionConfig {
    pub fn validate(&self) -> VtResult<()> {
        for (name, v) in [
            ("horizon", self.horizon),
            ("support_t", self.support_t),
            ("support_x", self.support_x),
            ("time_step", self.time_step),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(VtError::Config(format!("{name} must be positive, got {v}")));
            }
        }
        for (name, v) in [
            ("lookback", self.lookback),
            ("x_start", self.x_start),
            ("x_end", self.x_end),
            ("reflection_axis", self.reflection_axis),
        ] {
            if !v.is_finite() {
                return Err(VtError::Config(format!("{name} must be finite, got {v}")));
            }
        }
        if self.x_start >= self.x_end {
            return Err(VtError::Config(format!(
                "x_start {} must be below x_end {}",
                self.x_start, self.x_end
            )));
        }
        if !(0..=MAX_TIME_DECIMALS).contains(&self.time_decimals) {
            return Err(VtError::Config(format!(
                "time_decimals must be in 0..={MAX_TIME_DECIMALS}, got {}",
                self.time_decimals
            )));
        }
        if self.max_steps == 0 {
            return Err(VtError::Config("max_steps must be at least 1".into()));
        }
        Ok(())
    }

    /// Default start and end positions of an integration.
    ///
    /// `x_start` and `x_end` are reflected coordinates.  A forward
    /// (milemarker) integration covers the same stretch of road, so its
    /// bounds are the mirror images `(axis − x_end, axis − x_start)`.
    #[inline]
    pub fn span(&self, reflected: bool) -> (f64, f64) {
        if reflected {
            (self.x_start, self.x_end)
        } else {
            (self.reflection_axis - self.x_end, self.reflection_axis - self.x_start)
        }
    }

    /// Field time window `[t0 − lookback, t0 − lookback + horizon)`.
    #[inline]
    pub fn time_window(&self, t0: f64) -> (f64, f64) {
        let start = t0 - self.lookback;
        (start, start + self.horizon)
    }

    /// Advance `t` by one step, rounded to `time_decimals` places.
    #[inline]
    pub fn next_time(&self, t: f64) -> f64 {
        let scale = 10f64.powi(self.time_decimals);
        ((t + self.time_step) * scale).round() / scale
    }
}

// ── PipelineConfig ────────────────────────────────────────────────────────────

/// Everything needed to run aggregation, smoothing and reconstruction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    pub grid:           GridConfig,
    pub lane:           LaneBand,
    #[cfg_attr(feature = "serde", serde(default))]
    pub smoothing:      SmoothingConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub reconstruction: ReconstructionConfig,
}

impl PipelineConfig {
    pub fn new(grid: GridConfig, lane: LaneBand) -> Self {
        Self {
            grid,
            lane,
            smoothing: SmoothingConfig::default(),
            reconstruction: ReconstructionConfig::default(),
        }
    }

    pub fn validate(&self) -> VtResult<()> {
        self.grid.validate()?;
        self.smoothing.validate()?;
        self.reconstruction.validate()
    }
}
