//! The two-regime adaptive smoothing filter.
//!
//! For a query `(t, x)` and each candidate observation `(tₛ, xₛ, vₛ)`:
//!
//! ```text
//! Δx = x − xₛ
//! Δt = t − tₛ
//! β(c) = exp( −( |Δx| / x_window + |Δt − 3600·Δx / c| / t_window ) )
//!
//! v_free = Σ β(c_free) vₛ / Σ β(c_free)
//! v_cong = Σ β(c_cong) vₛ / Σ β(c_cong)
//!
//! w = ½ (1 + tanh((v_crit − min(v_free, v_cong)) / Δv))
//! v  = w · v_cong + (1 − w) · v_free
//! ```
//!
//! The kernel is stretched along each regime's characteristic line in the
//! space-time plane, so information travels downstream in free flow and
//! upstream in congestion.  If either weight sum is exactly zero, both regime
//! estimates take `fallback_speed`.

use vt_core::{FieldPoint, SmoothingConfig};

/// Both regime estimates and their blend at one query point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RegimeEstimate {
    pub free:              f64,
    pub congested:         f64,
    /// Weight given to `congested`; in `[0, 1]`.
    pub transition_weight: f64,
    pub smoothed:          f64,
}

/// Anisotropic kernel weight for a candidate offset by `(dt, dx)` from the
/// query, assuming waves travel at `wave_speed` mph.
#[inline]
pub fn kernel_weight(dt: f64, dx: f64, wave_speed: f64, cfg: &SmoothingConfig) -> f64 {
    let skew = dt - 3600.0 * dx / wave_speed;
    (-(dx.abs() / cfg.x_window + skew.abs() / cfg.t_window)).exp()
}

/// Is `p` a candidate for a query at `(t, x)`?  Inclusive on both axes.
#[inline]
pub fn in_window(t: f64, x: f64, p: &FieldPoint, cfg: &SmoothingConfig) -> bool {
    (p.t - t).abs() <= cfg.t_window / 2.0 && (p.x - x).abs() <= cfg.x_window / 2.0
}

/// Smooth one query point from its candidate observations.
///
/// `candidates` should already be restricted to the query's window (see
/// [`in_window`]); observations with undefined speed are ignored.
pub fn adaptive_smooth<I>(t: f64, x: f64, candidates: I, cfg: &SmoothingConfig) -> RegimeEstimate
where
    I: IntoIterator<Item = FieldPoint>,
{
    let (mut w_free, mut wv_free) = (0.0, 0.0);
    let (mut w_cong, mut wv_cong) = (0.0, 0.0);

    for p in candidates {
        if !p.speed.is_finite() {
            continue;
        }
        let (dt, dx) = (t - p.t, x - p.x);
        let bf = kernel_weight(dt, dx, cfg.c_free, cfg);
        let bc = kernel_weight(dt, dx, cfg.c_cong, cfg);
        w_free  += bf;
        wv_free += bf * p.speed;
        w_cong  += bc;
        wv_cong += bc * p.speed;
    }

    let (free, congested) = if w_free != 0.0 && w_cong != 0.0 {
        (wv_free / w_free, wv_cong / w_cong)
    } else {
        (cfg.fallback_speed, cfg.fallback_speed)
    };

    blend(free, congested, cfg)
}

/// Sigmoid blend of the two regime estimates.
///
/// Computes `w · congested + (1 − w) · free` as `free + w · (congested − free)`;
/// equal estimates blend to themselves exactly.
#[inline]
pub fn blend(free: f64, congested: f64, cfg: &SmoothingConfig) -> RegimeEstimate {
    let v = free.min(congested);
    let w = 0.5 * (1.0 + ((cfg.transition_speed - v) / cfg.transition_width).tanh());
    RegimeEstimate {
        free,
        congested,
        transition_weight: w,
        smoothed: free + w * (congested - free),
    }
}
