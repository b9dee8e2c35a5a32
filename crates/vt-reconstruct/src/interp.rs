//! Local bicubic interpolation of a gridded speed field.
//!
//! A query at `(t, x)` collects every field point within `±half_t` and
//! `±half_x`.  Those points must form a complete rectilinear sub-grid with
//! at least two nodes on each axis that brackets the query; otherwise the
//! query fails with a [`SupportFailure`] rather than guessing.
//!
//! The interpolant is a tensor-product cubic Hermite spline: each time row is
//! interpolated along `x`, then the resulting column along `t`.  Node slopes
//! are central differences (one-sided at the edges of the support), which
//! reproduces constant and linear fields exactly and keeps first derivatives
//! continuous across cell boundaries.

use vt_core::FieldPoint;
use vt_smooth::FieldIndex;

use crate::SupportFailure;

/// Relative tolerance for treating two coordinates as the same grid node.
const NODE_TOL: f64 = 1e-9;

#[inline]
fn tol(v: f64) -> f64 {
    NODE_TOL * v.abs().max(1.0)
}

/// Windowed bicubic interpolant over a fixed set of field points.
pub struct LocalBicubic {
    index:  FieldIndex,
    half_t: f64,
    half_x: f64,
}

impl LocalBicubic {
    pub fn new<I: IntoIterator<Item = FieldPoint>>(points: I, half_t: f64, half_x: f64) -> Self {
        Self { index: FieldIndex::new(points), half_t, half_x }
    }

    /// Number of field points available to the interpolant.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Interpolated speed at `(t, x)`.
    pub fn interpolate(&self, t: f64, x: f64) -> Result<f64, SupportFailure> {
        let support: Vec<FieldPoint> = self.index.within(t, x, self.half_t, self.half_x).collect();
        if support.len() < 4 {
            return Err(SupportFailure::TooFewPoints(support.len()));
        }

        let ts = axis_nodes(support.iter().map(|p| p.t));
        let xs = axis_nodes(support.iter().map(|p| p.x));
        if ts.len() < 2 || xs.len() < 2 {
            return Err(SupportFailure::DegenerateAxis);
        }
        let t = bracket(&ts, t).ok_or(SupportFailure::OutsideSupport)?;
        let x = bracket(&xs, x).ok_or(SupportFailure::OutsideSupport)?;

        // values[i * xs.len() + j] = speed at (ts[i], xs[j])
        let mut values = vec![f64::NAN; ts.len() * xs.len()];
        for p in &support {
            let (Some(i), Some(j)) = (node_of(&ts, p.t), node_of(&xs, p.x)) else {
                return Err(SupportFailure::IncompleteGrid);
            };
            values[i * xs.len() + j] = p.speed;
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SupportFailure::IncompleteGrid);
        }

        let column: Vec<f64> = values
            .chunks_exact(xs.len())
            .map(|row| hermite(&xs, row, x))
            .collect();
        let v = hermite(&ts, &column, t);
        if v.is_finite() { Ok(v) } else { Err(SupportFailure::NonFinite) }
    }
}

// ── Axis helpers ──────────────────────────────────────────────────────────────

/// Sorted distinct node coordinates, merging values within tolerance.
fn axis_nodes(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_unstable_by(f64::total_cmp);
    let mut nodes: Vec<f64> = Vec::with_capacity(v.len());
    for c in v {
        match nodes.last() {
            Some(&last) if c - last <= tol(c) => {}
            _ => nodes.push(c),
        }
    }
    nodes
}

/// Index of the node matching `v`, if any.
fn node_of(nodes: &[f64], v: f64) -> Option<usize> {
    let k = nodes.partition_point(|&n| n < v);
    [k.checked_sub(1), Some(k)]
        .into_iter()
        .flatten()
        .filter(|&i| i < nodes.len())
        .find(|&i| (nodes[i] - v).abs() <= tol(v))
}

/// Clamp `q` onto `[first, last]` if it lies within tolerance of the range.
fn bracket(nodes: &[f64], q: f64) -> Option<f64> {
    let (lo, hi) = (nodes[0], nodes[nodes.len() - 1]);
    (q >= lo - tol(q) && q <= hi + tol(q)).then(|| q.clamp(lo, hi))
}

// ── 1-D cubic Hermite ─────────────────────────────────────────────────────────

/// Finite-difference slope at node `j`.
fn slope(nodes: &[f64], ys: &[f64], j: usize) -> f64 {
    let n = nodes.len();
    let (a, b) = match j {
        0 => (0, 1),
        _ if j == n - 1 => (n - 2, n - 1),
        _ => (j - 1, j + 1),
    };
    (ys[b] - ys[a]) / (nodes[b] - nodes[a])
}

/// Cubic Hermite interpolation of `ys` (sampled at `nodes`) at `q`.
///
/// `nodes` must be strictly increasing with at least two entries and `q`
/// must lie in `[nodes[0], nodes[n-1]]`.
fn hermite(nodes: &[f64], ys: &[f64], q: f64) -> f64 {
    let k = nodes.partition_point(|&n| n <= q).clamp(1, nodes.len() - 1) - 1;
    let h = nodes[k + 1] - nodes[k];
    let s = (q - nodes[k]) / h;
    let (s2, s3) = (s * s, s * s * s);

    let h01 = -2.0 * s3 + 3.0 * s2;
    let h10 = s3 - 2.0 * s2 + s;
    let h11 = s3 - s2;

    let (y0, y1) = (ys[k], ys[k + 1]);
    let (m0, m1) = (slope(nodes, ys, k), slope(nodes, ys, k + 1));
    // h00·y0 + h01·y1 with h00 = 1 − h01.
    y0 + h01 * (y1 - y0) + h * (h10 * m0 + h11 * m1)
}
