//! R-tree index over space-time observation points.
//!
//! Both the field builder (smoothing windows) and the trajectory
//! reconstructor (interpolation support) need "all points within a
//! rectangle around `(t, x)`".  A linear scan per query is O(N) and makes
//! field smoothing O(N²); the R-tree brings each query down to
//! O(log N + k).
//!
//! The envelope query is padded slightly and then filtered with the exact
//! `|Δt| <= half_t && |Δx| <= half_x` predicate, so the selected set is
//! identical to what a linear scan with the same predicate returns.

use rstar::{AABB, RTree, RTreeObject};

use vt_core::FieldPoint;

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
struct Entry {
    point: [f64; 2], // [t, x]
    speed: f64,
}

impl RTreeObject for Entry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

// ── FieldIndex ────────────────────────────────────────────────────────────────

/// Read-only spatial index of [`FieldPoint`]s.  `Sync`, so one index can
/// serve many parallel queries.
pub struct FieldIndex {
    tree: RTree<Entry>,
}

impl FieldIndex {
    /// Bulk-load the index.  Points with non-finite coordinates are skipped.
    pub fn new<I: IntoIterator<Item = FieldPoint>>(points: I) -> Self {
        let entries: Vec<Entry> = points
            .into_iter()
            .filter(|p| p.t.is_finite() && p.x.is_finite())
            .map(|p| Entry { point: [p.t, p.x], speed: p.speed })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Every point with `|p.t − t| <= half_t` and `|p.x − x| <= half_x`.
    pub fn within(&self, t: f64, x: f64, half_t: f64, half_x: f64) -> impl Iterator<Item = FieldPoint> + '_ {
        let pad_t = half_t * 1e-9 + t.abs() * 1e-12;
        let pad_x = half_x * 1e-9 + x.abs() * 1e-12;
        let envelope = AABB::from_corners(
            [t - half_t - pad_t, x - half_x - pad_x],
            [t + half_t + pad_t, x + half_x + pad_x],
        );
        self.tree
            .locate_in_envelope(&envelope)
            .filter(move |e| (e.point[0] - t).abs() <= half_t && (e.point[1] - x).abs() <= half_x)
            .map(|e| FieldPoint::new(e.point[0], e.point[1], e.speed))
    }
}
