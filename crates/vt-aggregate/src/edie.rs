//! Edie's-box aggregation of trajectory samples into a raw speed field.
//!
//! # Algorithm
//!
//! For every accepted record:
//!
//! ```text
//! t = timestamp − start_time                      (seconds)
//! x = x_position / 5280 − min_milemarker          (miles)
//! keep samples with y_position in the lane band
//! group samples by (⌊t/dt⌋, ⌊x/dx⌋)
//! per group:  TTD[bin] += max x − min x
//!             TTT[bin] += max t − min t
//! ```
//!
//! Groups whose bin falls outside the grid are dropped.  After all records
//! have been absorbed, `speed = 3600 · TTD / TTT` per bin, `NaN` where
//! `TTT == 0`.
//!
//! # Reduction
//!
//! TTD and TTT are plain sums, so partial aggregators over disjoint record
//! subsets combine with [`BoxAggregator::merge`] in any order.  The
//! `parallel` feature uses this to fold records on Rayon workers.
//!
//! # Streaming
//!
//! [`aggregate_reader`] feeds records from a JSON array straight into the
//! aggregator as they decode, so memory stays bounded by the grid rather than
//! the input.  [`aggregate_reader_par`] buffers a fixed-size chunk at a time
//! and folds each chunk in parallel.

use std::io::Read;

use rustc_hash::FxHashMap;

use vt_core::config::FEET_PER_MILE;
use vt_core::{GridConfig, LaneBand, RawSpeedField, VtError};

use crate::{AggregateResult, LoadStats, TrajectoryRecord, for_each_record};

/// Records buffered per chunk by [`aggregate_reader_par`].
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

// ── Stats ─────────────────────────────────────────────────────────────────────

/// Counters describing one aggregation pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Records offered to the aggregator.
    pub records_seen:     u64,
    /// Records passing the time-window / direction / length filter.
    pub records_accepted: u64,
    /// Samples in the lane band that landed inside the grid.
    pub samples_binned:   u64,
    /// Samples of accepted records discarded (other lane, non-finite, or
    /// outside the grid).
    pub samples_dropped:  u64,
}

impl std::ops::AddAssign for AggregateStats {
    fn add_assign(&mut self, rhs: Self) {
        self.records_seen     += rhs.records_seen;
        self.records_accepted += rhs.records_accepted;
        self.samples_binned   += rhs.samples_binned;
        self.samples_dropped  += rhs.samples_dropped;
    }
}

// ── Per-record bin extent ─────────────────────────────────────────────────────

/// Min/max of a record's samples inside one bin.
#[derive(Copy, Clone)]
struct Extent {
    t_min: f64,
    t_max: f64,
    x_min: f64,
    x_max: f64,
}

impl Extent {
    fn new(t: f64, x: f64) -> Self {
        Self { t_min: t, t_max: t, x_min: x, x_max: x }
    }

    fn include(&mut self, t: f64, x: f64) {
        self.t_min = self.t_min.min(t);
        self.t_max = self.t_max.max(t);
        self.x_min = self.x_min.min(x);
        self.x_max = self.x_max.max(x);
    }
}

// ── BoxAggregator ─────────────────────────────────────────────────────────────

/// Accumulates total travel distance and time per space-time bin.
///
/// Feed records with [`add_record`](Self::add_record), then call
/// [`finish`](Self::finish).  Accumulators only ever grow.
#[derive(Clone, Debug)]
pub struct BoxAggregator {
    grid:    GridConfig,
    lane:    LaneBand,
    n_time:  usize,
    n_space: usize,
    /// Total travel distance (miles), row-major `[t_index * n_space + x_index]`.
    ttd:     Vec<f64>,
    /// Total travel time (seconds), same layout as `ttd`.
    ttt:     Vec<f64>,
    stats:   AggregateStats,
}

impl BoxAggregator {
    /// Create an empty aggregator.  Fails if `grid` is invalid.
    pub fn new(grid: GridConfig, lane: LaneBand) -> AggregateResult<Self> {
        grid.validate()?;
        let n_time = grid.n_time_bins();
        let n_space = grid.n_space_bins();
        Ok(Self {
            grid,
            lane,
            n_time,
            n_space,
            ttd: vec![0.0; n_time * n_space],
            ttt: vec![0.0; n_time * n_space],
            stats: AggregateStats::default(),
        })
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn lane(&self) -> LaneBand {
        self.lane
    }

    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    /// Total travel distance per bin (miles).
    pub fn ttd(&self) -> &[f64] {
        &self.ttd
    }

    /// Total travel time per bin (seconds).
    pub fn ttt(&self) -> &[f64] {
        &self.ttt
    }

    /// Does `record` overlap the time window, travel in the modeled
    /// direction, and carry a positive vehicle length?
    pub fn accepts(&self, record: &TrajectoryRecord) -> bool {
        record.last_timestamp >= self.grid.start_time
            && record.first_timestamp <= self.grid.end_time
            && record.direction == self.grid.direction
            && record.length > 0.0
    }

    /// Absorb one record.  Records failing [`accepts`](Self::accepts) or with
    /// mismatched sample arrays are ignored.
    pub fn add_record(&mut self, record: &TrajectoryRecord) {
        self.stats.records_seen += 1;
        if !self.accepts(record) || record.sample_count().is_none() {
            return;
        }
        self.stats.records_accepted += 1;

        let mut groups: FxHashMap<(usize, usize), Extent> = FxHashMap::default();
        for (ts, x_ft, y) in record.samples() {
            let t = ts - self.grid.start_time;
            let x = x_ft / FEET_PER_MILE - self.grid.min_milemarker;
            if !(t.is_finite() && x.is_finite() && self.lane.contains(y)) {
                self.stats.samples_dropped += 1;
                continue;
            }
            match self.grid.bin_of(t, x) {
                Some(bin) => {
                    self.stats.samples_binned += 1;
                    groups
                        .entry(bin)
                        .and_modify(|e| e.include(t, x))
                        .or_insert_with(|| Extent::new(t, x));
                }
                None => self.stats.samples_dropped += 1,
            }
        }

        for ((ti, xi), e) in groups {
            let cell = ti * self.n_space + xi;
            self.ttd[cell] += e.x_max - e.x_min;
            self.ttt[cell] += e.t_max - e.t_min;
        }
    }

    /// Add another aggregator's totals into this one.
    ///
    /// Both must share the same grid shape.
    pub fn merge(&mut self, other: &BoxAggregator) -> AggregateResult<()> {
        if other.ttd.len() != self.ttd.len() {
            return Err(VtError::ShapeMismatch { expected: self.ttd.len(), got: other.ttd.len() }.into());
        }
        self.absorb(other);
        Ok(())
    }

    fn absorb(&mut self, other: &BoxAggregator) {
        for (a, b) in self.ttd.iter_mut().zip(&other.ttd) {
            *a += b;
        }
        for (a, b) in self.ttt.iter_mut().zip(&other.ttt) {
            *a += b;
        }
        self.stats += other.stats;
    }

    /// Convert totals into the raw speed field.
    pub fn finish(self) -> AggregateResult<RawSpeedField> {
        Ok(RawSpeedField::from_totals(self.n_time, self.n_space, &self.ttd, &self.ttt)?)
    }
}

// ── Convenience drivers ───────────────────────────────────────────────────────

/// Aggregate a record stream in one sequential pass.
pub fn aggregate<I>(grid: GridConfig, lane: LaneBand, records: I) -> AggregateResult<RawSpeedField>
where
    I: IntoIterator<Item = TrajectoryRecord>,
{
    let mut agg = BoxAggregator::new(grid, lane)?;
    for record in records {
        agg.add_record(&record);
    }
    log_stats(&agg);
    agg.finish()
}

/// Aggregate a record slice on Rayon's thread pool.
///
/// Each worker folds records into a private [`BoxAggregator`]; partials are
/// summed pairwise.
#[cfg(feature = "parallel")]
pub fn aggregate_par(
    grid:    GridConfig,
    lane:    LaneBand,
    records: &[TrajectoryRecord],
) -> AggregateResult<RawSpeedField> {
    let empty = BoxAggregator::new(grid, lane)?;
    let agg = fold_chunk(&empty, records);
    log_stats(&agg);
    agg.finish()
}

/// Aggregate a JSON record array as it is read.
///
/// Returns the field together with the reader's decode counts.
pub fn aggregate_reader<R: Read>(
    grid:   GridConfig,
    lane:   LaneBand,
    reader: R,
) -> AggregateResult<(RawSpeedField, LoadStats)> {
    let mut agg = BoxAggregator::new(grid, lane)?;
    let loaded = for_each_record(reader, |record| agg.add_record(&record))?;
    log_stats(&agg);
    Ok((agg.finish()?, loaded))
}

/// Streaming aggregation with each chunk of `chunk_size` records folded on
/// Rayon's thread pool.
///
/// At most one chunk is held in memory.  A `chunk_size` of zero uses
/// [`DEFAULT_CHUNK_SIZE`].
#[cfg(feature = "parallel")]
pub fn aggregate_reader_par<R: Read>(
    grid:       GridConfig,
    lane:       LaneBand,
    reader:     R,
    chunk_size: usize,
) -> AggregateResult<(RawSpeedField, LoadStats)> {
    let chunk_size = if chunk_size == 0 { DEFAULT_CHUNK_SIZE } else { chunk_size };
    let empty = BoxAggregator::new(grid, lane)?;
    let mut agg = empty.clone();
    let mut chunk = Vec::with_capacity(chunk_size);

    let loaded = for_each_record(reader, |record| {
        chunk.push(record);
        if chunk.len() == chunk_size {
            agg.absorb(&fold_chunk(&empty, &chunk));
            chunk.clear();
        }
    })?;
    if !chunk.is_empty() {
        agg.absorb(&fold_chunk(&empty, &chunk));
    }
    log_stats(&agg);
    Ok((agg.finish()?, loaded))
}

/// Fold `records` into per-worker copies of `empty`, then sum the partials.
#[cfg(feature = "parallel")]
fn fold_chunk(empty: &BoxAggregator, records: &[TrajectoryRecord]) -> BoxAggregator {
    use rayon::prelude::*;

    records
        .par_iter()
        .fold(
            || empty.clone(),
            |mut acc, record| {
                acc.add_record(record);
                acc
            },
        )
        .reduce(
            || empty.clone(),
            |mut a, b| {
                a.absorb(&b);
                a
            },
        )
}

fn log_stats(agg: &BoxAggregator) {
    let s = agg.stats();
    log::info!(
        "aggregated {}/{} records into {}×{} bins (lane {}): {} samples binned, {} dropped",
        s.records_accepted,
        s.records_seen,
        agg.n_time,
        agg.n_space,
        agg.lane.number(),
        s.samples_binned,
        s.samples_dropped,
    );
}
