//! Seed-driven trajectory integration.
//!
//! The smoothed field is indexed in milemarkers.  Reverse-direction seeds
//! mirror the field through `reflection_axis` before integrating, so a
//! reflected seed's `x0` is measured in the mirrored coordinate and output
//! samples are mapped back to milemarkers.  Forward seeds integrate in
//! milemarkers directly, between the mirror images of `x_start` and `x_end`
//! (see [`ReconstructionConfig::span`]).

use vt_core::{FieldPoint, ReconstructionConfig, SmoothedSpeedField, VehicleId, VirtualTrajectory, VtResult};

use crate::{LocalBicubic, ReconstructError, ReconstructResult};

// ── Seed ──────────────────────────────────────────────────────────────────────

/// Starting point of one virtual trajectory.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Seed {
    pub t0:        f64,
    pub vehicle:   VehicleId,
    /// Start position; `None` uses the start of the configured span.
    pub x0:        Option<f64>,
    /// Integrate in the mirrored coordinate (reverse direction).
    pub reflected: bool,
}

impl Seed {
    pub fn new(t0: f64, vehicle: VehicleId) -> Self {
        Self { t0, vehicle, x0: None, reflected: false }
    }

    pub fn at(mut self, x0: f64) -> Self {
        self.x0 = Some(x0);
        self
    }

    pub fn reversed(mut self) -> Self {
        self.reflected = true;
        self
    }
}

// ── Reconstructor ─────────────────────────────────────────────────────────────

/// Integrates virtual trajectories through a [`SmoothedSpeedField`].
#[derive(Clone, Debug)]
pub struct TrajectoryReconstructor {
    cfg: ReconstructionConfig,
}

impl TrajectoryReconstructor {
    pub fn new(cfg: ReconstructionConfig) -> VtResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.cfg
    }

    /// Interpolant over the part of `field` visible to `seed`.
    pub fn interpolant(&self, field: &SmoothedSpeedField, seed: &Seed) -> LocalBicubic {
        let (start, end) = self.cfg.time_window(seed.t0);
        let axis = self.cfg.reflection_axis;
        let reflected = seed.reflected;
        let points = field
            .points()
            .filter(|p| p.t >= start && p.t < end)
            .map(|p| if reflected { FieldPoint::new(p.t, axis - p.x, p.speed) } else { p });
        LocalBicubic::new(points, self.cfg.support_t, self.cfg.support_x)
    }

    /// Reconstruct a single trajectory.
    pub fn reconstruct(
        &self,
        field: &SmoothedSpeedField,
        seed:  &Seed,
    ) -> ReconstructResult<VirtualTrajectory> {
        let interp = self.interpolant(field, seed);
        let traj = self.integrate(&interp, seed)?;
        if seed.reflected {
            let axis = self.cfg.reflection_axis;
            Ok(traj.map_space(|x| axis - x))
        } else {
            Ok(traj)
        }
    }

    /// Forward-Euler integration in the interpolant's coordinates.
    pub fn integrate(&self, interp: &LocalBicubic, seed: &Seed) -> ReconstructResult<VirtualTrajectory> {
        let cfg = &self.cfg;
        let vehicle = seed.vehicle;
        let speed_at = |t: f64, x: f64| {
            interp
                .interpolate(t, x)
                .map_err(|reason| ReconstructError::InsufficientData { vehicle, t, x, reason })
        };

        let (x_start, x_end) = cfg.span(seed.reflected);
        let mut t = seed.t0;
        let mut x = seed.x0.unwrap_or(x_start);
        if !(x < x_end) {
            return Err(ReconstructError::StartBeyondEnd { vehicle, x0: x, x_end });
        }
        let v0 = speed_at(t, x)?;

        let mut traj = VirtualTrajectory::new(vehicle);
        traj.push(t, x, v0);

        // The first step starts at the seed, whose speed is already known.
        let mut pending = Some(v0);
        let mut steps = 0;
        while x < x_end {
            if steps == cfg.max_steps {
                return Err(ReconstructError::StepBudgetExhausted {
                    vehicle,
                    max_steps: cfg.max_steps,
                    t,
                    x,
                });
            }
            let v = match pending.take() {
                Some(v) => v,
                None => speed_at(t, x)?,
            };
            x += cfg.time_step * v / 3600.0;
            t = cfg.next_time(t);
            traj.push(t, x, v);
            steps += 1;
        }
        Ok(traj)
    }

    /// Reconstruct independent seeds; one result per seed, in seed order.
    pub fn reconstruct_many(
        &self,
        field: &SmoothedSpeedField,
        seeds: &[Seed],
    ) -> Vec<ReconstructResult<VirtualTrajectory>> {
        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = seeds.iter().map(|s| self.reconstruct(field, s)).collect();

        #[cfg(feature = "parallel")]
        let results: Vec<_> = {
            use rayon::prelude::*;

            seeds.par_iter().map(|s| self.reconstruct(field, s)).collect()
        };

        let mut failed = 0;
        for r in &results {
            if let Err(e) = r {
                log::warn!("reconstruction failed: {e}");
                failed += 1;
            }
        }
        log::debug!("reconstructed {}/{} seeds", seeds.len() - failed, seeds.len());
        results
    }
}
