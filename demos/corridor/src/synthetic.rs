//! Synthetic corridor traffic with a single stop-and-go wave.
//!
//! Vehicles travel in direction −1 (decreasing milemarker) across the whole
//! corridor in all four lanes.  A congestion pulse starts near the far end
//! and propagates upstream at the congested wave speed, so the generated
//! field exercises both regimes of the smoothing filter.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

use vt_core::config::FEET_PER_MILE;
use vt_core::{GridConfig, LaneBand};

/// Shape of the generated traffic.
#[derive(Clone, Debug)]
pub struct Scenario {
    /// Absolute timestamp of the observation window start.
    pub start:         f64,
    /// Window length in seconds.
    pub duration:      f64,
    /// Seconds before `start` at which vehicles begin entering.
    pub warmup:        f64,
    /// Interval between recorded samples, seconds.
    pub sample_period: f64,
    /// Uniform headway range per lane, seconds.
    pub headway:       (f64, f64),
    /// Mean desired speed, mph.
    pub free_speed:    f64,
    /// Fractional speed drop at the centre of the wave.
    pub wave_depth:    f64,
    /// Wave half-width, miles of travel.
    pub wave_width:    f64,
    /// Upstream propagation speed of the wave, mph.
    pub wave_speed:    f64,
    /// Travel distance of the wave centre at `start`, miles.
    pub wave_origin:   f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            start:         1_668_600_000.0,
            duration:      900.0,
            warmup:        300.0,
            sample_period: 0.5,
            headway:       (4.0, 8.0),
            free_speed:    60.0,
            wave_depth:    0.75,
            wave_width:    0.25,
            wave_speed:    13.0,
            wave_origin:   3.2,
        }
    }
}

impl Scenario {
    /// Grid covering the scenario window.
    pub fn grid(&self, dx: f64, dt: f64) -> GridConfig {
        GridConfig::new(dx, dt, self.start, self.start + self.duration)
    }

    /// Speed at travel distance `s` (miles from corridor entry) and time `t`
    /// (seconds from `start`) for a vehicle with desired speed `desired`.
    pub fn speed(&self, s: f64, t: f64, desired: f64) -> f64 {
        let centre = self.wave_origin - self.wave_speed * t / 3_600.0;
        let z = (s - centre) / self.wave_width;
        desired * (1.0 - self.wave_depth * (-z * z).exp())
    }

    /// Generate JSON records for every lane.
    pub fn generate(&self, rng_seed: u64, grid: &GridConfig) -> Vec<Value> {
        let mut rng = SmallRng::seed_from_u64(rng_seed);
        let mut records = Vec::new();
        for lane in LaneBand::ALL {
            let (lo, hi) = lane.bounds();
            let mut entry = -self.warmup;
            while entry < self.duration {
                let desired = self.free_speed * rng.gen_range(0.9..1.1);
                let y = rng.gen_range(lo + 2.0..hi - 2.0);
                let length = rng.gen_range(12.0..20.0);
                records.push(self.vehicle(entry, desired, y, length, grid));
                entry += rng.gen_range(self.headway.0..self.headway.1);
            }
        }
        log::info!("generated {} synthetic records", records.len());
        records
    }

    fn vehicle(&self, entry: f64, desired: f64, y: f64, length: f64, grid: &GridConfig) -> Value {
        let mut timestamp = Vec::new();
        let mut x_position = Vec::new();
        let mut y_position = Vec::new();

        let (mut t, mut s) = (entry, 0.0);
        while s <= grid.corridor_miles && t <= self.duration {
            let milemarker = grid.min_milemarker + grid.corridor_miles - s;
            timestamp.push(self.start + t);
            x_position.push(milemarker * FEET_PER_MILE);
            y_position.push(y);
            s += self.speed(s, t, desired) * self.sample_period / 3_600.0;
            t += self.sample_period;
        }

        json!({
            "first_timestamp": timestamp.first(),
            "last_timestamp":  timestamp.last(),
            "direction":       -1,
            "length":          length,
            "timestamp":       timestamp,
            "x_position":      x_position,
            "y_position":      y_position,
        })
    }
}
