//! Virtual trajectory samples.

use crate::VehicleId;

/// One integration step of a virtual vehicle.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrajectorySample {
    pub time:    f64,
    pub space:   f64,
    pub speed:   f64,
    pub vehicle: VehicleId,
}

/// An append-only sequence of samples for a single virtual vehicle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualTrajectory {
    pub vehicle: VehicleId,
    samples:     Vec<TrajectorySample>,
}

impl VirtualTrajectory {
    pub fn new(vehicle: VehicleId) -> Self {
        Self { vehicle, samples: Vec::new() }
    }

    pub fn with_capacity(vehicle: VehicleId, capacity: usize) -> Self {
        Self { vehicle, samples: Vec::with_capacity(capacity) }
    }

    #[inline]
    pub fn push(&mut self, time: f64, space: f64, speed: f64) {
        self.samples.push(TrajectorySample { time, space, speed, vehicle: self.vehicle });
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&TrajectorySample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    /// Apply `f` to every spatial coordinate, consuming `self`.
    pub fn map_space(mut self, f: impl Fn(f64) -> f64) -> Self {
        for s in &mut self.samples {
            s.space = f(s.space);
        }
        self
    }
}
