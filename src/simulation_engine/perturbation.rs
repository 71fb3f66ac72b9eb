use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::simulation_engine::junctions::Junction;

pub const MIN_DENSITY: f64 = 10.0;
pub const MAX_DENSITY: f64 = 100.0;
pub const MIN_WAIT_TIME: f64 = 5.0;

/// Largest step of the density random walk, in either direction.
pub const DENSITY_STEP: f64 = 2.5;
/// Largest step of the wait-time random walk, in either direction.
pub const WAIT_TIME_STEP: f64 = 5.0;

/// Source of uniform samples in `[0, 1)` driving the traffic random walk.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;
}

/// Adapts any `rand` generator into a [`RandomSource`].
pub struct RngSource<R>(pub R);

impl RngSource<SmallRng> {
    pub fn from_os_rng() -> Self {
        Self(SmallRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

// Maps a unit sample onto a symmetric step in [-step, +step].
fn step_from_unit(unit: f64, step: f64) -> f64 {
    (unit - 0.5) * 2.0 * step
}

/// Applies one random-walk step to density and wait time, then re-derives status.
pub fn perturb_junction(junction: &mut Junction, random: &mut dyn RandomSource) {
    let density_delta = step_from_unit(random.next_unit(), DENSITY_STEP);
    let wait_delta = step_from_unit(random.next_unit(), WAIT_TIME_STEP);
    apply_deltas(junction, density_delta, wait_delta);
}

/// Shifts density and wait time by the given deltas, keeping both inside their bounds.
pub fn apply_deltas(junction: &mut Junction, density_delta: f64, wait_delta: f64) {
    junction.density = (junction.density + density_delta).clamp(MIN_DENSITY, MAX_DENSITY);
    junction.wait_time = (junction.wait_time + wait_delta).max(MIN_WAIT_TIME);
    junction.refresh_status();
}
