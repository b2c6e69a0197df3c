//! A slowly wandering offset applied to every point of a scan, modelling the calibration error a
//! tracked scanner accumulates while it moves and sheds when it is held still.

use crate::Vector3;
use crate::common::random_in_unit_sphere;
use crate::config::DriftConfig;
use log::trace;
use rand::Rng;

/// Body speed at which the drift step reaches its maximum.
const FULL_DRIFT_SPEED: f64 = 2.0;

#[derive(Debug, Clone, Default)]
pub struct DriftModel {
    offset: Vector3,
}

impl DriftModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> &Vector3 {
        &self.offset
    }

    /// The largest distance the offset can move in one update at the given speed.
    pub fn step_limit(speed: f64, dt: f64, config: &DriftConfig) -> f64 {
        (speed / FULL_DRIFT_SPEED).clamp(0.0, 1.0) * config.max_drift_rate * dt
    }

    /// Advance the drift by one tick of `dt` seconds with the body moving at `velocity`.
    ///
    /// The offset takes a random step inside a ball whose radius grows with speed. While the body
    /// is slower than the stability threshold the offset is also pulled toward zero by
    /// `relax_rate * dt` of its length.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        velocity: &Vector3,
        dt: f64,
        config: &DriftConfig,
        rng: &mut R,
    ) {
        if !(dt > 0.0 && dt.is_finite()) {
            trace!("Skipping drift update for interval dt={}", dt);
            return;
        }

        let speed = velocity.norm();
        let amount = Self::step_limit(speed, dt, config);
        self.offset += random_in_unit_sphere(rng) * amount;

        if speed < config.stable_speed_threshold {
            let t = (dt * config.relax_rate).clamp(0.0, 1.0);
            self.offset = self.offset.lerp(&Vector3::zeros(), t);
        }
    }
}
