use crate::{Point3, Vector3};
use log::trace;

/// Derives the velocity of the sensing body from successive position samples.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    last_position: Point3,
    velocity: Vector3,
}

impl VelocityTracker {
    /// Start tracking from a body at rest at `position`.
    pub fn new(position: Point3) -> Self {
        Self {
            last_position: position,
            velocity: Vector3::zeros(),
        }
    }

    /// Record a new position sample taken `dt` seconds after the previous one and return the
    /// resulting velocity.
    ///
    /// An interval which is zero, negative or not finite cannot produce a velocity. The sample is
    /// dropped entirely and the previous velocity is returned, so the displacement is picked up by
    /// the next valid sample instead.
    pub fn update(&mut self, position: &Point3, dt: f64) -> Vector3 {
        if !(dt > 0.0 && dt.is_finite()) {
            trace!("Skipping velocity update for interval dt={}", dt);
            return self.velocity;
        }

        self.velocity = (position - self.last_position) / dt;
        self.last_position = *position;
        self.velocity
    }

    pub fn velocity(&self) -> &Vector3 {
        &self.velocity
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}
