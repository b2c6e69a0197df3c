//! Turns an ideal ray return into what an imperfect sensor would report.
//!
//! The stages run in a fixed order and each may discard the sample:
//!
//! 1. Incidence rejection: returns striking the surface at more than the tolerance angle are lost.
//! 2. Range dropout: a return is lost with probability `dropout_chance * distance / max_range`.
//! 3. Depth noise: the point slides along the ray by a uniform amount in `[-noise, noise]`.
//! 4. Drift: the scan-wide drift offset is added.
//!
//! Only stages 2 and 3 draw from the random stream, and they do so in that order, which keeps a
//! seeded scan reproducible.

use crate::common::{DomainMap, incidence_angle};
use crate::config::DegradationConfig;
use crate::scene::SceneHit;
use crate::{Point3, Ray, Vector3};
use rand::Rng;

/// Why a return was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The ray struck the surface at too shallow an angle.
    Incidence,

    /// The return was randomly lost to range attenuation.
    Dropout,
}

/// The fate of a single ray return.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Accepted exactly as hit, which only happens with degradation disabled.
    Exact(Point3),

    /// Accepted after noise and drift were applied.
    Degraded(Point3),

    Rejected(Rejection),
}

impl SampleOutcome {
    pub fn point(&self) -> Option<Point3> {
        match self {
            SampleOutcome::Exact(p) | SampleOutcome::Degraded(p) => Some(*p),
            SampleOutcome::Rejected(_) => None,
        }
    }
}

/// The degradation model as configured for one scan. The drift offset is captured when the filter
/// is created so every point of the scan shares the same bias.
#[derive(Debug, Clone)]
pub struct DegradationFilter<'a> {
    config: &'a DegradationConfig,
    range: DomainMap,
    max_incidence: f64,
    drift: Vector3,
}

impl<'a> DegradationFilter<'a> {
    pub fn new(config: &'a DegradationConfig, max_range: f64, drift: Vector3) -> Self {
        Self {
            config,
            range: DomainMap::from_range(0.0, max_range),
            max_incidence: config.angle_tolerance_deg.to_radians(),
            drift,
        }
    }

    /// Probability that a return from `distance` is dropped, clamped to [0, 1].
    pub fn dropout_probability(&self, distance: f64) -> f64 {
        (self.config.dropout_chance * self.range.fraction(distance)).clamp(0.0, 1.0)
    }

    /// Decide what the sensor reports for `hit`, struck by `ray`.
    ///
    /// # Arguments
    ///
    /// * `ray`: the emitted ray, with a unit direction
    /// * `hit`: where the ray struck the scene
    /// * `rng`: the scan's random stream
    ///
    /// returns: SampleOutcome
    pub fn apply<R: Rng + ?Sized>(&self, ray: &Ray, hit: &SceneHit, rng: &mut R) -> SampleOutcome {
        if !self.config.enabled {
            return SampleOutcome::Exact(hit.point);
        }

        if incidence_angle(&hit.normal, &ray.dir) > self.max_incidence {
            return SampleOutcome::Rejected(Rejection::Incidence);
        }

        let dropout = self.dropout_probability(hit.distance);
        if rng.random::<f64>() < dropout {
            return SampleOutcome::Rejected(Rejection::Dropout);
        }

        let noise = self.config.noise;
        let depth = rng.random_range(-noise..=noise);
        let point = hit.point + ray.dir.normalize() * depth + self.drift;

        SampleOutcome::Degraded(point)
    }
}
