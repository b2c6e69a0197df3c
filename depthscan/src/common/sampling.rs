//! Random sampling helpers

use crate::Vector3;
use rand::Rng;

/// Draws a point uniformly distributed inside the unit sphere (the ball of radius 1 centered on
/// the origin) by rejection sampling from the enclosing cube.
pub fn random_in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vector3 {
    loop {
        let v = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        if v.norm_squared() <= 1.0 {
            return v;
        }
    }
}
