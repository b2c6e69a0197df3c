//! This module contains common constructs for working with angles

use crate::Vector3;

/// Computes the incidence angle of a ray striking a surface, which is the angle between the
/// surface normal and the reversed ray direction. A ray hitting a surface head-on has an incidence
/// angle of 0, a ray grazing along the surface has an incidence angle of pi/2.
///
/// Neither vector needs to be normalized. If either is zero length the angle is 0.
///
/// # Arguments
///
/// * `normal`: the surface normal at the hit point
/// * `direction`: the direction the ray was travelling when it struck the surface
///
/// returns: f64, the angle in radians in the range [0, pi]
///
/// # Examples
///
/// ```
/// use depthscan::common::incidence_angle;
/// use depthscan::Vector3;
/// use approx::assert_relative_eq;
/// let a = incidence_angle(&Vector3::z(), &-Vector3::z());
/// assert_relative_eq!(a, 0.0);
/// ```
pub fn incidence_angle(normal: &Vector3, direction: &Vector3) -> f64 {
    normal.angle(&-direction)
}
