//! The perspective frustum of the sensing viewpoint and the mapping from viewport coordinates to
//! world-space rays.
//!
//! The viewpoint's local frame looks down -Z with +Y up and +X to the right. Viewport coordinates
//! run from (0, 0) at the bottom left to (1, 1) at the top right.

use crate::common::DomainMap;
use crate::config::FrustumConfig;
use crate::{Iso3, Point3, Ray, Vector3};

#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    near: f64,
    far: f64,

    /// Maps a viewport coordinate onto the near-plane extents at unit depth
    x_map: DomainMap,
    y_map: DomainMap,
}

impl Frustum {
    pub fn new(config: &FrustumConfig) -> Self {
        let half_h = (config.vertical_fov_deg.to_radians() * 0.5).tan();
        let half_w = half_h * config.aspect;
        Self {
            near: config.near,
            far: config.far,
            x_map: DomainMap::from_range(-half_w, half_w),
            y_map: DomainMap::from_range(-half_h, half_h),
        }
    }

    pub fn near(&self) -> f64 {
        self.near
    }

    pub fn far(&self) -> f64 {
        self.far
    }

    /// Returns the ray in the viewpoint's local frame through viewport coordinate (u, v). The ray
    /// starts on the near plane and has a unit direction.
    pub fn local_ray(&self, u: f64, v: f64) -> Ray {
        let through = Vector3::new(self.x_map.to(u), self.y_map.to(v), -1.0);
        Ray::new(Point3::from(through * self.near), through.normalize())
    }

    /// Returns the world-space ray through viewport coordinate (u, v) for a viewpoint placed at
    /// `viewpoint`.
    ///
    /// # Arguments
    ///
    /// * `viewpoint`: the pose of the sensing viewpoint in the world
    /// * `u`: horizontal viewport coordinate, 0 at the left edge and 1 at the right
    /// * `v`: vertical viewport coordinate, 0 at the bottom edge and 1 at the top
    ///
    /// returns: Ray
    pub fn viewport_ray(&self, viewpoint: &Iso3, u: f64, v: f64) -> Ray {
        self.local_ray(u, v).transform_by(viewpoint)
    }
}
