//! This module contains tools for simulating depth sensors and the imperfections of their data

pub mod degradation;
mod depth_scanner;
pub mod drift;
pub mod frustum;
pub mod grid;
pub mod velocity;

use crate::scene::SceneQuery;
use crate::{Iso3, PointCloud, Result};

pub use depth_scanner::DepthScanner;

/// Counters describing what happened to the rays of a single scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Number of grid cells, one ray each
    pub cells: usize,

    /// Rays which struck scene geometry within range
    pub hits: usize,

    pub rejected_incidence: usize,
    pub rejected_dropout: usize,
    pub accepted: usize,
}

pub trait SimulatedPointSensor {
    /// Scan `scene` from `viewpoint`, returning the accepted points in scan order.
    fn get_points(
        &mut self,
        scene: &dyn SceneQuery,
        viewpoint: &Iso3,
    ) -> Result<(PointCloud, ScanReport)>;
}
