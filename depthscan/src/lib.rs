//! Simulation of an imperfect depth scanner (a LiDAR-like device) carried through a 3D scene.
//!
//! A scan enumerates a fixed grid of view directions over the sensor's frustum, casts each one
//! against the scene, and passes every return through a motion-dependent degradation model
//! (incidence rejection, range dropout, depth noise and a slowly wandering drift offset) before
//! it lands in the point cloud.

pub mod common;
pub mod config;
mod errors;
pub mod geom3;
pub mod io;
pub mod scene;
pub mod sensors;
pub mod session;

pub use parry3d_f64::na;

pub use config::{DegradationConfig, DriftConfig, FrustumConfig, ScanConfig, SessionConfig};
pub use errors::ScanError;
pub use geom3::{Iso3, Point3, PointCloud, PointCloudFeatures, Ray, UnitVec3, Vector3};
pub use scene::{LayerMask, Scene, SceneHit, SceneQuery};
pub use session::{Command, CommandOutcome, ScanSession, VisualizationEvent};

pub type Result<T> = std::result::Result<T, ScanError>;
