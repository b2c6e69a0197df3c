//! Configuration for a scan session.
//!
//! Every structure deserializes with per-field defaults, so a JSON file only needs to name the
//! values it changes. Defaults describe a hand-held 60×40 scanner with mild imperfections.

use crate::scene::LayerMask;
use crate::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Perspective frustum of the sensing viewpoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrustumConfig {
    /// Full vertical field of view, in degrees.
    /// Default: 60
    pub vertical_fov_deg: f64,

    /// Width over height of the viewport.
    /// Default: 1.5 (matches the 60×40 default grid)
    pub aspect: f64,

    /// Distance from the viewpoint to the near plane, where rays start.
    /// Default: 0.3
    pub near: f64,

    /// Distance from the viewpoint to the far plane.
    /// Default: 1000
    pub far: f64,
}

impl Default for FrustumConfig {
    fn default() -> Self {
        Self {
            vertical_fov_deg: 60.0,
            aspect: 1.5,
            near: 0.3,
            far: 1000.0,
        }
    }
}

impl FrustumConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.vertical_fov_deg > 0.0 && self.vertical_fov_deg < 180.0) {
            return Err(ScanError::config(format!(
                "vertical field of view must be in (0, 180) degrees, got {}",
                self.vertical_fov_deg
            )));
        }
        if !(self.aspect > 0.0 && self.aspect.is_finite()) {
            return Err(ScanError::config(format!(
                "aspect ratio must be positive, got {}",
                self.aspect
            )));
        }
        if !(self.near >= 0.0 && self.near < self.far) {
            return Err(ScanError::config(format!(
                "near plane must satisfy 0 <= near < far, got near={} far={}",
                self.near, self.far
            )));
        }
        Ok(())
    }
}

/// Configuration that is fixed for the duration of a single scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Number of grid columns.
    /// Default: 60
    pub resolution_x: usize,

    /// Number of grid rows.
    /// Default: 40
    pub resolution_y: usize,

    /// Maximum ray length. When absent the frustum's far plane is used.
    pub max_range: Option<f64>,

    /// Scene layers the scanner can see.
    pub layers: LayerMask,

    pub frustum: FrustumConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            resolution_x: 60,
            resolution_y: 40,
            max_range: None,
            layers: LayerMask::ALL,
            frustum: FrustumConfig::default(),
        }
    }
}

impl ScanConfig {
    /// The range actually used for ray casting and for normalizing dropout.
    pub fn effective_max_range(&self) -> f64 {
        self.max_range.unwrap_or(self.frustum.far)
    }

    /// Upper bound on the number of grid cells a single scan may sample.
    pub const MAX_CELLS: usize = 1 << 24;

    /// Number of cells in the sampling grid, and therefore the most points one scan can produce.
    /// Saturates for resolutions that `validate` would reject.
    pub fn cell_count(&self) -> usize {
        self.resolution_x.saturating_mul(self.resolution_y)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution_x == 0 || self.resolution_y == 0 {
            return Err(ScanError::config(format!(
                "grid resolution must be at least 1x1, got {}x{}",
                self.resolution_x, self.resolution_y
            )));
        }
        match self.resolution_x.checked_mul(self.resolution_y) {
            Some(n) if n <= Self::MAX_CELLS => {}
            _ => {
                return Err(ScanError::config(format!(
                    "grid resolution {}x{} exceeds the limit of {} cells",
                    self.resolution_x,
                    self.resolution_y,
                    Self::MAX_CELLS
                )));
            }
        }
        let range = self.effective_max_range();
        if !(range > 0.0 && range.is_finite()) {
            return Err(ScanError::config(format!(
                "max range must be positive and finite, got {}",
                range
            )));
        }
        self.frustum.validate()
    }
}

/// Parameters of the slowly wandering calibration offset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Largest drift step per second, reached at a body speed of 2 units/s and above.
    /// Default: 0.05
    pub max_drift_rate: f64,

    /// Below this body speed the scanner is considered stationary and drift relaxes toward zero.
    /// Default: 0.015
    pub stable_speed_threshold: f64,

    /// Fraction of the offset removed per second while stationary.
    /// Default: 0.5 (about two seconds to restabilize)
    pub relax_rate: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            max_drift_rate: 0.05,
            stable_speed_threshold: 0.015,
            relax_rate: 0.5,
        }
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_drift_rate", self.max_drift_rate),
            ("stable_speed_threshold", self.stable_speed_threshold),
            ("relax_rate", self.relax_rate),
        ];
        for (name, value) in fields {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ScanError::config(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Imperfections applied to each return. With `enabled` set to false the scanner produces ground
/// truth and drift is frozen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DegradationConfig {
    pub enabled: bool,

    /// Half-width of the uniform depth jitter along the ray.
    /// Default: 0.01
    pub noise: f64,

    /// Dropout probability at the maximum range. Scales linearly with distance.
    /// Default: 0.1
    pub dropout_chance: f64,

    /// Returns with an incidence angle above this are discarded, in degrees.
    /// Default: 75
    pub angle_tolerance_deg: f64,

    pub drift: DriftConfig,
}

impl Default for DegradationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            noise: 0.01,
            dropout_chance: 0.1,
            angle_tolerance_deg: 75.0,
            drift: DriftConfig::default(),
        }
    }
}

impl DegradationConfig {
    /// A configuration which turns every imperfection off.
    pub fn ideal() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.noise >= 0.0 && self.noise.is_finite()) {
            return Err(ScanError::config(format!(
                "noise must be non-negative, got {}",
                self.noise
            )));
        }
        if !(0.0..=1.0).contains(&self.dropout_chance) {
            return Err(ScanError::config(format!(
                "dropout chance must be in [0, 1], got {}",
                self.dropout_chance
            )));
        }
        if !(0.0..=180.0).contains(&self.angle_tolerance_deg) {
            return Err(ScanError::config(format!(
                "angle tolerance must be in [0, 180] degrees, got {}",
                self.angle_tolerance_deg
            )));
        }
        self.drift.validate()
    }
}

/// Everything needed to start a scan session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub scan: ScanConfig,
    pub degradation: DegradationConfig,

    /// Seed for the session's random stream. When absent the stream is seeded from the OS.
    pub seed: Option<u64>,

    /// Whether spawned markers start out visible.
    pub show_points: bool,

    /// Directory that relative export file names are resolved against.
    pub output_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            degradation: DegradationConfig::default(),
            seed: None,
            show_points: true,
            output_dir: PathBuf::from("."),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.scan.validate()?;
        self.degradation.validate()
    }
}
