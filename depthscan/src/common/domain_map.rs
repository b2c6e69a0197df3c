use serde::{Deserialize, Serialize};

/// A linear mapping between the unit domain [0, 1] and an outer domain. 0.0 maps to `x0` and 1.0
/// maps to `x0 + m`.
///
/// The scanner uses it to normalize hit distances against the sensor range and to place viewport
/// coordinates on the near plane.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct DomainMap {
    pub x0: f64,
    pub m: f64,
}

impl DomainMap {
    pub fn new(x0: f64, m: f64) -> Self {
        Self { x0, m }
    }

    /// Create a mapping where 0.0 maps to `start` and 1.0 maps to `end`.
    pub fn from_range(start: f64, end: f64) -> Self {
        Self::new(start, end - start)
    }

    /// Map a unit-domain value into the outer domain (a lerp).
    pub fn to(&self, f: f64) -> f64 {
        self.x0 + self.m * f
    }

    /// Map an outer-domain value back into the unit domain (an inverse lerp). Not clamped.
    pub fn from(&self, x: f64) -> f64 {
        (x - self.x0) / self.m
    }

    /// Like `from`, but clamped to [0, 1]. A mapping with zero width returns 0.0 instead of
    /// dividing by zero.
    pub fn fraction(&self, x: f64) -> f64 {
        if self.m == 0.0 {
            return 0.0;
        }
        self.from(x).clamp(0.0, 1.0)
    }
}
