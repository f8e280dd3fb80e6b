use serde::{Deserialize, Serialize};

use crate::error::{CurveError, Result};

/// Maximum distance a flattened chord may stray from the curve it replaces.
///
/// Owned by the output buffer rather than the curve: how flat is flat enough
/// depends on the consumer (usually inversely proportional to display scale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Flatness(f64);

impl Flatness {
    pub const DEFAULT: f64 = 1.0;

    /// Create a flatness value. It must be finite and strictly positive.
    pub fn new(value: f64) -> Result<Self> {
        if !(value > 0.0) || !value.is_finite() {
            return Err(CurveError::invalid_argument(format!(
                "flatness > 0 required, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn coarse() -> Self {
        Self(4.0)
    }

    pub fn fine() -> Self {
        Self(0.05)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// The squared tolerance compared against squared point-to-chord distances.
    pub fn squared(self) -> f64 {
        self.0 * self.0
    }

    /// Check if a squared distance is within this tolerance.
    pub fn accepts_sq(self, dist_sq: f64) -> bool {
        dist_sq < self.squared()
    }
}

impl Default for Flatness {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for Flatness {
    type Error = CurveError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Flatness> for f64 {
    fn from(f: Flatness) -> f64 {
        f.0
    }
}
