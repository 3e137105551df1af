use glam::{DQuat, DVec3, DVec4};
use serde::{Deserialize, Serialize};

/// Result of advancing a point and orientation by a proper-time step.
///
/// `position.w` is the world-time offset consistent with the proper-time step
/// along the comoving worldline; `xyz` is the comoved spatial point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comovement {
    pub position: DVec4,
    pub orientation: DQuat,
}

impl Comovement {
    pub fn new(spatial: DVec3, time_offset: f64, orientation: DQuat) -> Self {
        Self {
            position: spatial.extend(time_offset),
            orientation,
        }
    }

    pub fn spatial(&self) -> DVec3 {
        self.position.truncate()
    }

    pub fn time_offset(&self) -> f64 {
        self.position.w
    }

    /// Approximate equality for tests and diagnostics.
    pub fn abs_diff_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.position.abs_diff_eq(other.position, tolerance)
            && (self.orientation.abs_diff_eq(other.orientation, tolerance)
                || self.orientation.abs_diff_eq(-other.orientation, tolerance))
    }
}
