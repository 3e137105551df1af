use serde::{Deserialize, Serialize};

/// Lifetime of an object on the observer's optical clock.
///
/// `death_time == 0` means the object lives indefinitely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityWindow {
    pub birth_time: f64,
    pub death_time: f64,
}

impl VisibilityWindow {
    pub fn new(birth_time: f64, death_time: f64) -> Self {
        Self {
            birth_time,
            death_time,
        }
    }

    pub fn is_immortal(&self) -> bool {
        self.death_time == 0.0
    }

    /// First light from the object's birth has reached the observer, and the
    /// light from its death has not.
    pub fn is_visible(&self, optical_time: f64) -> bool {
        optical_time >= self.birth_time && (self.is_immortal() || optical_time <= self.death_time)
    }

    pub fn should_destroy(&self, optical_time: f64) -> bool {
        !self.is_immortal() && optical_time > self.death_time
    }
}
