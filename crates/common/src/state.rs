use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::PhysicalConstants;

/// Where the observer (the camera/player) is and how it moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverFrame {
    pub position: DVec3,
    pub velocity: DVec3,
}

impl Default for ObserverFrame {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
        }
    }
}

/// Shared world clock, observer frame and constants.
///
/// Created once at simulation start. The clock fields are private so that the
/// only writers are the clock driver ([`SpacetimeState::advance`]) and horizon
/// enforcement ([`SpacetimeState::freeze_at`]); geometries and objects read it
/// every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacetimeState {
    total_world_time: f64,
    delta_world_time: f64,
    fixed_delta_world_time: f64,
    is_movement_frozen: bool,
    pub constants: PhysicalConstants,
    pub observer: ObserverFrame,
    /// Uniform ambient acceleration field driving Rindler geometries.
    pub ambient_acceleration: DVec3,
}

impl Default for SpacetimeState {
    fn default() -> Self {
        Self::new(PhysicalConstants::default())
    }
}

impl SpacetimeState {
    /// A stopped clock at world time 0.
    pub fn new(constants: PhysicalConstants) -> Self {
        Self {
            total_world_time: 0.0,
            delta_world_time: 0.0,
            fixed_delta_world_time: 0.0,
            is_movement_frozen: false,
            constants,
            observer: ObserverFrame::default(),
            ambient_acceleration: DVec3::ZERO,
        }
    }

    pub fn total_world_time(&self) -> f64 {
        self.total_world_time
    }

    pub fn delta_world_time(&self) -> f64 {
        self.delta_world_time
    }

    pub fn fixed_delta_world_time(&self) -> f64 {
        self.fixed_delta_world_time
    }

    pub fn is_movement_frozen(&self) -> bool {
        self.is_movement_frozen
    }

    pub fn speed_of_light(&self) -> f64 {
        self.constants.speed_of_light
    }

    /// Advance the clock by one frame.
    ///
    /// While frozen, world time does not move and the frame delta reads zero.
    /// A non-finite `dt` (pause states) is recorded as-is so that evolution
    /// steps can skip the tick, but it never reaches `total_world_time`.
    pub fn advance(&mut self, dt: f64) {
        if self.is_movement_frozen {
            self.delta_world_time = 0.0;
            return;
        }
        self.delta_world_time = dt;
        if dt.is_finite() {
            self.total_world_time += dt;
        }
    }

    /// Set the fixed physics step used by per-physics-tick evolution laws.
    pub fn set_fixed_delta_world_time(&mut self, dt: f64) {
        self.fixed_delta_world_time = dt;
    }

    /// Clamp world time and stop all movement. Horizon enforcement is the only
    /// caller inside the core.
    pub fn freeze_at(&mut self, total_world_time: f64) {
        self.total_world_time = total_world_time;
        self.delta_world_time = 0.0;
        self.is_movement_frozen = true;
    }

    /// External reset (e.g. a time-reversal controller rewinding the world).
    pub fn reset_clock(&mut self, total_world_time: f64) {
        self.total_world_time = total_world_time;
        self.delta_world_time = 0.0;
        self.is_movement_frozen = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_world_time() {
        let mut s = SpacetimeState::default();
        s.advance(0.5);
        s.advance(0.25);
        assert_eq!(s.total_world_time(), 0.75);
        assert_eq!(s.delta_world_time(), 0.25);
    }

    #[test]
    fn non_finite_delta_is_not_accumulated() {
        let mut s = SpacetimeState::default();
        s.advance(1.0);
        s.advance(f64::NAN);
        assert_eq!(s.total_world_time(), 1.0);
        assert!(s.delta_world_time().is_nan());
        s.advance(f64::INFINITY);
        assert_eq!(s.total_world_time(), 1.0);
    }

    #[test]
    fn frozen_clock_does_not_advance() {
        let mut s = SpacetimeState::default();
        s.advance(2.0);
        s.freeze_at(1.5);
        assert!(s.is_movement_frozen());
        s.advance(1.0);
        assert_eq!(s.total_world_time(), 1.5);
        assert_eq!(s.delta_world_time(), 0.0);
    }

    #[test]
    fn reset_unfreezes() {
        let mut s = SpacetimeState::default();
        s.freeze_at(3.0);
        s.reset_clock(0.0);
        assert!(!s.is_movement_frozen());
        s.advance(1.0);
        assert_eq!(s.total_world_time(), 1.0);
    }
}
