use glam::{DQuat, DVec3};

use lightcone_common::SpacetimeState;

use crate::{Comovement, ConformalMap, EvolutionReport, GeometryKind, ShapeParams};

/// Flat spacetime. Comovement is the identity on space, and world time equals
/// proper time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Minkowski;

impl Minkowski {
    pub fn new() -> Self {
        Self
    }

    /// The flat comovement, shared as the fallback of every curved variant.
    pub fn identity(proper_time_delta: f64, position: DVec3, orientation: DQuat) -> Comovement {
        Comovement::new(position, proper_time_delta, orientation)
    }
}

impl ConformalMap for Minkowski {
    fn comove(
        &self,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        _state: &SpacetimeState,
    ) -> Comovement {
        Self::identity(proper_time_delta, position, orientation)
    }

    fn local_acceleration(&self, _position: DVec3, _state: &SpacetimeState) -> DVec3 {
        DVec3::ZERO
    }

    fn evolve(&mut self, _state: &mut SpacetimeState) -> EvolutionReport {
        EvolutionReport::default()
    }

    fn shape(&self, _state: &SpacetimeState) -> ShapeParams {
        ShapeParams::flat(GeometryKind::Flat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comove_keeps_space_and_passes_proper_time() {
        let state = SpacetimeState::default();
        let p = DVec3::new(3.0, -4.0, 12.0);
        let o = DQuat::from_rotation_z(1.0);
        let c = Minkowski.comove(5.0, p, o, &state);
        assert_eq!(c.spatial(), p);
        assert_eq!(c.time_offset(), 5.0);
        assert_eq!(c.orientation, o);
    }

    #[test]
    fn no_acceleration_or_free_fall() {
        let state = SpacetimeState::default();
        let p = DVec3::new(1.0, 1.0, 1.0);
        assert_eq!(Minkowski.local_acceleration(p, &state), DVec3::ZERO);
        assert_eq!(Minkowski.free_fall_velocity(p, &state), DVec3::ZERO);
    }

    #[test]
    fn world_time_step_is_the_proper_time_step() {
        let state = SpacetimeState::default();
        let p = DVec3::new(1.0, 2.0, 3.0);
        let (dtau, c) = Minkowski.comove_over_world_time(0.5, p, DQuat::IDENTITY, &state);
        assert_eq!(dtau, 0.5);
        assert_eq!(c, Minkowski.comove(0.5, p, DQuat::IDENTITY, &state));
        let (_, still) = Minkowski.comove_over_world_time(0.0, p, DQuat::IDENTITY, &state);
        assert_eq!(still.spatial(), p);
    }
}
