use glam::{DQuat, DVec3};

use lightcone_common::{DIV_BY_ZERO_CUTOFF, SpacetimeState};

use crate::evaporation::{can_evolve, evaporation_delta};
use crate::schwarzschild::lemaitre_radius;
use crate::{
    Comovement, ConformalMap, EvolutionReport, GeometryKind, Minkowski, Schwarzschild,
    ShapeParams,
};

/// Simplified black hole with no horizon bookkeeping.
///
/// Comovement uses the same cube-root radial relation as [`Schwarzschild`]
/// but keeps only the power-law part of the time integral, and the observer
/// is always treated as exterior. The radius evaporates once per fixed
/// physics tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MonopoleSchwarzschild {
    radius: f64,
    do_evaporate: bool,
}

impl MonopoleSchwarzschild {
    pub fn new(radius: f64) -> Self {
        Self {
            radius: radius.max(0.0),
            do_evaporate: true,
        }
    }

    pub fn with_evaporation(mut self, do_evaporate: bool) -> Self {
        self.do_evaporate = do_evaporate;
        self
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn reset_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
    }
}

impl ConformalMap for MonopoleSchwarzschild {
    fn comove(
        &self,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement {
        let r = position.length();
        if self.radius < DIV_BY_ZERO_CUTOFF || proper_time_delta == 0.0 || r < DIV_BY_ZERO_CUTOFF
        {
            return Minkowski::identity(proper_time_delta, position, orientation);
        }
        let c = state.speed_of_light();
        let new_r = lemaitre_radius(self.radius, r, c * proper_time_delta);
        let x = (r / self.radius).sqrt();
        let new_x = (new_r / self.radius).sqrt();
        let time_offset = proper_time_delta - (2.0 * self.radius / c) * (new_x - x);
        Comovement::new(position * (new_r / r), time_offset, orientation)
    }

    /// Newtonian pull `r_s c² / 2r²`, held off outward.
    fn local_acceleration(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        let r = position.length();
        if self.radius < DIV_BY_ZERO_CUTOFF || r < DIV_BY_ZERO_CUTOFF {
            return DVec3::ZERO;
        }
        let c = state.speed_of_light();
        position * (self.radius * c * c / (2.0 * r * r * r))
    }

    fn free_fall_velocity(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        Schwarzschild::free_fall_velocity_with_radius(self.radius, position, state)
    }

    fn evolve(&mut self, state: &mut SpacetimeState) -> EvolutionReport {
        let radius_before = self.radius;
        let dt = state.fixed_delta_world_time();
        if self.radius > 0.0 && can_evolve(self.do_evaporate, state.is_movement_frozen(), dt) {
            let delta = evaporation_delta(self.radius, dt, &state.constants);
            self.radius = (self.radius + delta).max(0.0);
        }
        EvolutionReport {
            radius_before,
            radius_after: self.radius,
            ..EvolutionReport::default()
        }
    }

    fn shape(&self, _state: &SpacetimeState) -> ShapeParams {
        ShapeParams {
            radius: self.radius,
            ..ShapeParams::flat(GeometryKind::MonopoleSchwarzschild)
        }
    }
}
