use glam::{DQuat, DVec3};

use lightcone_common::{DIV_BY_ZERO_CUTOFF, PhysicalConstants, SpacetimeState};

use crate::evaporation::{can_evolve, evaporation_delta};
use crate::{Comovement, ConformalMap, EvolutionReport, GeometryKind, Minkowski, ShapeParams};

/// Closest approach to `x = 1` allowed in the horizon logarithm.
const HORIZON_CUTOFF: f64 = 1e-9;

/// Non-rotating, uncharged black hole centred on the world origin.
///
/// Radial motion uses Lemaître free-fall coordinates: the area radius obeys
/// `r^(3/2) = (3/2)(ρ − cτ)·sqrt(r_s)`, so a comoving point advances along a
/// cube-root curve as proper time passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Schwarzschild {
    radius: f64,
    is_exterior: bool,
    do_evaporate: bool,
    /// World time at which the observer's interior coordinate equals `radius`.
    interior_epoch: f64,
}

impl Schwarzschild {
    /// An evaporating body with the observer outside its horizon.
    pub fn new(radius: f64) -> Self {
        Self {
            radius: radius.max(0.0),
            is_exterior: true,
            do_evaporate: true,
            interior_epoch: 0.0,
        }
    }

    /// A body whose horizon already contains the observer at world time 0.
    pub fn interior(radius: f64) -> Self {
        Self {
            is_exterior: false,
            ..Self::new(radius)
        }
    }

    pub fn with_evaporation(mut self, do_evaporate: bool) -> Self {
        self.do_evaporate = do_evaporate;
        self
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn is_exterior(&self) -> bool {
        self.is_exterior
    }

    pub fn do_evaporate(&self) -> bool {
        self.do_evaporate
    }

    /// External reset of the radius (time-reversal controllers). Clamped at 0.
    pub fn reset_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
    }

    /// World time at which an interior observer reaches the singularity.
    pub fn horizon_time(&self, speed_of_light: f64) -> f64 {
        self.interior_epoch + self.radius / speed_of_light
    }

    pub(crate) fn comove_with_radius(
        &self,
        radius: f64,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement {
        let r = position.length();
        if radius < DIV_BY_ZERO_CUTOFF || proper_time_delta == 0.0 || r < DIV_BY_ZERO_CUTOFF {
            return Minkowski::identity(proper_time_delta, position, orientation);
        }
        let c = state.speed_of_light();
        let new_r = lemaitre_radius(radius, r, c * proper_time_delta);
        let spatial = position * (new_r / r);

        // Exterior: r is spacelike and world time follows from the Lemaître
        // time integral. Interior: r itself is the timelike coordinate.
        let time_offset = if self.is_exterior {
            proper_time_delta
                - (radius / c)
                    * (infall_time_term((new_r / radius).sqrt())
                        - infall_time_term((r / radius).sqrt()))
        } else {
            (r - new_r) / c
        };
        Comovement::new(spatial, time_offset, orientation)
    }

    pub(crate) fn local_acceleration_with_radius(
        &self,
        radius: f64,
        position: DVec3,
        state: &SpacetimeState,
    ) -> DVec3 {
        if radius < DIV_BY_ZERO_CUTOFF || !self.is_exterior {
            return DVec3::ZERO;
        }
        let r = position.length();
        if r <= radius {
            return DVec3::ZERO;
        }
        let c = state.speed_of_light();
        let magnitude = radius * c * c / (2.0 * r * r * (1.0 - radius / r).sqrt());
        position * (magnitude / r)
    }

    pub(crate) fn free_fall_velocity_with_radius(
        radius: f64,
        position: DVec3,
        state: &SpacetimeState,
    ) -> DVec3 {
        let r = position.length();
        if radius < DIV_BY_ZERO_CUTOFF || r < DIV_BY_ZERO_CUTOFF {
            return DVec3::ZERO;
        }
        let speed = state.speed_of_light() * (radius / r).sqrt().min(1.0);
        -position * (speed / r)
    }

    /// Flip to interior once the observer is inside the horizon. Never flips back.
    pub fn update_exterior(&mut self, state: &SpacetimeState) -> bool {
        if !self.is_exterior || self.radius < DIV_BY_ZERO_CUTOFF {
            return false;
        }
        let distance = state.observer.position.length();
        if distance >= self.radius {
            return false;
        }
        self.is_exterior = false;
        self.interior_epoch =
            state.total_world_time() - (self.radius - distance) / state.speed_of_light();
        tracing::debug!(
            radius = self.radius,
            epoch = self.interior_epoch,
            "observer crossed inside the horizon"
        );
        true
    }

    /// Clamp world time at the singularity and freeze movement.
    ///
    /// Idempotent: once applied, further calls leave the clock unchanged.
    /// Returns whether this call froze the clock.
    pub fn enforce_horizon(&self, state: &mut SpacetimeState) -> bool {
        if self.is_exterior {
            return false;
        }
        let limit = self.horizon_time(state.speed_of_light());
        if state.total_world_time() < limit {
            return false;
        }
        let newly_frozen = !state.is_movement_frozen();
        state.freeze_at(limit);
        if newly_frozen {
            tracing::info!(limit, "observer reached the singularity, world time frozen");
        }
        newly_frozen
    }

    /// Run the per-tick horizon update with the given radius law.
    ///
    /// `law(radius, dt, constants)` returns the radius change; it is clamped so
    /// the radius never grows and never drops below zero.
    pub fn evolve_with_law<F>(
        &mut self,
        state: &mut SpacetimeState,
        dt: f64,
        law: F,
    ) -> EvolutionReport
    where
        F: FnOnce(f64, f64, &PhysicalConstants) -> f64,
    {
        let radius_before = self.radius;
        let became_interior = self.update_exterior(state);
        let froze_clock = self.enforce_horizon(state);

        if self.radius > 0.0 && can_evolve(self.do_evaporate, state.is_movement_frozen(), dt) {
            let delta = law(self.radius, dt, &state.constants).clamp(-self.radius, 0.0);
            self.radius = (self.radius + delta).max(0.0);
            if self.radius == 0.0 {
                tracing::debug!(radius_before, "body fully evaporated");
            }
        }

        EvolutionReport {
            radius_before,
            radius_after: self.radius,
            became_interior,
            froze_clock,
        }
    }
}

impl ConformalMap for Schwarzschild {
    fn comove(
        &self,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement {
        self.comove_with_radius(self.radius, proper_time_delta, position, orientation, state)
    }

    fn local_acceleration(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        self.local_acceleration_with_radius(self.radius, position, state)
    }

    fn free_fall_velocity(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        Self::free_fall_velocity_with_radius(self.radius, position, state)
    }

    fn evolve(&mut self, state: &mut SpacetimeState) -> EvolutionReport {
        let dt = state.delta_world_time();
        self.evolve_with_law(state, dt, evaporation_delta)
    }

    fn shape(&self, _state: &SpacetimeState) -> ShapeParams {
        ShapeParams {
            radius: self.radius,
            is_exterior: self.is_exterior,
            ..ShapeParams::flat(GeometryKind::Schwarzschild)
        }
    }
}

/// Area radius after a free-fall proper-length step `c_tau` from radius `r`.
///
/// Negative steps recede along the same curve; the result never passes the
/// singularity.
pub(crate) fn lemaitre_radius(schwarzschild_radius: f64, r: f64, c_tau: f64) -> f64 {
    let rho_minus_tau = (2.0 / 3.0) * r.powf(1.5) / schwarzschild_radius.sqrt();
    let advanced = (rho_minus_tau - c_tau).max(0.0);
    (1.5 * advanced).powf(2.0 / 3.0) * schwarzschild_radius.cbrt()
}

/// `2x + ln|(x − 1)/(x + 1)|` with `x = sqrt(r / r_s)`; world time along a
/// free-fall worldline is `τ − (r_s / c)` times this term.
fn infall_time_term(x: f64) -> f64 {
    let gap = (x - 1.0).abs().max(HORIZON_CUTOFF);
    2.0 * x + (gap / (x + 1.0)).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaporation::HAWKING_RATE_COEFFICIENT;

    fn far_observer() -> SpacetimeState {
        let mut state = SpacetimeState::default();
        state.observer.position = DVec3::new(1.0e6, 0.0, 0.0);
        state
    }

    #[test]
    fn zero_step_is_identity() {
        let state = far_observer();
        let hole = Schwarzschild::new(1.0);
        let p = DVec3::new(3.0, 1.0, -2.0);
        let o = DQuat::from_rotation_y(0.7);
        let c = hole.comove(0.0, p, o, &state);
        assert_eq!(c.spatial(), p);
        assert_eq!(c.time_offset(), 0.0);
        assert_eq!(c.orientation, o);

        let inside = Schwarzschild::interior(1.0);
        let c = inside.comove(0.0, p, o, &state);
        assert_eq!(c.spatial(), p);
    }

    #[test]
    fn zero_radius_matches_flat() {
        let state = far_observer();
        let hole = Schwarzschild::new(0.0);
        let p = DVec3::new(2.0, 0.0, 0.0);
        let c = hole.comove(5.0, p, DQuat::IDENTITY, &state);
        assert_eq!(c.spatial(), p);
        assert_eq!(c.time_offset(), 5.0);
    }

    #[test]
    fn lemaitre_step_keeps_radius_at_zero_tau() {
        let r = lemaitre_radius(2.0, 7.5, 0.0);
        assert!((r - 7.5).abs() < 1e-12);
    }

    #[test]
    fn infall_speed_matches_free_fall() {
        let state = far_observer();
        let hole = Schwarzschild::new(1.0);
        let dtau = 1e-6;
        let c = hole.comove(dtau, DVec3::new(4.0, 0.0, 0.0), DQuat::IDENTITY, &state);
        let dr = c.spatial().x - 4.0;
        // dr/dτ = −c sqrt(r_s / r)
        assert!((dr / dtau + 0.5).abs() < 1e-4, "dr/dτ = {}", dr / dtau);
        // dt/dτ = 1 / (1 − r_s / r) for a body falling from rest at infinity
        assert!((c.time_offset() / dtau - 4.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn world_time_step_near_the_horizon_matches_the_clock() {
        let state = far_observer();
        let hole = Schwarzschild::new(1.0);
        let p = DVec3::new(1.5, 0.0, 0.0);
        // A proper-time step of 0.01 at r = 1.5 spans about three times as much world time.
        let raw = hole.comove(0.01, p, DQuat::IDENTITY, &state);
        assert!(raw.time_offset() > 0.03);

        let (dtau, c) = hole.comove_over_world_time(0.01, p, DQuat::IDENTITY, &state);
        assert!((c.time_offset() - 0.01).abs() < 1e-4, "dt = {}", c.time_offset());
        // dτ/dt = 1 − r_s / r
        assert!((dtau - 0.01 / 3.0).abs() < 1e-4);
        let dr = c.spatial().x - 1.5;
        assert!(dr < -0.002 && dr > -0.0035, "dr = {dr}");
    }

    #[test]
    fn comove_is_time_symmetric() {
        let state = far_observer();
        let hole = Schwarzschild::new(1.0);
        let p = DVec3::new(3.0, 4.0, 0.0);
        let forward = hole.comove(0.3, p, DQuat::IDENTITY, &state);
        let back = hole.comove(-0.3, forward.spatial(), DQuat::IDENTITY, &state);
        assert!(back.spatial().abs_diff_eq(p, 1e-9));
        assert!((forward.time_offset() + back.time_offset()).abs() < 1e-9);
    }

    #[test]
    fn interior_uses_radius_as_time() {
        let state = SpacetimeState::default();
        let hole = Schwarzschild::interior(2.0);
        let p = DVec3::new(1.0, 0.0, 0.0);
        let c = hole.comove(0.01, p, DQuat::IDENTITY, &state);
        assert!(c.spatial().x < 1.0);
        assert!((c.time_offset() - (1.0 - c.spatial().x)).abs() < 1e-15);
    }

    #[test]
    fn far_field_degenerates_to_flat() {
        let state = far_observer();
        let hole = Schwarzschild::new(1e-6);
        let p = DVec3::new(1.0e4, 0.0, 0.0);
        let c = hole.comove(1.0, p, DQuat::IDENTITY, &state);
        assert!(c.spatial().abs_diff_eq(p, 1e-4));
        assert!((c.time_offset() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn static_acceleration_outside_horizon() {
        let state = far_observer();
        let hole = Schwarzschild::new(1.0);
        let a = hole.local_acceleration(DVec3::new(4.0, 0.0, 0.0), &state);
        let expected = 1.0 / (2.0 * 16.0 * 0.75f64.sqrt());
        assert!((a.x - expected).abs() < 1e-12);
        assert_eq!(a.y, 0.0);
        assert_eq!(hole.local_acceleration(DVec3::new(0.5, 0.0, 0.0), &state), DVec3::ZERO);
        let inside = Schwarzschild::interior(1.0);
        assert_eq!(inside.local_acceleration(DVec3::new(4.0, 0.0, 0.0), &state), DVec3::ZERO);
    }

    #[test]
    fn free_fall_velocity_points_inward() {
        let state = far_observer();
        let hole = Schwarzschild::new(1.0);
        let v = hole.free_fall_velocity(DVec3::new(0.0, 4.0, 0.0), &state);
        assert!((v.y + 0.5).abs() < 1e-12);
        let v = hole.free_fall_velocity(DVec3::new(0.0, 0.25, 0.0), &state);
        assert!((v.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn enforce_horizon_is_idempotent() {
        let mut state = SpacetimeState::default();
        let hole = Schwarzschild::interior(2.0);
        state.advance(1.0);
        assert!(!hole.enforce_horizon(&mut state));
        state.advance(1.5);
        assert!(hole.enforce_horizon(&mut state));
        assert!(state.is_movement_frozen());
        assert_eq!(state.total_world_time(), 2.0);

        let snapshot = state.clone();
        assert!(!hole.enforce_horizon(&mut state));
        assert!(!hole.enforce_horizon(&mut state));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn exterior_never_freezes() {
        let mut state = far_observer();
        let hole = Schwarzschild::new(1.0);
        state.advance(100.0);
        assert!(!hole.enforce_horizon(&mut state));
        assert!(!state.is_movement_frozen());
    }

    #[test]
    fn observer_crossing_flips_to_interior_once() {
        let mut state = far_observer();
        let mut hole = Schwarzschild::new(2.0).with_evaporation(false);
        state.advance(1.0);
        assert!(!hole.evolve(&mut state).became_interior);
        assert!(hole.is_exterior());

        state.observer.position = DVec3::new(1.5, 0.0, 0.0);
        state.advance(1.0);
        let report = hole.evolve(&mut state);
        assert!(report.became_interior);
        assert!(!hole.is_exterior());
        // The remaining distance to the singularity is 1.5 light-seconds.
        assert!((hole.horizon_time(1.0) - 3.5).abs() < 1e-12);

        state.observer.position = DVec3::new(100.0, 0.0, 0.0);
        state.advance(1.0);
        assert!(!hole.evolve(&mut state).became_interior);
        assert!(!hole.is_exterior());

        state.advance(1.0);
        let report = hole.evolve(&mut state);
        assert!(report.froze_clock);
        assert_eq!(state.total_world_time(), 3.5);
    }

    #[test]
    fn evaporation_is_monotone_and_terminal() {
        let mut state = far_observer();
        let mut hole = Schwarzschild::new(3.0);
        let mut last = hole.radius();
        for _ in 0..200 {
            state.advance(5000.0);
            hole.evolve(&mut state);
            assert!(hole.radius() <= last);
            last = hole.radius();
        }
        assert!(hole.radius() < 3.0);

        let mut state = far_observer();
        let mut hole = Schwarzschild::new(0.5);
        state.advance(1.0);
        let report = hole.evolve(&mut state);
        assert!(report.fully_evaporated());
        assert_eq!(hole.radius(), 0.0);
        for _ in 0..5 {
            state.advance(1.0);
            hole.evolve(&mut state);
            assert_eq!(hole.radius(), 0.0);
        }
    }

    #[test]
    fn semiclassical_step_size() {
        let mut state = far_observer();
        let mut hole = Schwarzschild::new(10.0);
        state.advance(2.0);
        let report = hole.evolve(&mut state);
        let expected = -HAWKING_RATE_COEFFICIENT / 10.0 * 2.0;
        assert!((report.delta_radius() - expected).abs() < 1e-13);
    }

    #[test]
    fn evaporation_skips_bad_ticks() {
        let mut state = far_observer();
        let mut hole = Schwarzschild::new(10.0);
        state.advance(f64::NAN);
        hole.evolve(&mut state);
        assert_eq!(hole.radius(), 10.0);
        state.advance(f64::INFINITY);
        hole.evolve(&mut state);
        assert_eq!(hole.radius(), 10.0);

        let mut idle = Schwarzschild::new(10.0).with_evaporation(false);
        state.advance(1.0);
        idle.evolve(&mut state);
        assert_eq!(idle.radius(), 10.0);

        state.freeze_at(state.total_world_time());
        hole.evolve(&mut state);
        assert_eq!(hole.radius(), 10.0);
    }
}
