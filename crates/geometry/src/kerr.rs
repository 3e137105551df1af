use glam::{DQuat, DVec3};

use lightcone_common::{DIV_BY_ZERO_CUTOFF, PhysicalConstants, SpacetimeState};

use crate::evaporation::bleed_in_lockstep;
use crate::{Comovement, ConformalMap, EvolutionReport, GeometryKind, Schwarzschild, ShapeParams};

/// Rotating black hole. Radial motion is delegated to [`Schwarzschild`];
/// frame dragging is applied as two half-step rotations about the spin axis,
/// one before and one after the radial step, which keeps the composite
/// second-order accurate and time-symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct Kerr {
    base: Schwarzschild,
    spin_momentum: f64,
    spin_axis: DVec3,
}

impl Kerr {
    pub fn new(base: Schwarzschild, spin_momentum: f64, spin_axis: DVec3) -> Self {
        Self {
            base,
            spin_momentum: spin_momentum.max(0.0),
            spin_axis: spin_axis.try_normalize().unwrap_or(DVec3::Y),
        }
    }

    pub fn base(&self) -> &Schwarzschild {
        &self.base
    }

    pub fn radius(&self) -> f64 {
        self.base.radius()
    }

    pub fn spin_momentum(&self) -> f64 {
        self.spin_momentum
    }

    pub fn spin_axis(&self) -> DVec3 {
        self.spin_axis
    }

    /// External reset of the spin (time-reversal controllers). Clamped at 0.
    pub fn reset_spin(&mut self, spin_momentum: f64) {
        self.spin_momentum = spin_momentum.max(0.0);
    }

    /// `spin / (radius · L_p / l_p)`, capped at extremal.
    pub fn spin_fraction(&self, radius: f64, constants: &PhysicalConstants) -> f64 {
        if radius < DIV_BY_ZERO_CUTOFF || self.spin_momentum < DIV_BY_ZERO_CUTOFF {
            return 0.0;
        }
        (self.spin_momentum / (radius * spin_unit(constants))).min(1.0)
    }

    /// Kerr parameter `a` in length units; extremal spin gives `a = r_s / 2`.
    fn spin_length(&self, radius: f64, constants: &PhysicalConstants) -> f64 {
        0.5 * radius * self.spin_fraction(radius, constants)
    }

    /// Rotation taking the spin axis onto +Y.
    fn alignment(&self) -> DQuat {
        DQuat::from_rotation_arc(self.spin_axis, DVec3::Y)
    }

    pub(crate) fn comove_with_radius(
        &self,
        radius: f64,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement {
        let a = self.spin_length(radius, &state.constants);
        if a < DIV_BY_ZERO_CUTOFF {
            return self
                .base
                .comove_with_radius(radius, proper_time_delta, position, orientation, state);
        }
        let c = state.speed_of_light();
        let half_step = 0.5 * proper_time_delta;
        let align = self.alignment();

        let mut p = align * position;
        let mut o = align * orientation;

        let drag = DQuat::from_rotation_y(frame_drag_rate(radius, a, p, c) * half_step);
        p = drag * p;
        o = drag * o;

        let radial = self
            .base
            .comove_with_radius(radius, proper_time_delta, p, o, state);
        p = radial.spatial();
        o = radial.orientation;

        let drag = DQuat::from_rotation_y(frame_drag_rate(radius, a, p, c) * half_step);
        p = drag * p;
        o = drag * o;

        let unalign = align.inverse();
        Comovement::new(unalign * p, radial.time_offset(), (unalign * o).normalize())
    }

    pub(crate) fn local_acceleration_with_radius(
        &self,
        radius: f64,
        position: DVec3,
        state: &SpacetimeState,
    ) -> DVec3 {
        let base = self
            .base
            .local_acceleration_with_radius(radius, position, state);
        let a = self.spin_length(radius, &state.constants);
        if a < DIV_BY_ZERO_CUTOFF {
            return base;
        }
        let omega = frame_drag_rate(radius, a, self.alignment() * position, state.speed_of_light());
        let off_axis = position - self.spin_axis * position.dot(self.spin_axis);
        base + off_axis * (omega * omega)
    }

    pub(crate) fn free_fall_velocity_with_radius(
        &self,
        radius: f64,
        position: DVec3,
        state: &SpacetimeState,
    ) -> DVec3 {
        let base = Schwarzschild::free_fall_velocity_with_radius(radius, position, state);
        let a = self.spin_length(radius, &state.constants);
        if a < DIV_BY_ZERO_CUTOFF {
            return base;
        }
        let omega = frame_drag_rate(radius, a, self.alignment() * position, state.speed_of_light());
        base + self.spin_axis.cross(position) * omega
    }

    /// Bleed spin in step with the radius change reported by the base update.
    pub(crate) fn bleed_spin(&mut self, report: &EvolutionReport, constants: &PhysicalConstants) {
        self.spin_momentum = bleed_in_lockstep(
            self.spin_momentum,
            spin_unit(constants),
            report.radius_before,
            report.delta_radius(),
        );
    }
}

impl ConformalMap for Kerr {
    fn comove(
        &self,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement {
        self.comove_with_radius(self.radius(), proper_time_delta, position, orientation, state)
    }

    fn local_acceleration(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        self.local_acceleration_with_radius(self.radius(), position, state)
    }

    fn free_fall_velocity(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        self.free_fall_velocity_with_radius(self.radius(), position, state)
    }

    fn evolve(&mut self, state: &mut SpacetimeState) -> EvolutionReport {
        let report = self.base.evolve(state);
        self.bleed_spin(&report, &state.constants);
        report
    }

    fn shape(&self, state: &SpacetimeState) -> ShapeParams {
        ShapeParams {
            kind: GeometryKind::Kerr,
            spin_fraction: self.spin_fraction(self.radius(), &state.constants),
            ..self.base.shape(state)
        }
    }
}

fn spin_unit(constants: &PhysicalConstants) -> f64 {
    constants.planck_angular_momentum / constants.planck_length
}

/// Frame-dragging angular velocity `ω = r_s r a c / ((r² + a²)² − a² Δ sin²θ)`
/// at a point expressed in the spin-aligned frame (spin axis = +Y).
fn frame_drag_rate(radius: f64, a: f64, aligned: DVec3, c: f64) -> f64 {
    let r2 = aligned.length_squared();
    if r2 < DIV_BY_ZERO_CUTOFF * DIV_BY_ZERO_CUTOFF {
        return 0.0;
    }
    let r = r2.sqrt();
    let sin2_theta = (aligned.x * aligned.x + aligned.z * aligned.z) / r2;
    let a2 = a * a;
    let delta = r2 - radius * r + a2;
    let sigma = (r2 + a2) * (r2 + a2) - a2 * delta * sin2_theta;
    radius * r * a * c / sigma
}

#[cfg(test)]
mod tests {
    use super::*;

    fn far_observer() -> SpacetimeState {
        let mut state = SpacetimeState::default();
        state.observer.position = DVec3::new(1.0e6, 0.0, 0.0);
        state
    }

    fn spinning(radius: f64, spin: f64) -> Kerr {
        Kerr::new(Schwarzschild::new(radius), spin, DVec3::Y)
    }

    #[test]
    fn zero_step_is_identity() {
        let state = far_observer();
        let hole = Kerr::new(Schwarzschild::new(1.0), 0.4, DVec3::new(1.0, 1.0, 0.0));
        let p = DVec3::new(3.0, -1.0, 2.0);
        let o = DQuat::from_rotation_x(0.4);
        let c = hole.comove(0.0, p, o, &state);
        assert!(c.spatial().abs_diff_eq(p, 1e-12));
        assert_eq!(c.time_offset(), 0.0);
        assert!(c.orientation.abs_diff_eq(o, 1e-12));
    }

    #[test]
    fn zero_spin_matches_schwarzschild() {
        let state = far_observer();
        let base = Schwarzschild::new(1.0);
        let hole = Kerr::new(base.clone(), 0.0, DVec3::X);
        let p = DVec3::new(3.0, 2.0, -1.0);
        let o = DQuat::from_rotation_z(0.2);
        assert_eq!(hole.comove(0.25, p, o, &state), base.comove(0.25, p, o, &state));
        assert_eq!(
            hole.local_acceleration(p, &state),
            base.local_acceleration(p, &state)
        );
        assert_eq!(
            hole.free_fall_velocity(p, &state),
            base.free_fall_velocity(p, &state)
        );
    }

    #[test]
    fn frame_dragging_rotates_about_spin_axis() {
        let state = far_observer();
        let hole = spinning(1.0, 0.5);
        let base = Schwarzschild::new(1.0);
        let p = DVec3::new(3.0, 0.0, 0.0);
        let kerr = hole.comove(0.1, p, DQuat::IDENTITY, &state);
        let schw = base.comove(0.1, p, DQuat::IDENTITY, &state);
        assert!((kerr.spatial().length() - schw.spatial().length()).abs() < 1e-12);
        assert!(kerr.spatial().y.abs() < 1e-12);
        assert!(kerr.spatial().z.abs() > 1e-6);
        assert!((kerr.time_offset() - schw.time_offset()).abs() < 1e-12);
        assert!(!kerr.orientation.abs_diff_eq(DQuat::IDENTITY, 1e-9));
    }

    #[test]
    fn points_on_the_axis_do_not_drift() {
        let state = far_observer();
        let hole = spinning(1.0, 0.5);
        let base = Schwarzschild::new(1.0);
        let p = DVec3::new(0.0, 4.0, 0.0);
        let kerr = hole.comove(0.1, p, DQuat::IDENTITY, &state);
        let schw = base.comove(0.1, p, DQuat::IDENTITY, &state);
        assert!(kerr.spatial().abs_diff_eq(schw.spatial(), 1e-12));
    }

    #[test]
    fn comove_is_time_symmetric() {
        let state = far_observer();
        let hole = Kerr::new(Schwarzschild::new(1.0), 0.8, DVec3::new(0.0, 1.0, 1.0));
        let p = DVec3::new(3.0, 1.0, 2.0);
        let o = DQuat::from_rotation_y(0.3);
        let forward = hole.comove(0.2, p, o, &state);
        let back = hole.comove(-0.2, forward.spatial(), forward.orientation, &state);
        assert!(back.spatial().abs_diff_eq(p, 1e-9));
        assert!((forward.time_offset() + back.time_offset()).abs() < 1e-9);
        assert!(back.orientation.abs_diff_eq(o, 1e-9) || back.orientation.abs_diff_eq(-o, 1e-9));
    }

    #[test]
    fn spin_fraction_is_capped() {
        let k = PhysicalConstants::natural();
        assert_eq!(spinning(2.0, 1.0).spin_fraction(2.0, &k), 0.5);
        assert_eq!(spinning(2.0, 10.0).spin_fraction(2.0, &k), 1.0);
        assert_eq!(spinning(0.0, 10.0).spin_fraction(0.0, &k), 0.0);
    }

    #[test]
    fn centrifugal_term_adds_off_axis() {
        let state = far_observer();
        let hole = spinning(1.0, 0.9);
        let base = Schwarzschild::new(1.0);
        let p = DVec3::new(4.0, 0.0, 0.0);
        let a = hole.local_acceleration(p, &state);
        let b = base.local_acceleration(p, &state);
        assert!(a.x > b.x);
        let on_axis = DVec3::new(0.0, 4.0, 0.0);
        assert!(
            hole.local_acceleration(on_axis, &state)
                .abs_diff_eq(base.local_acceleration(on_axis, &state), 1e-15)
        );
    }

    #[test]
    fn spin_bleeds_with_mass() {
        let mut state = far_observer();
        let mut hole = spinning(10.0, 5.0);
        let k = state.constants;
        let mut last = hole.spin_momentum();
        for _ in 0..10 {
            state.advance(1000.0);
            hole.evolve(&mut state);
            assert!(hole.spin_momentum() <= last);
            last = hole.spin_momentum();
            assert!((hole.spin_fraction(hole.radius(), &k) - 0.5).abs() < 1e-12);
        }
        assert!(hole.spin_momentum() < 5.0);

        let mut tiny = spinning(0.5, 0.2);
        state.advance(1.0);
        tiny.evolve(&mut state);
        assert_eq!(tiny.radius(), 0.0);
        assert_eq!(tiny.spin_momentum(), 0.0);
    }

    #[test]
    fn shape_reports_spin_fraction() {
        let state = far_observer();
        let shape = spinning(2.0, 1.0).shape(&state);
        assert_eq!(shape.kind, GeometryKind::Kerr);
        assert_eq!(shape.radius, 2.0);
        assert_eq!(shape.spin_fraction, 0.5);
        assert!(shape.is_exterior);
    }
}
