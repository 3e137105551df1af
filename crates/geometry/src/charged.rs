use glam::{DQuat, DVec3};

use lightcone_common::{DIV_BY_ZERO_CUTOFF, PhysicalConstants, SpacetimeState};

use crate::evaporation::bleed_in_lockstep;
use crate::{
    Comovement, ConformalMap, EvolutionReport, GeometryKind, Kerr, Schwarzschild, ShapeParams,
};

/// Radius seen by the uncharged parent geometry: `r − G Q² / (c² r)`, never
/// negative. Returns `radius` untouched when either input is degenerate.
pub fn effective_radius(radius: f64, charge: f64, constants: &PhysicalConstants) -> f64 {
    if radius < DIV_BY_ZERO_CUTOFF || charge < DIV_BY_ZERO_CUTOFF {
        return radius;
    }
    let c2 = constants.speed_of_light * constants.speed_of_light;
    (radius - constants.gravitational_constant * charge * charge / (c2 * radius)).max(0.0)
}

fn charge_unit(constants: &PhysicalConstants) -> f64 {
    constants.planck_charge / constants.planck_length
}

fn charge_fraction(charge: f64, radius: f64, constants: &PhysicalConstants) -> f64 {
    if radius < DIV_BY_ZERO_CUTOFF || charge < DIV_BY_ZERO_CUTOFF {
        return 0.0;
    }
    charge / (radius * charge_unit(constants))
}

/// Charged, non-rotating black hole.
#[derive(Debug, Clone, PartialEq)]
pub struct ReissnerNordstrom {
    base: Schwarzschild,
    electric_charge: f64,
}

impl ReissnerNordstrom {
    pub fn new(base: Schwarzschild, electric_charge: f64) -> Self {
        Self {
            base,
            electric_charge: electric_charge.max(0.0),
        }
    }

    pub fn base(&self) -> &Schwarzschild {
        &self.base
    }

    pub fn radius(&self) -> f64 {
        self.base.radius()
    }

    pub fn electric_charge(&self) -> f64 {
        self.electric_charge
    }

    fn effective(&self, state: &SpacetimeState) -> f64 {
        effective_radius(self.radius(), self.electric_charge, &state.constants)
    }
}

impl ConformalMap for ReissnerNordstrom {
    fn comove(
        &self,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement {
        self.base.comove_with_radius(
            self.effective(state),
            proper_time_delta,
            position,
            orientation,
            state,
        )
    }

    fn local_acceleration(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        self.base
            .local_acceleration_with_radius(self.effective(state), position, state)
    }

    fn free_fall_velocity(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        Schwarzschild::free_fall_velocity_with_radius(self.effective(state), position, state)
    }

    fn evolve(&mut self, state: &mut SpacetimeState) -> EvolutionReport {
        let report = self.base.evolve(state);
        self.electric_charge = bleed_in_lockstep(
            self.electric_charge,
            charge_unit(&state.constants),
            report.radius_before,
            report.delta_radius(),
        );
        report
    }

    fn shape(&self, state: &SpacetimeState) -> ShapeParams {
        ShapeParams {
            kind: GeometryKind::ReissnerNordstrom,
            charge: self.electric_charge,
            charge_fraction: charge_fraction(self.electric_charge, self.radius(), &state.constants),
            ..self.base.shape(state)
        }
    }
}

/// Charged, rotating black hole.
#[derive(Debug, Clone, PartialEq)]
pub struct KerrNewman {
    kerr: Kerr,
    electric_charge: f64,
}

impl KerrNewman {
    pub fn new(kerr: Kerr, electric_charge: f64) -> Self {
        Self {
            kerr,
            electric_charge: electric_charge.max(0.0),
        }
    }

    pub fn kerr(&self) -> &Kerr {
        &self.kerr
    }

    pub fn radius(&self) -> f64 {
        self.kerr.radius()
    }

    pub fn electric_charge(&self) -> f64 {
        self.electric_charge
    }

    fn effective(&self, state: &SpacetimeState) -> f64 {
        effective_radius(self.radius(), self.electric_charge, &state.constants)
    }
}

impl ConformalMap for KerrNewman {
    fn comove(
        &self,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement {
        self.kerr.comove_with_radius(
            self.effective(state),
            proper_time_delta,
            position,
            orientation,
            state,
        )
    }

    fn local_acceleration(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        self.kerr
            .local_acceleration_with_radius(self.effective(state), position, state)
    }

    fn free_fall_velocity(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        self.kerr
            .free_fall_velocity_with_radius(self.effective(state), position, state)
    }

    fn evolve(&mut self, state: &mut SpacetimeState) -> EvolutionReport {
        let report = self.kerr.evolve(state);
        self.electric_charge = bleed_in_lockstep(
            self.electric_charge,
            charge_unit(&state.constants),
            report.radius_before,
            report.delta_radius(),
        );
        report
    }

    fn shape(&self, state: &SpacetimeState) -> ShapeParams {
        ShapeParams {
            kind: GeometryKind::KerrNewman,
            charge: self.electric_charge,
            charge_fraction: charge_fraction(self.electric_charge, self.radius(), &state.constants),
            ..self.kerr.shape(state)
        }
    }
}
