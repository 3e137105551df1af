//! Conformal geometries: the family of interchangeable spacetime models that
//! comove points through curved (or flat) backgrounds and evolve their own
//! horizons each tick.
//!
//! # Invariants
//! - `comove(0, p, o)` returns `(p, o)` for every variant.
//! - Every curved variant degenerates to the next-simpler one as radius, spin
//!   or charge fall below [`DIV_BY_ZERO_CUTOFF`](lightcone_common::DIV_BY_ZERO_CUTOFF).
//! - Radius, spin and charge never go negative and, once zero, stay zero.
//! - Horizon enforcement is the only path that writes the shared clock.

mod charged;
mod comovement;
pub mod evaporation;
mod geometry;
mod kerr;
mod minkowski;
mod monopole;
mod rindler;
mod schwarzschild;
mod stochastic;

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use lightcone_common::{DIV_BY_ZERO_CUTOFF, SpacetimeState};

pub use charged::{KerrNewman, ReissnerNordstrom, effective_radius};
pub use comovement::Comovement;
pub use geometry::Geometry;
pub use kerr::Kerr;
pub use minkowski::Minkowski;
pub use monopole::MonopoleSchwarzschild;
pub use rindler::Rindler;
pub use schwarzschild::Schwarzschild;
pub use stochastic::StochasticSchwarzschild;

/// Capability set shared by every spacetime model.
pub trait ConformalMap {
    /// Advance a world-frame point and orientation by a proper-time step.
    fn comove(
        &self,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement;

    /// Advance a point by a world-time step instead of a proper-time step.
    ///
    /// A trial step of `world_time_delta` measures the local `dt/dτ`; the
    /// proper-time step is rescaled once so that the returned time component
    /// matches `world_time_delta` to second order. Returns the proper-time
    /// step taken with the comovement.
    fn comove_over_world_time(
        &self,
        world_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> (f64, Comovement) {
        let trial = self.comove(world_time_delta, position, orientation, state);
        let rate = trial.time_offset() / world_time_delta;
        if !rate.is_finite() || rate < DIV_BY_ZERO_CUTOFF {
            return (world_time_delta, trial);
        }
        let proper_time_delta = world_time_delta / rate;
        let comoved = self.comove(proper_time_delta, position, orientation, state);
        (proper_time_delta, comoved)
    }

    /// Proper acceleration that holds a body static at `position`.
    fn local_acceleration(&self, position: DVec3, state: &SpacetimeState) -> DVec3;

    /// Velocity of a freely falling body passing through `position`.
    fn free_fall_velocity(&self, _position: DVec3, _state: &SpacetimeState) -> DVec3 {
        DVec3::ZERO
    }

    /// Per-tick shape evolution: exterior/interior transition, horizon
    /// enforcement, then evaporation of radius, spin and charge.
    fn evolve(&mut self, state: &mut SpacetimeState) -> EvolutionReport;

    /// Current shape parameters for lensing and shading.
    fn shape(&self, state: &SpacetimeState) -> ShapeParams;
}

/// Which spacetime model a geometry implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Flat,
    Schwarzschild,
    Kerr,
    KerrNewman,
    ReissnerNordstrom,
    Rindler,
    MonopoleSchwarzschild,
    StochasticSchwarzschild,
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Flat => "flat",
            Self::Schwarzschild => "schwarzschild",
            Self::Kerr => "kerr",
            Self::KerrNewman => "kerr_newman",
            Self::ReissnerNordstrom => "reissner_nordstrom",
            Self::Rindler => "rindler",
            Self::MonopoleSchwarzschild => "monopole_schwarzschild",
            Self::StochasticSchwarzschild => "stochastic_schwarzschild",
        };
        f.write_str(name)
    }
}

/// Shape parameters handed to the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeParams {
    pub kind: GeometryKind,
    pub radius: f64,
    /// Spin as a fraction of the extremal value, in `[0, 1]`.
    pub spin_fraction: f64,
    pub charge: f64,
    pub charge_fraction: f64,
    /// Whether the observer is outside the horizon.
    pub is_exterior: bool,
}

impl ShapeParams {
    pub fn flat(kind: GeometryKind) -> Self {
        Self {
            kind,
            radius: 0.0,
            spin_fraction: 0.0,
            charge: 0.0,
            charge_fraction: 0.0,
            is_exterior: true,
        }
    }
}

/// What happened to a geometry during one `evolve` call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvolutionReport {
    pub radius_before: f64,
    pub radius_after: f64,
    /// The observer crossed inside the horizon this tick.
    pub became_interior: bool,
    /// Horizon enforcement froze the clock this tick.
    pub froze_clock: bool,
}

impl EvolutionReport {
    pub fn delta_radius(&self) -> f64 {
        self.radius_after - self.radius_before
    }

    /// The body reached zero radius during this tick.
    pub fn fully_evaporated(&self) -> bool {
        self.radius_before > 0.0 && self.radius_after <= 0.0
    }
}

pub fn crate_info() -> &'static str {
    "lightcone-geometry v0.1.0"
}
