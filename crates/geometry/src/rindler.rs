use glam::{DQuat, DVec3};

use lightcone_common::{DIV_BY_ZERO_CUTOFF, SpacetimeState};

use crate::{Comovement, ConformalMap, EvolutionReport, GeometryKind, Minkowski, ShapeParams};

/// Uniformly accelerated frame driven by the ambient acceleration field.
///
/// Positions are read as Rindler coordinates. The distance `X` to the Rindler
/// horizon is `c² / a` on a reference plane lifted `horizon_up_offset` against
/// the field and shrinks along the field. World time is the clock of a static
/// observer on that plane.
///
/// Free bodies are released from rest at world time 0. The body found at `X`
/// at world time `η` has its apex at `X₀ = X cosh(aη/c)` and follows
/// `X(s) = sqrt(X₀² − c²s²)` in its own proper time `s`: rising against the
/// field for `s < 0`, falling along it for `s > 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rindler {
    horizon_up_offset: f64,
}

struct Field {
    magnitude: f64,
    direction: DVec3,
}

/// Free-fall worldline through one event.
#[derive(Debug, Clone, Copy)]
struct Worldline {
    /// Distance to the horizon at the apex.
    apex: f64,
    /// Proper time since the apex.
    proper_time: f64,
}

impl Worldline {
    fn through(to_horizon: f64, world_time: f64, a: f64, c: f64) -> Self {
        let phase = a * world_time / c;
        Self {
            apex: to_horizon * phase.cosh(),
            proper_time: to_horizon * phase.sinh() / c,
        }
    }

    /// Distance to the horizon at proper time `s`; `None` once the horizon is crossed.
    fn to_horizon_at(&self, s: f64, c: f64) -> Option<f64> {
        let cs = c * s;
        (cs.abs() < self.apex).then(|| (self.apex * self.apex - cs * cs).sqrt())
    }

    fn world_time_at(&self, s: f64, a: f64, c: f64) -> f64 {
        (c / a) * (c * s / self.apex).atanh()
    }
}

impl Rindler {
    pub fn new(horizon_up_offset: f64) -> Self {
        Self { horizon_up_offset }
    }

    pub fn horizon_up_offset(&self) -> f64 {
        self.horizon_up_offset
    }

    fn field(state: &SpacetimeState) -> Option<Field> {
        let g = state.ambient_acceleration;
        let magnitude = g.length();
        (magnitude >= DIV_BY_ZERO_CUTOFF).then(|| Field {
            magnitude,
            direction: g / magnitude,
        })
    }

    /// Distance from `position` to the horizon, measured against the field.
    fn to_horizon(&self, position: DVec3, field: &Field, c: f64) -> f64 {
        let fallen = position.dot(field.direction) + self.horizon_up_offset;
        c * c / field.magnitude - fallen
    }
}

impl ConformalMap for Rindler {
    /// Moves along the free-fall worldline through `position` at the current
    /// world time. A body that reaches the horizon within the step stops on it
    /// with an infinite world-time offset; bodies at or past it stay put.
    fn comove(
        &self,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement {
        let Some(field) = Self::field(state) else {
            return Minkowski::identity(proper_time_delta, position, orientation);
        };
        let (a, c) = (field.magnitude, state.speed_of_light());
        let to_horizon = self.to_horizon(position, &field, c);
        if proper_time_delta == 0.0 || to_horizon < DIV_BY_ZERO_CUTOFF {
            return Minkowski::identity(proper_time_delta, position, orientation);
        }

        let world_time = state.total_world_time();
        let line = Worldline::through(to_horizon, world_time, a, c);
        let next_s = line.proper_time + proper_time_delta;
        match line.to_horizon_at(next_s, c) {
            Some(next) => Comovement::new(
                position + field.direction * (to_horizon - next),
                line.world_time_at(next_s, a, c) - world_time,
                orientation,
            ),
            None => Comovement::new(
                position + field.direction * to_horizon,
                f64::INFINITY.copysign(proper_time_delta),
                orientation,
            ),
        }
    }

    /// `c² / X` against the field, zero at or past the horizon.
    fn local_acceleration(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        let Some(field) = Self::field(state) else {
            return DVec3::ZERO;
        };
        let c = state.speed_of_light();
        let to_horizon = self.to_horizon(position, &field, c);
        if to_horizon < DIV_BY_ZERO_CUTOFF {
            return DVec3::ZERO;
        }
        -field.direction * (c * c / to_horizon)
    }

    /// Coordinate velocity per unit world time, `(a X / c) tanh(aη / c)` along
    /// the field: zero at release, upward before it.
    fn free_fall_velocity(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        let Some(field) = Self::field(state) else {
            return DVec3::ZERO;
        };
        let (a, c) = (field.magnitude, state.speed_of_light());
        let to_horizon = self.to_horizon(position, &field, c);
        if to_horizon < DIV_BY_ZERO_CUTOFF {
            return DVec3::ZERO;
        }
        let phase = a * state.total_world_time() / c;
        field.direction * (a * to_horizon / c * phase.tanh())
    }

    fn evolve(&mut self, _state: &mut SpacetimeState) -> EvolutionReport {
        EvolutionReport::default()
    }

    fn shape(&self, _state: &SpacetimeState) -> ShapeParams {
        ShapeParams::flat(GeometryKind::Rindler)
    }
}
