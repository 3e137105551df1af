//! Horizon evolution laws shared by every evaporating geometry.
//!
//! Radius shrinks by the semiclassical law while it exceeds the Planck length,
//! then by a linear law that reaches zero within one Planck time. Spin and
//! charge bleed off in lock-step with the radius.

use std::f64::consts::PI;

use lightcone_common::{DIV_BY_ZERO_CUTOFF, PhysicalConstants};

/// `k` in `dr/dt = -k·sqrt(ħ/G · c⁷) / r`.
pub const HAWKING_RATE_COEFFICIENT: f64 = 1.0 / (2560.0 * PI);

/// Rate of change of the horizon radius under the semiclassical law.
pub fn semiclassical_rate(radius: f64, constants: &PhysicalConstants) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    -HAWKING_RATE_COEFFICIENT * (constants.hbar_over_g * constants.speed_of_light.powi(7)).sqrt()
        / radius
}

/// Deterministic radius change over `dt`. Never takes the radius below zero.
pub fn evaporation_delta(radius: f64, dt: f64, constants: &PhysicalConstants) -> f64 {
    if radius <= 0.0 {
        return 0.0;
    }
    let delta = if radius > constants.planck_length {
        semiclassical_rate(radius, constants) * dt
    } else {
        -(constants.planck_length / constants.planck_time) * dt
    };
    delta.max(-radius)
}

/// Binary-log count of Planck-time "folds" elapsed over `dt` for a body of the
/// given radius, measured against its own size in Planck lengths.
pub fn fold_count(radius: f64, dt: f64, constants: &PhysicalConstants) -> f64 {
    let elapsed_planck_times = dt / constants.planck_time;
    let size_in_planck_lengths = radius / constants.planck_length;
    (1.0 + elapsed_planck_times / size_in_planck_lengths).log2()
}

/// Stochastic radius change: `draw` in `[0, 1)` picks a fraction of the
/// maximum fold step, and the deterministic law bounds the result.
pub fn stochastic_delta(radius: f64, dt: f64, constants: &PhysicalConstants, draw: f64) -> f64 {
    let deterministic = evaporation_delta(radius, dt, constants);
    if radius <= constants.planck_length {
        return deterministic;
    }
    let folds = draw.clamp(0.0, 1.0) * fold_count(radius, dt, constants);
    let stochastic = -radius * (1.0 - (-folds).exp2());
    deterministic.max(stochastic)
}

/// Shrink a spin or charge in step with a radius change.
///
/// `unit` converts radius into the extremal value of the quantity (e.g.
/// `L_p / l_p` for angular momentum), so `value / (radius·unit)` is the
/// fractional extremality, which stays constant under this update.
pub fn bleed_in_lockstep(value: f64, unit: f64, radius_before: f64, delta_radius: f64) -> f64 {
    if value <= 0.0 {
        return 0.0;
    }
    if radius_before + delta_radius <= 0.0 {
        return 0.0;
    }
    if radius_before < DIV_BY_ZERO_CUTOFF || delta_radius == 0.0 {
        return value;
    }
    let fraction = value / (radius_before * unit);
    (value + fraction * delta_radius * unit).max(0.0)
}

/// Whether an evolution step may run this tick.
pub(crate) fn can_evolve(do_evaporate: bool, frozen: bool, dt: f64) -> bool {
    do_evaporate && !frozen && dt.is_finite() && dt > 0.0
}
