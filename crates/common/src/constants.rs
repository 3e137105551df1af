use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::ConfigError;

/// Magnitude below which radius, spin, charge, acceleration and velocity
/// differences are treated as zero. Operations fall back to the next-simpler
/// geometry instead of dividing by these values.
pub const DIV_BY_ZERO_CUTOFF: f64 = 1e-12;

/// SI reference values.
const SI_SPEED_OF_LIGHT: f64 = 299_792_458.0;
const SI_GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;
const SI_REDUCED_PLANCK: f64 = 1.054_571_817e-34;
const SI_VACUUM_PERMITTIVITY: f64 = 8.854_187_812_8e-12;

/// Fundamental constants of the simulation's unit system, with every Planck
/// quantity derived from `(c, G, ħ)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    pub speed_of_light: f64,
    pub gravitational_constant: f64,
    pub reduced_planck: f64,
    pub planck_length: f64,
    pub planck_time: f64,
    pub planck_mass: f64,
    pub planck_charge: f64,
    pub planck_angular_momentum: f64,
    pub planck_momentum: f64,
    pub hbar_over_g: f64,
}

impl PhysicalConstants {
    /// Derive all Planck quantities from the speed of light, the gravitational
    /// constant and the reduced Planck constant. Charge uses Gaussian-style
    /// units (`4π ε₀ = 1`), so `q_p = sqrt(ħ c)`.
    pub fn from_units(
        speed_of_light: f64,
        gravitational_constant: f64,
        reduced_planck: f64,
    ) -> Result<Self, ConfigError> {
        let c = ConfigError::require_positive("speed_of_light", speed_of_light)?;
        let g = ConfigError::require_positive("gravitational_constant", gravitational_constant)?;
        let hbar = ConfigError::require_positive("reduced_planck", reduced_planck)?;
        Ok(Self::derive(c, g, hbar, (hbar * c).sqrt()))
    }

    /// Natural Planck units: `c = G = ħ = 1`, every Planck quantity is 1.
    pub fn natural() -> Self {
        Self::derive(1.0, 1.0, 1.0, 1.0)
    }

    /// SI units, with the SI Planck charge `sqrt(4π ε₀ ħ c)`.
    pub fn si() -> Self {
        let planck_charge =
            (4.0 * PI * SI_VACUUM_PERMITTIVITY * SI_REDUCED_PLANCK * SI_SPEED_OF_LIGHT).sqrt();
        Self::derive(
            SI_SPEED_OF_LIGHT,
            SI_GRAVITATIONAL_CONSTANT,
            SI_REDUCED_PLANCK,
            planck_charge,
        )
    }

    fn derive(c: f64, g: f64, hbar: f64, planck_charge: f64) -> Self {
        let planck_length = (hbar * g / c.powi(3)).sqrt();
        let planck_mass = (hbar * c / g).sqrt();
        Self {
            speed_of_light: c,
            gravitational_constant: g,
            reduced_planck: hbar,
            planck_length,
            planck_time: planck_length / c,
            planck_mass,
            planck_charge,
            planck_angular_momentum: hbar,
            planck_momentum: planck_mass * c,
            hbar_over_g: hbar / g,
        }
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::natural()
    }
}
