//! Scene files: constants, observer, bodies and objects in YAML or JSON.
//!
//! ```yaml
//! constants: natural
//! observer:
//!   position: [0.0, 0.0, 500.0]
//! geometries:
//!   - name: sgr
//!     kind: kerr
//!     radius: 2.0
//!     spin_momentum: 0.8
//! objects:
//!   - position: [0.0, 12.0, 0.0]
//!     geometry: sgr
//! ```

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use lightcone_common::{
    ConfigError, DIV_BY_ZERO_CUTOFF, ObserverFrame, PhysicalConstants, SpacetimeState,
};
use lightcone_geometry::{
    Geometry, Kerr, KerrNewman, Minkowski, MonopoleSchwarzschild, ReissnerNordstrom, Rindler,
    Schwarzschild, StochasticSchwarzschild,
};

use crate::{Scene, SceneError, WorldObject};

/// Default physics step for fixed-tick evolution laws.
const DEFAULT_FIXED_DELTA: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantsConfig {
    #[default]
    Natural,
    Si,
    Custom {
        speed_of_light: f64,
        gravitational_constant: f64,
        reduced_planck: f64,
    },
}

impl ConstantsConfig {
    pub fn build(&self) -> Result<PhysicalConstants, ConfigError> {
        match *self {
            Self::Natural => Ok(PhysicalConstants::natural()),
            Self::Si => Ok(PhysicalConstants::si()),
            Self::Custom {
                speed_of_light,
                gravitational_constant,
                reduced_planck,
            } => PhysicalConstants::from_units(speed_of_light, gravitational_constant, reduced_planck),
        }
    }
}

fn yes() -> bool {
    true
}

fn default_axis() -> DVec3 {
    DVec3::Y
}

fn default_orientation() -> DQuat {
    DQuat::IDENTITY
}

fn unit_orientation(orientation: DQuat) -> Result<DQuat, ConfigError> {
    if !orientation.is_finite() || orientation.length() < DIV_BY_ZERO_CUTOFF {
        return Err(ConfigError::NonFinite {
            name: "object.orientation",
        });
    }
    Ok(orientation.normalize())
}

fn default_fixed_delta() -> f64 {
    DEFAULT_FIXED_DELTA
}

/// One gravitating body, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometrySpec {
    Flat,
    Schwarzschild {
        radius: f64,
        #[serde(default)]
        interior: bool,
        #[serde(default = "yes")]
        evaporate: bool,
    },
    Kerr {
        radius: f64,
        spin_momentum: f64,
        #[serde(default = "default_axis")]
        spin_axis: DVec3,
        #[serde(default)]
        interior: bool,
        #[serde(default = "yes")]
        evaporate: bool,
    },
    KerrNewman {
        radius: f64,
        spin_momentum: f64,
        #[serde(default = "default_axis")]
        spin_axis: DVec3,
        electric_charge: f64,
        #[serde(default)]
        interior: bool,
        #[serde(default = "yes")]
        evaporate: bool,
    },
    ReissnerNordstrom {
        radius: f64,
        electric_charge: f64,
        #[serde(default)]
        interior: bool,
        #[serde(default = "yes")]
        evaporate: bool,
    },
    Rindler {
        #[serde(default)]
        horizon_up_offset: f64,
    },
    MonopoleSchwarzschild {
        radius: f64,
        #[serde(default = "yes")]
        evaporate: bool,
    },
    StochasticSchwarzschild {
        radius: f64,
        seed: u64,
        #[serde(default)]
        interior: bool,
        #[serde(default = "yes")]
        evaporate: bool,
    },
}

fn body(radius: f64, interior: bool, evaporate: bool) -> Result<Schwarzschild, ConfigError> {
    let radius = ConfigError::require_non_negative("radius", radius)?;
    let base = if interior {
        Schwarzschild::interior(radius)
    } else {
        Schwarzschild::new(radius)
    };
    Ok(base.with_evaporation(evaporate))
}

fn spinning(
    base: Schwarzschild,
    spin_momentum: f64,
    spin_axis: DVec3,
) -> Result<Kerr, ConfigError> {
    let spin = ConfigError::require_non_negative("spin_momentum", spin_momentum)?;
    let axis = ConfigError::require_finite("spin_axis", spin_axis)?;
    Ok(Kerr::new(base, spin, axis))
}

impl GeometrySpec {
    pub fn build(&self) -> Result<Geometry, ConfigError> {
        let geometry = match *self {
            Self::Flat => Minkowski::new().into(),
            Self::Schwarzschild {
                radius,
                interior,
                evaporate,
            } => body(radius, interior, evaporate)?.into(),
            Self::Kerr {
                radius,
                spin_momentum,
                spin_axis,
                interior,
                evaporate,
            } => spinning(body(radius, interior, evaporate)?, spin_momentum, spin_axis)?.into(),
            Self::KerrNewman {
                radius,
                spin_momentum,
                spin_axis,
                electric_charge,
                interior,
                evaporate,
            } => {
                let kerr = spinning(body(radius, interior, evaporate)?, spin_momentum, spin_axis)?;
                let charge = ConfigError::require_non_negative("electric_charge", electric_charge)?;
                KerrNewman::new(kerr, charge).into()
            }
            Self::ReissnerNordstrom {
                radius,
                electric_charge,
                interior,
                evaporate,
            } => {
                let charge = ConfigError::require_non_negative("electric_charge", electric_charge)?;
                ReissnerNordstrom::new(body(radius, interior, evaporate)?, charge).into()
            }
            Self::Rindler { horizon_up_offset } => {
                if !horizon_up_offset.is_finite() {
                    return Err(ConfigError::NonFinite {
                        name: "horizon_up_offset",
                    });
                }
                Rindler::new(horizon_up_offset).into()
            }
            Self::MonopoleSchwarzschild { radius, evaporate } => {
                let radius = ConfigError::require_non_negative("radius", radius)?;
                MonopoleSchwarzschild::new(radius)
                    .with_evaporation(evaporate)
                    .into()
            }
            Self::StochasticSchwarzschild {
                radius,
                seed,
                interior,
                evaporate,
            } => StochasticSchwarzschild::new(body(radius, interior, evaporate)?, seed).into(),
        };
        Ok(geometry)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub name: String,
    #[serde(flatten)]
    pub spec: GeometrySpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectConfig {
    pub position: DVec3,
    #[serde(default)]
    pub velocity: DVec3,
    #[serde(default = "default_orientation")]
    pub orientation: DQuat,
    #[serde(default)]
    pub birth_time: f64,
    #[serde(default)]
    pub death_time: f64,
    /// Name of the governing geometry; flat space when absent.
    #[serde(default)]
    pub geometry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    #[serde(default)]
    pub constants: ConstantsConfig,
    #[serde(default)]
    pub observer: ObserverFrame,
    #[serde(default)]
    pub ambient_acceleration: DVec3,
    #[serde(default = "default_fixed_delta")]
    pub fixed_delta_world_time: f64,
    #[serde(default)]
    pub geometries: Vec<GeometryConfig>,
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            constants: ConstantsConfig::default(),
            observer: ObserverFrame::default(),
            ambient_acceleration: DVec3::ZERO,
            fixed_delta_world_time: DEFAULT_FIXED_DELTA,
            geometries: Vec::new(),
            objects: Vec::new(),
        }
    }
}

impl SceneConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, SceneError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a scene file; `.json` is parsed as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Validate the configuration and produce a ready-to-step scene.
    pub fn build(&self) -> Result<Scene, SceneError> {
        let mut state = SpacetimeState::new(self.constants.build()?);
        state.observer = ObserverFrame {
            position: ConfigError::require_finite("observer.position", self.observer.position)?,
            velocity: ConfigError::require_finite("observer.velocity", self.observer.velocity)?,
        };
        state.ambient_acceleration =
            ConfigError::require_finite("ambient_acceleration", self.ambient_acceleration)?;
        state.set_fixed_delta_world_time(ConfigError::require_positive(
            "fixed_delta_world_time",
            self.fixed_delta_world_time,
        )?);

        let mut scene = Scene::new(state);
        let mut names = BTreeMap::new();
        for config in &self.geometries {
            if names.contains_key(&config.name) {
                return Err(ConfigError::DuplicateGeometry(config.name.clone()).into());
            }
            let id = scene.add_geometry(config.name.clone(), config.spec.build()?);
            names.insert(config.name.clone(), id);
        }

        for config in &self.objects {
            let geometry = match &config.geometry {
                Some(name) => Some(
                    *names
                        .get(name)
                        .ok_or_else(|| ConfigError::UnknownGeometry(name.clone()))?,
                ),
                None => None,
            };
            let object = WorldObject {
                position: ConfigError::require_finite("object.position", config.position)?,
                velocity: ConfigError::require_finite("object.velocity", config.velocity)?,
                orientation: unit_orientation(config.orientation)?,
                birth_time: config.birth_time,
                death_time: ConfigError::require_non_negative("death_time", config.death_time)?,
                geometry,
                proper_time: 0.0,
            };
            scene.spawn(object)?;
        }

        tracing::info!(
            geometries = scene.geometry_count(),
            objects = scene.object_count(),
            "scene built"
        );
        Ok(scene)
    }
}
