//! Scene kernel: owns the clock, the gravitating bodies and the objects they
//! govern, and steps them in a fixed order every tick.
//!
//! # Invariants
//! - Every geometry finishes its per-tick evolution before any object comoves.
//! - Iteration order is deterministic (BTreeMap-backed).
//! - All mutations append to the scene event log.

pub mod config;
pub mod error;
pub mod scene;

pub use config::{ConstantsConfig, GeometryConfig, GeometrySpec, ObjectConfig, SceneConfig};
pub use error::SceneError;
pub use scene::{
    FrameOutput, GeometryEntry, GeometryShape, OpticalView, Scene, SceneEvent, WorldObject,
};
