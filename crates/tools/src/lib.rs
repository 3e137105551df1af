//! Developer tooling: read-only scene inspection.
//!
//! # Invariants
//! - Tools never mutate the scene they inspect.

pub mod inspector;

pub use inspector::{GeometryInfo, ObjectInfo, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "lightcone-tools v0.1.0"
}
