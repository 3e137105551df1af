//! Shared state for the lightcone workspace: the world clock and observer frame,
//! physical constants, identifiers, and configuration errors.
//!
//! # Invariants
//! - `SpacetimeState` has exactly two writers: the clock driver (`advance`) and
//!   horizon enforcement (`freeze_at`). Everything else reads it.
//! - Planck quantities are always derived from `(c, G, ħ)`, never set piecemeal.

pub mod constants;
pub mod error;
pub mod state;
pub mod types;

pub use constants::{DIV_BY_ZERO_CUTOFF, PhysicalConstants};
pub use error::ConfigError;
pub use state::{ObserverFrame, SpacetimeState};
pub use types::{GeometryId, ObjectId};

pub fn crate_info() -> &'static str {
    "lightcone-common v0.1.0"
}
