//! Optics: what a finite-signal-speed observer actually sees.
//!
//! # Invariants
//! - The optical offset is never positive for sub-luminal objects.
//! - An object coincident with the observer has zero offset.
//! - Visibility and destruction are decided on optical time, never world time.

mod delay;
mod doppler;
mod visibility;

pub use delay::{OpticalDelaySolver, observer_alignment, optical_position};
pub use doppler::{doppler_factor, lorentz_factor, relative_velocity};
pub use visibility::VisibilityWindow;

pub fn crate_info() -> &'static str {
    "lightcone-optics v0.1.0"
}
