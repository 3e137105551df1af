use glam::{DQuat, DVec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use lightcone_common::SpacetimeState;

use crate::evaporation::stochastic_delta;
use crate::{Comovement, ConformalMap, EvolutionReport, GeometryKind, Schwarzschild, ShapeParams};

/// Schwarzschild black hole whose radius evaporates by a seeded random walk
/// over Planck-time folds, bounded by the deterministic semiclassical law.
#[derive(Debug, Clone)]
pub struct StochasticSchwarzschild {
    base: Schwarzschild,
    seed: u64,
    rng: ChaCha8Rng,
}

impl StochasticSchwarzschild {
    pub fn new(base: Schwarzschild, seed: u64) -> Self {
        Self {
            base,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn base(&self) -> &Schwarzschild {
        &self.base
    }

    pub fn radius(&self) -> f64 {
        self.base.radius()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the draw sequence from the original seed.
    pub fn reseed(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}

impl PartialEq for StochasticSchwarzschild {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.seed == other.seed && self.rng == other.rng
    }
}

impl ConformalMap for StochasticSchwarzschild {
    fn comove(
        &self,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement {
        self.base.comove(proper_time_delta, position, orientation, state)
    }

    fn local_acceleration(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        self.base.local_acceleration(position, state)
    }

    fn free_fall_velocity(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        self.base.free_fall_velocity(position, state)
    }

    fn evolve(&mut self, state: &mut SpacetimeState) -> EvolutionReport {
        let dt = state.delta_world_time();
        let rng = &mut self.rng;
        self.base.evolve_with_law(state, dt, |radius, dt, constants| {
            stochastic_delta(radius, dt, constants, rng.random::<f64>())
        })
    }

    fn shape(&self, state: &SpacetimeState) -> ShapeParams {
        ShapeParams {
            kind: GeometryKind::StochasticSchwarzschild,
            ..self.base.shape(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticking(dt: f64) -> SpacetimeState {
        let mut state = SpacetimeState::default();
        state.observer.position = DVec3::new(1e6, 0.0, 0.0);
        state.advance(dt);
        state
    }

    // Long ticks let the deterministic law swallow the whole radius, so the
    // random fold step is what binds.
    fn radii(seed: u64, ticks: usize) -> Vec<f64> {
        let mut state = ticking(1e9);
        let mut g = StochasticSchwarzschild::new(Schwarzschild::new(50.0), seed);
        (0..ticks)
            .map(|_| {
                g.evolve(&mut state);
                g.radius()
            })
            .collect()
    }

    #[test]
    fn same_seed_reproduces_sequence() {
        assert_eq!(radii(7, 5), radii(7, 5));
        assert_ne!(radii(7, 5), radii(8, 5));
    }

    #[test]
    fn reseed_restarts_draws() {
        let mut state = ticking(1e4);
        let mut g = StochasticSchwarzschild::new(Schwarzschild::new(50.0), 3);
        let first = g.evolve(&mut state).radius_after;
        g.base = Schwarzschild::new(50.0);
        g.reseed();
        assert_eq!(g.evolve(&mut state).radius_after, first);
    }

    #[test]
    fn never_outpaces_deterministic_law() {
        let mut state = ticking(1e4);
        let mut stochastic = StochasticSchwarzschild::new(Schwarzschild::new(50.0), 11);
        for _ in 0..50 {
            let r = stochastic.radius();
            let bound = crate::evaporation::evaporation_delta(r, 1e4, &state.constants);
            let report = stochastic.evolve(&mut state);
            assert!(report.delta_radius() <= 0.0);
            assert!(report.delta_radius() >= bound - 1e-12);
        }
    }

    #[test]
    fn frozen_clock_holds_radius() {
        let mut state = ticking(1.0);
        state.freeze_at(0.0);
        let mut g = StochasticSchwarzschild::new(Schwarzschild::new(5.0), 1);
        g.evolve(&mut state);
        assert_eq!(g.radius(), 5.0);
        assert_eq!(g.shape(&state).kind, GeometryKind::StochasticSchwarzschild);
    }
}
