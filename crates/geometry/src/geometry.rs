use glam::{DQuat, DVec3};

use lightcone_common::SpacetimeState;

use crate::{
    Comovement, ConformalMap, EvolutionReport, GeometryKind, Kerr, KerrNewman, Minkowski,
    MonopoleSchwarzschild, ReissnerNordstrom, Rindler, Schwarzschild, ShapeParams,
    StochasticSchwarzschild,
};

/// Closed set of spacetime models a scene can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Flat(Minkowski),
    Schwarzschild(Schwarzschild),
    Kerr(Kerr),
    KerrNewman(KerrNewman),
    ReissnerNordstrom(ReissnerNordstrom),
    Rindler(Rindler),
    Monopole(MonopoleSchwarzschild),
    Stochastic(StochasticSchwarzschild),
}

impl Geometry {
    pub fn as_map(&self) -> &dyn ConformalMap {
        match self {
            Self::Flat(g) => g,
            Self::Schwarzschild(g) => g,
            Self::Kerr(g) => g,
            Self::KerrNewman(g) => g,
            Self::ReissnerNordstrom(g) => g,
            Self::Rindler(g) => g,
            Self::Monopole(g) => g,
            Self::Stochastic(g) => g,
        }
    }

    pub fn as_map_mut(&mut self) -> &mut dyn ConformalMap {
        match self {
            Self::Flat(g) => g,
            Self::Schwarzschild(g) => g,
            Self::Kerr(g) => g,
            Self::KerrNewman(g) => g,
            Self::ReissnerNordstrom(g) => g,
            Self::Rindler(g) => g,
            Self::Monopole(g) => g,
            Self::Stochastic(g) => g,
        }
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Flat(_) => GeometryKind::Flat,
            Self::Schwarzschild(_) => GeometryKind::Schwarzschild,
            Self::Kerr(_) => GeometryKind::Kerr,
            Self::KerrNewman(_) => GeometryKind::KerrNewman,
            Self::ReissnerNordstrom(_) => GeometryKind::ReissnerNordstrom,
            Self::Rindler(_) => GeometryKind::Rindler,
            Self::Monopole(_) => GeometryKind::MonopoleSchwarzschild,
            Self::Stochastic(_) => GeometryKind::StochasticSchwarzschild,
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::Flat(Minkowski::new())
    }
}

impl ConformalMap for Geometry {
    fn comove(
        &self,
        proper_time_delta: f64,
        position: DVec3,
        orientation: DQuat,
        state: &SpacetimeState,
    ) -> Comovement {
        self.as_map()
            .comove(proper_time_delta, position, orientation, state)
    }

    fn local_acceleration(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        self.as_map().local_acceleration(position, state)
    }

    fn free_fall_velocity(&self, position: DVec3, state: &SpacetimeState) -> DVec3 {
        self.as_map().free_fall_velocity(position, state)
    }

    fn evolve(&mut self, state: &mut SpacetimeState) -> EvolutionReport {
        self.as_map_mut().evolve(state)
    }

    fn shape(&self, state: &SpacetimeState) -> ShapeParams {
        self.as_map().shape(state)
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(impl From<$ty> for Geometry {
            fn from(g: $ty) -> Self {
                Self::$variant(g)
            }
        })*
    };
}

impl_from!(
    Flat(Minkowski),
    Schwarzschild(Schwarzschild),
    Kerr(Kerr),
    KerrNewman(KerrNewman),
    ReissnerNordstrom(ReissnerNordstrom),
    Rindler(Rindler),
    Monopole(MonopoleSchwarzschild),
    Stochastic(StochasticSchwarzschild),
);
