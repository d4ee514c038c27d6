//! Traits describing the core's external collaborators.
//!
//! The terrain provider, random source, and animation sink are owned by the
//! surrounding game; the core reaches them only through these traits. The
//! [`BattleEnv`] aggregate bundles the read-only ones so signatures stay
//! short. Unlike optional oracles, a battle cannot exist without a map or
//! dice, so the references here are required rather than `Option`-wrapped.

mod feedback;
mod map;
mod rng;

pub use feedback::{FeedbackSink, NullFeedback};
pub use map::{GridMap, MapDimensions, MapOracle, StaticTile, VerticalFeature, WallBits};
pub use rng::{PcgRng, RngOracle, compute_seed};

/// Read-only collaborators required by the cost model, pathfinder, and
/// action states.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    map: &'a dyn MapOracle,
    rng: &'a dyn RngOracle,
}

impl<'a> BattleEnv<'a> {
    pub fn new(map: &'a dyn MapOracle, rng: &'a dyn RngOracle) -> Self {
        Self { map, rng }
    }

    pub fn map(&self) -> &'a dyn MapOracle {
        self.map
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }
}
