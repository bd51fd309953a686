use crate::config::{Config, RenderParams};
use crate::seed::SeedSet;
use rand::Rng;

/// All simulation state carried from one tick to the next: the seed set
/// and the render parameters.
///
/// Owned by the tick-loop driver and passed by reference into each
/// pipeline phase; nothing else survives the presented-frame boundary.
#[derive(Debug)]
pub struct SimulationState {
    pub seeds: SeedSet,
    pub params: RenderParams,
}

impl SimulationState {
    /// Creates the startup state: `cfg.start_seeds` random seeds and
    /// default render parameters.
    pub fn new(cfg: &Config, rng: &mut impl Rng) -> Self {
        Self {
            seeds: SeedSet::with_start_count(cfg, rng),
            params: RenderParams::default(),
        }
    }
}
