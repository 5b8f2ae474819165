//! Shared collaborators handed to every engine call.

use crate::topology::Topology;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Board graph plus the source of randomness for dice, draws and steals.
#[derive(Debug, Clone)]
pub struct Context<R: Rng = StdRng> {
    pub topology: Arc<Topology>,
    pub rng: R,
}

impl Context<StdRng> {
    /// Standard topology with an entropy-seeded generator
    pub fn new() -> Self {
        Self::with_rng(Arc::new(Topology::standard()), StdRng::from_entropy())
    }

    /// Deterministic context for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(Arc::new(Topology::standard()), StdRng::seed_from_u64(seed))
    }
}

impl Default for Context<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Context<R> {
    pub fn with_rng(topology: Arc<Topology>, rng: R) -> Self {
        Self { topology, rng }
    }

    /// Roll two six-sided dice
    pub fn roll_dice(&mut self) -> (u8, u8) {
        roll_dice(&mut self.rng)
    }
}

/// Roll two six-sided dice
pub fn roll_dice<R: Rng>(rng: &mut R) -> (u8, u8) {
    (rng.gen_range(1..=6), rng.gen_range(1..=6))
}
