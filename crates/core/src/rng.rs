//! RNG module - seeded random sources
//!
//! Boards are shuffled with a [`StdRng`] seeded from a `u64`, so the same seed
//! always deals the same board. Daily Challenge seeds are the day number since
//! the Unix epoch.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Milliseconds in one calendar day
pub const MILLIS_PER_DAY: u64 = 86_400_000;

/// Deterministic RNG for the given seed
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Seed shared by every Daily Challenge played on the same UTC day
pub fn daily_seed(now_epoch_ms: u64) -> u64 {
    now_epoch_ms / MILLIS_PER_DAY
}

/// A fresh seed from the thread RNG
pub fn fresh_seed() -> u64 {
    rand::random()
}
