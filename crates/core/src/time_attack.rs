//! Time Attack arithmetic
//!
//! Remaining time never goes below zero.

use crate::types::ScoringConfig;

/// Starting seconds for a board of `pair_count` pairs
pub fn initial_time_seconds(pair_count: usize, config: &ScoringConfig) -> i64 {
    config.initial_time_seconds(pair_count)
}

/// Seconds earned by a match; `combo` is the streak after the match
pub fn time_gain(combo: u32, config: &ScoringConfig) -> i64 {
    let extra_levels = i64::from(combo.saturating_sub(1));
    config
        .time_attack_base_gain
        .saturating_add(extra_levels.saturating_mul(config.time_attack_combo_bonus))
}

/// Remaining seconds after a mismatch
pub fn apply_mismatch_penalty(remaining: i64, config: &ScoringConfig) -> i64 {
    remaining
        .saturating_sub(config.time_attack_mismatch_penalty)
        .max(0)
}

/// Remaining seconds after adding (or removing) bonus time
pub fn add_bonus_time(remaining: i64, seconds: i64) -> i64 {
    remaining.saturating_add(seconds).max(0)
}
