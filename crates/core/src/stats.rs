//! Per-board-size statistics
//!
//! A best time of zero means no time has been recorded yet.

use serde::{Deserialize, Serialize};

use crate::factory::GameError;
use crate::types::MAX_PAIR_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub pair_count: usize,
    pub best_score: i32,
    pub best_time_seconds: i64,
    pub games_played: u32,
}

impl GameStats {
    /// Fold one finished game into the stats for its board size
    ///
    /// Negative scores or times are clamped to zero.
    pub fn record(
        previous: Option<&GameStats>,
        pair_count: usize,
        score: i32,
        time_seconds: i64,
    ) -> Result<GameStats, GameError> {
        if pair_count == 0 || pair_count > MAX_PAIR_COUNT {
            return Err(GameError::InvalidPairCount {
                got: pair_count,
                max: MAX_PAIR_COUNT,
            });
        }
        let score = score.max(0);
        let time_seconds = time_seconds.max(0);

        let stats = match previous {
            None => GameStats {
                pair_count,
                best_score: score,
                best_time_seconds: time_seconds,
                games_played: 1,
            },
            Some(prev) => GameStats {
                pair_count,
                best_score: prev.best_score.max(score),
                best_time_seconds: if prev.best_time_seconds == 0
                    || time_seconds < prev.best_time_seconds
                {
                    time_seconds
                } else {
                    prev.best_time_seconds
                },
                games_played: prev.games_played.saturating_add(1),
            },
        };
        Ok(stats)
    }
}
