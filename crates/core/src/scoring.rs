//! Scoring module - match points, pot banking and end-of-game bonuses
//!
//! All intermediate sums are computed in `i64` and clamped into
//! `[0, i32::MAX]` before they are stored, so a score can never be observed
//! as negative or wrapped.

use crate::board::{GameState, ScoreBreakdown};
use crate::evaluator::GameDomainEvent;
use crate::types::{GameMode, ScoringConfig, CURRENCY_DIVISOR, DAILY_CHALLENGE_CURRENCY_BONUS};

/// Result of banking a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchScoreResult {
    pub final_score: i32,
    /// Points contributed by the Double Down multiplier
    pub dd_bonus: i32,
}

/// Points earned by a single match before any banking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchPoints {
    pub base: i32,
    pub combo_bonus: i32,
}

impl MatchPoints {
    pub fn total(&self) -> i64 {
        i64::from(self.base) + i64::from(self.combo_bonus)
    }
}

/// Clamp a wide intermediate into the valid score range
pub fn clamp_score(value: i64) -> i32 {
    value.clamp(0, i64::from(i32::MAX)) as i32
}

/// Points for a match made while `combo` matches were already chained
///
/// The combo bonus grows with the square of the streak.
pub fn match_points(combo: u32, config: &ScoringConfig) -> MatchPoints {
    let combo_factor = i64::from(combo) * i64::from(combo);
    let combo_bonus = combo_factor.saturating_mul(i64::from(config.combo_bonus_points));
    MatchPoints {
        base: config.base_match_points,
        combo_bonus: clamp_score(combo_bonus),
    }
}

/// Whether `matches_found` lands on a pot-banking milestone
pub fn is_milestone(matches_found: usize, config: &ScoringConfig) -> bool {
    let interval = config.match_milestone_interval as usize;
    matches_found > 0 && interval > 0 && matches_found % interval == 0
}

/// Bank match points into the score, applying Double Down
///
/// Winning with Double Down multiplies the whole banked total; otherwise only
/// the match's own points are multiplied.
pub fn calculate_match_score(
    current_score: i32,
    is_double_down_active: bool,
    match_base_points: i32,
    match_combo_bonus: i32,
    is_won: bool,
    config: &ScoringConfig,
) -> MatchScoreResult {
    let current = i64::from(current_score);
    let match_total = i64::from(match_base_points) + i64::from(match_combo_bonus);
    let multiplier = config.double_down_multiplier;

    let (final_score, dd_bonus) = if is_double_down_active && is_won {
        let total = current + match_total;
        let doubled = total.saturating_mul(multiplier);
        (doubled, doubled - total)
    } else if is_double_down_active {
        (current + match_total.saturating_mul(multiplier), match_total)
    } else {
        (current + match_total, 0)
    };

    MatchScoreResult {
        final_score: clamp_score(final_score),
        dd_bonus: clamp_score(dd_bonus),
    }
}

/// Event fired for a successful match
pub fn determine_success_event(is_won: bool, combo: u32, config: &ScoringConfig) -> GameDomainEvent {
    if is_won {
        GameDomainEvent::GameWon
    } else if combo > config.the_nuts_threshold {
        GameDomainEvent::TheNutsAchieved
    } else {
        GameDomainEvent::MatchSuccess
    }
}

/// Add time and move-efficiency bonuses to a won game
///
/// Returns the state untouched unless it is won.
///
/// # Panics
///
/// Panics if `elapsed_seconds` is negative.
pub fn apply_final_bonuses(state: GameState, elapsed_seconds: i64) -> GameState {
    assert!(
        elapsed_seconds >= 0,
        "elapsed seconds cannot be negative: {elapsed_seconds}"
    );
    if !state.is_game_won {
        return state;
    }

    let config = &state.config;
    let pair_count = state.pair_count as i64;

    let time_bonus = match state.mode {
        GameMode::TimeAttack => elapsed_seconds.saturating_mul(config.time_attack_bonus_multiplier),
        GameMode::Standard | GameMode::DailyChallenge => pair_count
            .saturating_mul(config.time_bonus_per_pair)
            .saturating_sub(elapsed_seconds.saturating_mul(config.time_penalty_per_second))
            .max(0),
    };

    let effective_moves = state.moves.max(1);
    let efficiency = state.pair_count as f64 / f64::from(effective_moves);
    let move_bonus = (efficiency * config.move_bonus_multiplier as f64) as i64;

    let total = clamp_score(
        i64::from(state.score)
            .saturating_add(time_bonus)
            .saturating_add(move_bonus),
    );

    let (earned_currency, daily_challenge_bonus) = match state.mode {
        GameMode::DailyChallenge => (
            (total / CURRENCY_DIVISOR).saturating_add(DAILY_CHALLENGE_CURRENCY_BONUS),
            DAILY_CHALLENGE_CURRENCY_BONUS,
        ),
        GameMode::Standard | GameMode::TimeAttack => {
            let units = f64::from(total / CURRENCY_DIVISOR);
            ((units * state.difficulty.payout_multiplier()) as i32, 0)
        }
    };

    let score_breakdown = ScoreBreakdown {
        base_points: state.total_base_points,
        combo_bonus: state.total_combo_bonus,
        double_down_bonus: state.total_double_down_bonus,
        time_bonus: clamp_score(time_bonus),
        move_bonus: clamp_score(move_bonus),
        daily_challenge_bonus,
        total_score: total,
        earned_currency,
    };

    GameState {
        score: total,
        score_breakdown,
        ..state
    }
}
