//! Match evaluator - pure flip/match/mismatch transitions
//!
//! Every function here takes the board by value and returns the next board.
//! Invalid input (unknown id, card already showing, game over) is never an
//! error: the board comes back unchanged and no event fires.
//!
//! Mismatch handling checks, in order:
//!
//! 1. **Heat shield**: available and a combo is running, the shield absorbs
//!    the miss and the combo survives
//! 2. **Double Down**: the wager is lost and the game busts
//! 3. **Standard**: part of the pot is forfeited and the combo resets

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::board::{GameState, PAIR_SIZE};
use crate::comment::generate_match_comment;
use crate::scoring::{
    calculate_match_score, clamp_score, determine_success_event, is_milestone, match_points,
};
use crate::types::MIN_PAIRS_FOR_DOUBLE_DOWN;

/// Outcome of a flip, consumed by the state machine to pick effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameDomainEvent {
    CardFlipped,
    MatchSuccess,
    /// Match made with a combo above the jackpot threshold
    TheNutsAchieved,
    MatchFailure,
    HeatShieldUsed,
    GameWon,
    /// Busted on a Double Down mismatch
    GameOver,
}

/// Flip the card with `card_id`
///
/// # Examples
///
/// ```
/// use memory_match_core::{flip, GameDomainEvent, GameState};
/// use memory_match_core::types::{CardState, Rank, ScoringConfig, Suit};
///
/// let cards = vec![
///     CardState::new(0, Suit::Clubs, Rank::King),
///     CardState::new(1, Suit::Clubs, Rank::King),
/// ];
/// let state = GameState::new(cards, 1, ScoringConfig::default());
///
/// let (state, event) = flip(state, 0);
/// assert_eq!(event, Some(GameDomainEvent::CardFlipped));
///
/// let (state, event) = flip(state, 1);
/// assert_eq!(event, Some(GameDomainEvent::GameWon));
/// assert!(state.is_game_won);
/// ```
pub fn flip(mut state: GameState, card_id: u32) -> (GameState, Option<GameDomainEvent>) {
    if state.is_game_over {
        trace!(card_id, "flip ignored: game over");
        return (state, None);
    }
    let Some(index) = state.card_index(card_id) else {
        trace!(card_id, "flip ignored: unknown card");
        return (state, None);
    };
    let card = state.cards[index];
    if card.is_face_up || card.is_matched {
        return (state, None);
    }

    let face_up_before = state.face_up_unmatched_count();
    if face_up_before >= PAIR_SIZE {
        trace!(card_id, "flip ignored: evaluation pending");
        return (state, None);
    }

    state.cards[index].is_face_up = true;
    if face_up_before == 0 {
        state.last_matched_ids.clear();
    }

    let active: Vec<usize> = state
        .cards
        .iter()
        .enumerate()
        .filter(|(_, card)| card.is_active())
        .map(|(i, _)| i)
        .collect();

    match active.as_slice() {
        [_] => (state, Some(GameDomainEvent::CardFlipped)),
        [first, second] => {
            let (first, second) = (*first, *second);
            if state.cards[first].pairs_with(&state.cards[second]) {
                handle_match(state, first, second)
            } else {
                handle_mismatch(state, first, second)
            }
        }
        _ => (state, None),
    }
}

fn handle_match(
    mut state: GameState,
    first: usize,
    second: usize,
) -> (GameState, Option<GameDomainEvent>) {
    for index in [first, second] {
        let card = &mut state.cards[index];
        card.is_matched = true;
        card.is_face_up = true;
    }
    let ids = vec![state.cards[first].id, state.cards[second].id];

    let matches_found = state.matches_found();
    let is_won = matches_found == state.pair_count;
    let moves = state.moves.saturating_add(1);
    let combo = state.combo_multiplier;

    let points = match_points(combo, &state.config);
    let potential_pot = i64::from(state.current_pot) + points.total();
    let banks_pot = is_milestone(matches_found, &state.config) || is_won;

    let banked = if banks_pot {
        clamp_score(i64::from(state.score) + potential_pot)
    } else {
        state.score
    };
    let result = calculate_match_score(
        banked,
        state.is_double_down_active,
        0,
        0,
        is_won,
        &state.config,
    );

    state.match_comment = Some(generate_match_comment(
        moves,
        matches_found,
        state.pair_count,
        combo,
        &state.config,
        state.is_double_down_active,
    ));

    let event = determine_success_event(is_won, combo, &state.config);

    state.moves = moves;
    state.score = result.final_score;
    state.current_pot = if banks_pot { 0 } else { clamp_score(potential_pot) };
    state.total_base_points = state.total_base_points.saturating_add(points.base);
    state.total_combo_bonus = state.total_combo_bonus.saturating_add(points.combo_bonus);
    state.total_double_down_bonus = state.total_double_down_bonus.saturating_add(result.dd_bonus);
    state.combo_multiplier = combo.saturating_add(1);
    state.is_double_down_active = state.is_double_down_active && !is_won;
    state.is_game_won = is_won;
    state.is_game_over = is_won;
    state.last_matched_ids = ids;

    (state, Some(event))
}

fn handle_mismatch(
    mut state: GameState,
    first: usize,
    second: usize,
) -> (GameState, Option<GameDomainEvent>) {
    state.cards[first].is_error = true;
    state.cards[second].is_error = true;

    if state.is_heat_shield_available && state.combo_multiplier > 0 {
        state.is_heat_shield_available = false;
        state.moves = state.moves.saturating_add(1);
        state.last_matched_ids.clear();
        return (state, Some(GameDomainEvent::HeatShieldUsed));
    }

    if state.is_double_down_active {
        let ids = vec![state.cards[first].id, state.cards[second].id];
        state.score = 0;
        state.is_game_over = true;
        state.is_game_won = false;
        state.is_double_down_active = false;
        state.is_busted = true;
        state.last_matched_ids = ids;
        return (state, Some(GameDomainEvent::GameOver));
    }

    let pot = i64::from(state.current_pot);
    let penalty = (pot as f64 * state.config.pot_mismatch_penalty) as i64;
    state.current_pot = clamp_score(pot - penalty);
    state.moves = state.moves.saturating_add(1);
    state.combo_multiplier = 0;
    state.is_double_down_active = false;
    state.last_matched_ids.clear();

    (state, Some(GameDomainEvent::MatchFailure))
}

/// Turn error cards back face-down
///
/// Returns the board untouched when no card carries the error flag, so
/// applying it twice is the same as applying it once.
pub fn reset_error_cards(mut state: GameState) -> GameState {
    for card in state.cards.iter_mut().filter(|card| card.is_error) {
        card.is_face_up = false;
        card.is_error = false;
        card.was_seen = true;
    }
    state
}

/// Turn every face-up unmatched card back face-down
pub fn reset_unmatched_cards(mut state: GameState) -> GameState {
    for card in state.cards.iter_mut().filter(|card| card.is_active()) {
        card.is_face_up = false;
        card.is_error = false;
        card.was_seen = true;
    }
    state
}

/// Whether Double Down may be activated on this board
pub fn can_double_down(state: &GameState) -> bool {
    state.combo_multiplier >= state.config.heat_mode_threshold
        && !state.is_double_down_active
        && state.unmatched_pairs() >= MIN_PAIRS_FOR_DOUBLE_DOWN
}

/// Activate Double Down; no-op when ineligible
pub fn activate_double_down(mut state: GameState) -> GameState {
    if can_double_down(&state) {
        state.is_double_down_active = true;
    }
    state
}
