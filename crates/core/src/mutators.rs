//! Mutator engine - Daily Challenge board perturbations
//!
//! MIRAGE swaps two unmatched cards every [`MIRAGE_MOVE_INTERVAL`] moves.
//! BLACKOUT has no board effect; the runtime reads it to shorten the
//! mismatch reveal.

use rand::Rng;

use crate::board::{GameState, PAIR_SIZE};
use crate::types::{DailyChallengeMutator, MIRAGE_MOVE_INTERVAL};

/// Apply any mutator that is due at the current move count
pub fn apply_mutators<R: Rng + ?Sized>(state: GameState, rng: &mut R) -> GameState {
    let mirage_due = state.has_mutator(DailyChallengeMutator::Mirage)
        && state.moves > 0
        && state.moves % MIRAGE_MOVE_INTERVAL == 0;

    if mirage_due {
        mirage_swap(state, rng)
    } else {
        state
    }
}

fn mirage_swap<R: Rng + ?Sized>(mut state: GameState, rng: &mut R) -> GameState {
    let unmatched: Vec<usize> = state
        .cards
        .iter()
        .enumerate()
        .filter(|(_, card)| !card.is_matched)
        .map(|(i, _)| i)
        .collect();
    if unmatched.len() < PAIR_SIZE {
        return state;
    }

    let first = rng.random_range(0..unmatched.len());
    // Draw from one fewer slot and shift past the first pick
    let mut second = rng.random_range(0..unmatched.len() - 1);
    if second >= first {
        second += 1;
    }

    state.cards.swap(unmatched[first], unmatched[second]);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;
    use crate::types::{CardState, Rank, ScoringConfig, Suit};

    fn board_with_mirage(moves: u32) -> GameState {
        let cards = (0..8u32)
            .map(|i| CardState::new(i, Suit::ALL[(i % 4) as usize], Rank::ALL[(i / 2) as usize]))
            .collect();
        let mut state = GameState::new(cards, 4, ScoringConfig::default());
        state.active_mutators.insert(DailyChallengeMutator::Mirage);
        state.moves = moves;
        state
    }

    #[test]
    fn test_swaps_on_interval() {
        let state = board_with_mirage(5);
        let swapped = apply_mutators(state.clone(), &mut seeded_rng(7));
        let moved: Vec<usize> = (0..state.cards.len())
            .filter(|i| state.cards[*i] != swapped.cards[*i])
            .collect();
        assert_eq!(moved.len(), 2);
        assert_eq!(swapped.cards[moved[0]], state.cards[moved[1]]);
    }

    #[test]
    fn test_no_swap_off_interval() {
        for moves in [0, 1, 4, 6, 9] {
            let state = board_with_mirage(moves);
            assert_eq!(apply_mutators(state.clone(), &mut seeded_rng(7)), state);
        }
    }

    #[test]
    fn test_no_swap_without_mirage() {
        let mut state = board_with_mirage(10);
        state.active_mutators.clear();
        assert_eq!(apply_mutators(state.clone(), &mut seeded_rng(1)), state);
    }

    #[test]
    fn test_matched_cards_never_move() {
        let mut state = board_with_mirage(10);
        for card in state.cards.iter_mut().take(6) {
            card.is_matched = true;
        }
        for seed in 0..20 {
            let swapped = apply_mutators(state.clone(), &mut seeded_rng(seed));
            assert_eq!(&swapped.cards[..6], &state.cards[..6]);
            assert_eq!(swapped.cards[6], state.cards[7]);
            assert_eq!(swapped.cards[7], state.cards[6]);
        }
    }

    #[test]
    fn test_single_unmatched_card_is_noop() {
        let mut state = board_with_mirage(5);
        for card in state.cards.iter_mut().take(7) {
            card.is_matched = true;
        }
        assert_eq!(apply_mutators(state.clone(), &mut seeded_rng(3)), state);
    }
}
