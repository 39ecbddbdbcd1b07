//! Board module - the complete state of one game
//!
//! [`GameState`] is an immutable-by-convention value: transition functions take
//! it by value and hand back the next board. Card order is stable for the life
//! of a game (only MIRAGE swaps positions).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::comment::CommentKey;
use crate::types::{CardState, DailyChallengeMutator, DifficultyType, GameMode, ScoringConfig};

/// Cards per pair
pub const PAIR_SIZE: usize = 2;

/// Final score split, filled in when a game is won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_points: i32,
    pub combo_bonus: i32,
    pub double_down_bonus: i32,
    pub time_bonus: i32,
    pub move_bonus: i32,
    pub daily_challenge_bonus: i32,
    pub total_score: i32,
    pub earned_currency: i32,
}

/// Full board state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub cards: Vec<CardState>,
    pub pair_count: usize,
    pub moves: u32,
    /// Banked score, never negative
    pub score: i32,
    pub combo_multiplier: u32,
    /// Match points not yet banked into `score`
    pub current_pot: i32,
    pub total_base_points: i32,
    pub total_combo_bonus: i32,
    pub total_double_down_bonus: i32,
    pub is_double_down_active: bool,
    pub is_heat_shield_available: bool,
    pub is_game_over: bool,
    pub is_game_won: bool,
    pub is_busted: bool,
    pub mode: GameMode,
    pub difficulty: DifficultyType,
    pub active_mutators: BTreeSet<DailyChallengeMutator>,
    /// Ids of the most recently matched pair, for highlighting
    pub last_matched_ids: Vec<u32>,
    pub match_comment: Option<CommentKey>,
    pub score_breakdown: ScoreBreakdown,
    pub config: ScoringConfig,
    /// Seed the deck was shuffled with
    pub seed: u64,
}

impl GameState {
    /// Build a fresh board around an already shuffled card list
    pub fn new(cards: Vec<CardState>, pair_count: usize, config: ScoringConfig) -> Self {
        Self {
            cards,
            pair_count,
            moves: 0,
            score: 0,
            combo_multiplier: 0,
            current_pot: 0,
            total_base_points: 0,
            total_combo_bonus: 0,
            total_double_down_bonus: 0,
            is_double_down_active: false,
            is_heat_shield_available: false,
            is_game_over: false,
            is_game_won: false,
            is_busted: false,
            mode: GameMode::default(),
            difficulty: DifficultyType::default(),
            active_mutators: BTreeSet::new(),
            last_matched_ids: Vec::new(),
            match_comment: None,
            score_breakdown: ScoreBreakdown::default(),
            config,
            seed: 0,
        }
    }

    pub fn card(&self, id: u32) -> Option<&CardState> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn card_index(&self, id: u32) -> Option<usize> {
        self.cards.iter().position(|card| card.id == id)
    }

    /// Cards that are face-up but not yet matched
    pub fn face_up_unmatched_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_active()).count()
    }

    pub fn matches_found(&self) -> usize {
        self.cards.iter().filter(|card| card.is_matched).count() / PAIR_SIZE
    }

    pub fn unmatched_pairs(&self) -> usize {
        self.cards.iter().filter(|card| !card.is_matched).count() / PAIR_SIZE
    }

    pub fn has_error_cards(&self) -> bool {
        self.cards.iter().any(|card| card.is_error)
    }

    /// Two unmatched cards are showing and waiting to be resolved
    pub fn is_evaluation_pending(&self) -> bool {
        self.face_up_unmatched_count() >= PAIR_SIZE
    }

    pub fn has_mutator(&self, mutator: DailyChallengeMutator) -> bool {
        self.active_mutators.contains(&mutator)
    }

    /// Copy of this board with every unmatched card turned face-up
    ///
    /// Used for the Double Down scan overlay; the result is only ever shown,
    /// never stored back.
    pub fn revealed(&self) -> GameState {
        let mut view = self.clone();
        for card in view.cards.iter_mut().filter(|card| !card.is_matched) {
            card.is_face_up = true;
        }
        view
    }
}
