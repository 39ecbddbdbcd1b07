//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the game rules and board transitions.
//! It has **no dependencies** on timers, persistence, or I/O, making it:
//!
//! - **Deterministic**: Same seed deals the same board (Daily Challenges, replays)
//! - **Testable**: Every rule is a plain function from board to board
//! - **Portable**: Runs inside the async runtime, a benchmark, or a headless bot
//!
//! # Module Structure
//!
//! - [`board`]: `GameState` and the final `ScoreBreakdown`
//! - [`evaluator`]: flip, match, mismatch, heat shield and Double Down rules
//! - [`scoring`]: pot banking, Double Down multiplier and end-of-game bonuses
//! - [`mutators`]: Daily Challenge MIRAGE swaps
//! - [`factory`]: dealing new boards from a seed
//! - [`rng`]: seeded random sources
//! - [`comment`]: table-talk comment selection
//! - [`time_attack`]: countdown gain/penalty arithmetic
//! - [`stats`]: best score and time per board size
//!
//! # Game Rules
//!
//! - **Pairs**: every (suit, rank) on the board appears exactly twice
//! - **Combo**: each consecutive match raises the streak; the combo bonus grows with its square
//! - **Pot**: match points accumulate in a pot that is banked every few matches and on the win
//! - **Heat mode**: a long enough streak unlocks Double Down
//! - **Double Down**: doubles the final bank on a win, busts the game on a miss
//! - **Heat shield**: absorbs one miss without breaking the streak
//!
//! # Example
//!
//! ```
//! use memory_match_core::{create_initial_state, flip, GameDomainEvent};
//! use memory_match_core::rng::seeded_rng;
//! use memory_match_core::types::{DifficultyType, GameMode, ScoringConfig};
//!
//! let state = create_initial_state(
//!     4,
//!     ScoringConfig::default(),
//!     GameMode::Standard,
//!     DifficultyType::Casual,
//!     false,
//!     &mut seeded_rng(12345),
//! )
//! .unwrap();
//!
//! let (state, event) = flip(state, 0);
//! assert_eq!(event, Some(GameDomainEvent::CardFlipped));
//! assert_eq!(state.face_up_unmatched_count(), 1);
//! ```

pub mod board;
pub mod comment;
pub mod evaluator;
pub mod factory;
pub mod mutators;
pub mod rng;
pub mod scoring;
pub mod stats;
pub mod time_attack;

pub use memory_match_types as types;

// Re-export commonly used types for convenience
pub use board::{GameState, ScoreBreakdown, PAIR_SIZE};
pub use comment::{generate_match_comment, CommentKey};
pub use evaluator::{
    activate_double_down, can_double_down, flip, reset_error_cards, reset_unmatched_cards,
    GameDomainEvent,
};
pub use factory::{create_initial_state, new_game, GameError, GameOptions};
pub use mutators::apply_mutators;
pub use scoring::{
    apply_final_bonuses, calculate_match_score, determine_success_event, MatchPoints,
    MatchScoreResult,
};
pub use stats::GameStats;
