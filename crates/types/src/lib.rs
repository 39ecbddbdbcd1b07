//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! Everything here is a plain value type: cards, game modes, difficulty tiers,
//! Daily Challenge mutators and the scoring tunables. They are usable in any
//! context (pure game logic, the async runtime, host persistence).
//!
//! # Deck
//!
//! A standard 52-card deck is the source of card faces:
//!
//! - **Suits**: Hearts, Diamonds, Clubs, Spades
//! - **Ranks**: Two through Ten, Jack, Queen, King, Ace
//! - **Max pairs**: 52 (every suit/rank combination appears at most once as a pair)
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TIMER_TICK_MS` | 1000 | Game clock resolution |
//! | `MISMATCH_DELAY_MS` | 1000 | Time a mismatched pair stays visible |
//! | `SYNC_DEBOUNCE_MS` | 2000 | Sampling interval for normal-priority saves |
//! | `DOUBLE_DOWN_SCAN_MS` | 2000 | Peek duration granted when Double Down activates |
//!
//! # Examples
//!
//! ```
//! use memory_match_types::{CardState, GameMode, Rank, Suit, MAX_PAIR_COUNT};
//!
//! let card = CardState::new(0, Suit::Hearts, Rank::Ace);
//! assert!(!card.is_face_up);
//! assert!(card.suit.is_red());
//!
//! // Parse a game mode (case-insensitive)
//! assert_eq!(GameMode::from_str("time_attack"), Some(GameMode::TimeAttack));
//!
//! assert_eq!(MAX_PAIR_COUNT, 52);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Game clock resolution (one tick per second)
pub const TIMER_TICK_MS: u64 = 1000;

/// How long a mismatched pair stays face-up before it is turned back down
pub const MISMATCH_DELAY_MS: u64 = 1000;

/// Sampling interval for normal-priority state saves
pub const SYNC_DEBOUNCE_MS: u64 = 2000;

/// Peek granted when Double Down is activated
pub const DOUBLE_DOWN_SCAN_MS: u64 = 2000;

/// Remaining seconds at or below which Time Attack emits a low-time warning
pub const LOW_TIME_WARNING_SECONDS: i64 = 5;

/// Double Down needs at least this many unmatched pairs left on the board
pub const MIN_PAIRS_FOR_DOUBLE_DOWN: usize = 3;

/// MIRAGE swaps two cards every N moves
pub const MIRAGE_MOVE_INTERVAL: u32 = 5;

/// Number of pairs on every Daily Challenge board
pub const DAILY_CHALLENGE_PAIR_COUNT: usize = 8;

/// Flat currency bonus paid for a won Daily Challenge
pub const DAILY_CHALLENGE_CURRENCY_BONUS: i32 = 500;

/// Score points per unit of earned currency
pub const CURRENCY_DIVISOR: i32 = 100;

/// Default capacity of the effect broadcast buffer
pub const EFFECT_BUFFER_CAPACITY: usize = 64;

/// Largest board a single deck can produce
pub const MAX_PAIR_COUNT: usize = Suit::ALL.len() * Rank::ALL.len();


/// The four card suits
///
/// Hearts and Diamonds are red, Clubs and Spades are black.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    /// All suits in deck order
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn is_red(&self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }

    /// Unicode suit symbol
    ///
    /// # Examples
    ///
    /// ```
    /// use memory_match_types::Suit;
    ///
    /// assert_eq!(Suit::Spades.symbol(), "♠");
    /// assert_eq!(Suit::Hearts.symbol(), "♥");
    /// ```
    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
        }
    }
}

/// Card ranks, Two (low) through Ace (high)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// All ranks in deck order
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Short face label ("2".."10", "J", "Q", "K", "A")
    pub fn symbol(&self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

/// A single card on the board
///
/// Cards are values: a board transition replaces the whole card sequence and
/// never edits a card in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardState {
    /// Unique within a board; equals the card's position at creation time
    pub id: u32,
    pub suit: Suit,
    pub rank: Rank,
    pub is_face_up: bool,
    pub is_matched: bool,
    /// Part of the most recent mismatched pair, waiting to be turned back down
    pub is_error: bool,
    /// The card has been shown to the player at least once
    pub was_seen: bool,
}

impl CardState {
    /// Create a face-down, unmatched card
    pub fn new(id: u32, suit: Suit, rank: Rank) -> Self {
        Self {
            id,
            suit,
            rank,
            is_face_up: false,
            is_matched: false,
            is_error: false,
            was_seen: false,
        }
    }

    /// Two cards pair up when suit and rank are equal
    pub fn pairs_with(&self, other: &CardState) -> bool {
        self.suit == other.suit && self.rank == other.rank
    }

    /// Face-up and still in play
    pub fn is_active(&self) -> bool {
        self.is_face_up && !self.is_matched
    }
}

/// Game modes
///
/// - **Standard**: count-up stopwatch, time penalty on the final bonus
/// - **TimeAttack**: countdown; matches add time, mismatches remove it
/// - **DailyChallenge**: one seeded board per calendar day with mutators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    Standard,
    #[default]
    TimeAttack,
    DailyChallenge,
}

impl GameMode {
    /// Parse mode from string (case-insensitive, `_`/`-` ignored)
    ///
    /// # Examples
    ///
    /// ```
    /// use memory_match_types::GameMode;
    ///
    /// assert_eq!(GameMode::from_str("standard"), Some(GameMode::Standard));
    /// assert_eq!(GameMode::from_str("TIME_ATTACK"), Some(GameMode::TimeAttack));
    /// assert_eq!(GameMode::from_str("daily-challenge"), Some(GameMode::DailyChallenge));
    /// assert_eq!(GameMode::from_str("arcade"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "standard" => Some(GameMode::Standard),
            "timeattack" => Some(GameMode::TimeAttack),
            "dailychallenge" | "daily" => Some(GameMode::DailyChallenge),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Standard => "standard",
            GameMode::TimeAttack => "time_attack",
            GameMode::DailyChallenge => "daily_challenge",
        }
    }

    /// Whether the game clock counts down
    pub fn counts_down(&self) -> bool {
        matches!(self, GameMode::TimeAttack)
    }
}

/// Difficulty tier, used for the currency payout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DifficultyType {
    Tourist,
    #[default]
    Casual,
    Master,
    Shark,
}

impl DifficultyType {
    pub fn payout_multiplier(&self) -> f64 {
        match self {
            DifficultyType::Tourist => 0.25,
            DifficultyType::Casual => 1.0,
            DifficultyType::Master => 2.5,
            DifficultyType::Shark => 5.0,
        }
    }
}

/// Daily Challenge board modifiers
///
/// - **Blackout**: mismatched pairs are shown for half as long
/// - **Mirage**: two unmatched cards swap places every few moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DailyChallengeMutator {
    Blackout,
    Mirage,
}

/// Invalid scoring configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("{0} cannot be negative")]
    Negative(&'static str),
    #[error("pot_mismatch_penalty must be within [0, 1]")]
    PenaltyOutOfRange,
    #[error("the_nuts_threshold ({nuts}) must not be below heat_mode_threshold ({heat})")]
    ThresholdOrder { heat: u32, nuts: u32 },
}

/// Scoring tunables
///
/// Supplied at game start and carried inside the board; never mutated during a
/// game. Use [`ScoringConfig::validate`] before trusting values that came from
/// outside the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub base_match_points: i32,
    /// Multiplied by `combo²` for each match
    pub combo_bonus_points: i32,
    pub time_bonus_per_pair: i64,
    pub time_penalty_per_second: i64,
    pub move_bonus_multiplier: i64,
    /// Combo needed for heat mode (unlocks Double Down)
    pub heat_mode_threshold: u32,
    /// Combo above which a match fires The Nuts
    pub the_nuts_threshold: u32,
    /// The pot is banked every N matches
    pub match_milestone_interval: u32,
    /// Fraction of the pot lost on a standard mismatch
    pub pot_mismatch_penalty: f64,
    pub double_down_multiplier: i64,
    /// Seconds removed per mismatch in Time Attack
    pub time_attack_mismatch_penalty: i64,
    /// Seconds added per match in Time Attack
    pub time_attack_base_gain: i64,
    /// Extra seconds per combo level beyond the first
    pub time_attack_combo_bonus: i64,
    /// Final-bonus points per remaining Time Attack second
    pub time_attack_bonus_multiplier: i64,
    /// Starting Time Attack seconds keyed by pair count
    pub time_attack_initial_times: BTreeMap<usize, i64>,
    pub comment_pot_odds_divisor: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_match_points: 100,
            combo_bonus_points: 50,
            time_bonus_per_pair: 50,
            time_penalty_per_second: 1,
            move_bonus_multiplier: 10_000,
            heat_mode_threshold: 3,
            the_nuts_threshold: 6,
            match_milestone_interval: 3,
            pot_mismatch_penalty: 0.5,
            double_down_multiplier: 2,
            time_attack_mismatch_penalty: 5,
            time_attack_base_gain: 3,
            time_attack_combo_bonus: 2,
            time_attack_bonus_multiplier: 10,
            time_attack_initial_times: BTreeMap::from([(6, 30), (8, 45), (10, 60), (12, 75)]),
            comment_pot_odds_divisor: 2,
        }
    }
}

impl ScoringConfig {
    /// Seconds per pair used when a pair count has no table entry
    pub const FALLBACK_SECONDS_PER_PAIR: i64 = 4;

    /// Check every field's range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_match_points <= 0 {
            return Err(ConfigError::NotPositive("base_match_points"));
        }
        if self.heat_mode_threshold == 0 {
            return Err(ConfigError::NotPositive("heat_mode_threshold"));
        }
        if self.match_milestone_interval == 0 {
            return Err(ConfigError::NotPositive("match_milestone_interval"));
        }
        if self.comment_pot_odds_divisor == 0 {
            return Err(ConfigError::NotPositive("comment_pot_odds_divisor"));
        }
        if self.double_down_multiplier <= 0 {
            return Err(ConfigError::NotPositive("double_down_multiplier"));
        }
        if self.the_nuts_threshold < self.heat_mode_threshold {
            return Err(ConfigError::ThresholdOrder {
                heat: self.heat_mode_threshold,
                nuts: self.the_nuts_threshold,
            });
        }
        if !(0.0..=1.0).contains(&self.pot_mismatch_penalty) {
            return Err(ConfigError::PenaltyOutOfRange);
        }

        let non_negative = [
            ("combo_bonus_points", i64::from(self.combo_bonus_points)),
            ("time_bonus_per_pair", self.time_bonus_per_pair),
            ("time_penalty_per_second", self.time_penalty_per_second),
            ("move_bonus_multiplier", self.move_bonus_multiplier),
            ("time_attack_mismatch_penalty", self.time_attack_mismatch_penalty),
            ("time_attack_base_gain", self.time_attack_base_gain),
            ("time_attack_combo_bonus", self.time_attack_combo_bonus),
            ("time_attack_bonus_multiplier", self.time_attack_bonus_multiplier),
        ];
        if let Some((name, _)) = non_negative.into_iter().find(|(_, value)| *value < 0) {
            return Err(ConfigError::Negative(name));
        }
        if self.time_attack_initial_times.values().any(|s| *s < 0) {
            return Err(ConfigError::Negative("time_attack_initial_times"));
        }

        Ok(())
    }

    /// Starting Time Attack seconds for a board of `pair_count` pairs
    pub fn initial_time_seconds(&self, pair_count: usize) -> i64 {
        self.time_attack_initial_times
            .get(&pair_count)
            .copied()
            .unwrap_or_else(|| pair_count as i64 * Self::FALLBACK_SECONDS_PER_PAIR)
    }
}
