//! Game factory - dealing new boards
//!
//! A board is dealt by shuffling every (suit, rank) face, keeping the first
//! `pair_count`, duplicating them and shuffling again. The same seed always
//! yields the same board, which is what makes Daily Challenges shareable.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::board::GameState;
use crate::rng::{daily_seed, fresh_seed, seeded_rng};
use crate::types::{
    CardState, ConfigError, DailyChallengeMutator, DifficultyType, GameMode, Rank, ScoringConfig,
    Suit, DAILY_CHALLENGE_PAIR_COUNT, MAX_PAIR_COUNT,
};

/// Probability that a Daily Challenge rolls BLACKOUT
const BLACKOUT_CHANCE: f32 = 0.5;

/// Probability that a Daily Challenge rolls MIRAGE
const MIRAGE_CHANCE: f32 = 0.4;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("pair count must be between 1 and {max}, got {got}")]
    InvalidPairCount { got: usize, max: usize },
    #[error("invalid scoring config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Deal a new board
pub fn create_initial_state<R: Rng + ?Sized>(
    pair_count: usize,
    config: ScoringConfig,
    mode: GameMode,
    difficulty: DifficultyType,
    is_heat_shield_available: bool,
    rng: &mut R,
) -> Result<GameState, GameError> {
    if pair_count == 0 || pair_count > MAX_PAIR_COUNT {
        return Err(GameError::InvalidPairCount {
            got: pair_count,
            max: MAX_PAIR_COUNT,
        });
    }
    config.validate()?;

    let mut faces: Vec<(Suit, Rank)> = Suit::ALL
        .iter()
        .flat_map(|suit| Rank::ALL.iter().map(move |rank| (*suit, *rank)))
        .collect();
    faces.shuffle(rng);

    let mut deck: Vec<(Suit, Rank)> = faces
        .iter()
        .take(pair_count)
        .flat_map(|face| [*face, *face])
        .collect();
    deck.shuffle(rng);

    let cards = deck
        .into_iter()
        .enumerate()
        .map(|(id, (suit, rank))| CardState::new(id as u32, suit, rank))
        .collect();

    let mut state = GameState::new(cards, pair_count, config);
    state.mode = mode;
    state.difficulty = difficulty;
    state.is_heat_shield_available = is_heat_shield_available;
    Ok(state)
}

/// Options for [`new_game`]
#[derive(Debug, Clone, PartialEq)]
pub struct GameOptions {
    pub pair_count: usize,
    pub mode: GameMode,
    pub difficulty: DifficultyType,
    pub config: ScoringConfig,
    pub is_heat_shield_available: bool,
    /// Deck seed; a fresh one is drawn when `None`. Ignored for Daily Challenges.
    pub seed: Option<u64>,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            pair_count: DAILY_CHALLENGE_PAIR_COUNT,
            mode: GameMode::default(),
            difficulty: DifficultyType::default(),
            config: ScoringConfig::default(),
            is_heat_shield_available: false,
            seed: None,
        }
    }
}

/// Start a new game
///
/// Daily Challenges always use [`DAILY_CHALLENGE_PAIR_COUNT`] pairs, take their
/// seed from the calendar day and roll their mutators from the same RNG after
/// dealing.
pub fn new_game(options: GameOptions, now_epoch_ms: u64) -> Result<GameState, GameError> {
    let is_daily = options.mode == GameMode::DailyChallenge;
    let (pair_count, seed) = if is_daily {
        (DAILY_CHALLENGE_PAIR_COUNT, daily_seed(now_epoch_ms))
    } else {
        (options.pair_count, options.seed.unwrap_or_else(fresh_seed))
    };

    let mut rng = seeded_rng(seed);
    let mut state = create_initial_state(
        pair_count,
        options.config,
        options.mode,
        options.difficulty,
        options.is_heat_shield_available,
        &mut rng,
    )?;
    state.seed = seed;

    if is_daily {
        state.active_mutators = roll_daily_mutators(&mut rng);
    }

    debug!(
        mode = state.mode.as_str(),
        pair_count,
        seed,
        mutators = ?state.active_mutators,
        "dealt new board"
    );
    Ok(state)
}

fn roll_daily_mutators<R: Rng + ?Sized>(rng: &mut R) -> BTreeSet<DailyChallengeMutator> {
    let mut mutators = BTreeSet::new();
    if rng.random::<f32>() < BLACKOUT_CHANCE {
        mutators.insert(DailyChallengeMutator::Blackout);
    }
    if rng.random::<f32>() < MIRAGE_CHANCE {
        mutators.insert(DailyChallengeMutator::Mirage);
    }
    if mutators.is_empty() {
        mutators.insert(DailyChallengeMutator::Blackout);
    }
    mutators
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn deal(pair_count: usize, seed: u64) -> Result<GameState, GameError> {
        create_initial_state(
            pair_count,
            ScoringConfig::default(),
            GameMode::Standard,
            DifficultyType::Casual,
            false,
            &mut seeded_rng(seed),
        )
    }

    #[test]
    fn test_every_face_appears_exactly_twice() {
        let state = deal(12, 42).unwrap();
        assert_eq!(state.cards.len(), 24);

        let mut counts: HashMap<(Suit, Rank), usize> = HashMap::new();
        for card in &state.cards {
            *counts.entry((card.suit, card.rank)).or_default() += 1;
        }
        assert_eq!(counts.len(), 12);
        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn test_ids_are_positions() {
        let state = deal(6, 1).unwrap();
        for (i, card) in state.cards.iter().enumerate() {
            assert_eq!(card.id as usize, i);
            assert!(!card.is_face_up && !card.is_matched);
        }
    }

    #[test]
    fn test_same_seed_same_board() {
        assert_eq!(deal(8, 99).unwrap().cards, deal(8, 99).unwrap().cards);
        assert_ne!(deal(8, 99).unwrap().cards, deal(8, 100).unwrap().cards);
    }

    #[test]
    fn test_pair_count_bounds() {
        assert!(deal(1, 0).is_ok());
        assert!(deal(52, 0).is_ok());
        assert_eq!(
            deal(0, 0).unwrap_err(),
            GameError::InvalidPairCount { got: 0, max: 52 }
        );
        assert!(matches!(
            deal(53, 0),
            Err(GameError::InvalidPairCount { got: 53, .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ScoringConfig {
            match_milestone_interval: 0,
            ..ScoringConfig::default()
        };
        let result = create_initial_state(
            4,
            config,
            GameMode::Standard,
            DifficultyType::Casual,
            false,
            &mut seeded_rng(0),
        );
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_game_records_seed() {
        let options = GameOptions {
            pair_count: 6,
            mode: GameMode::TimeAttack,
            seed: Some(77),
            ..GameOptions::default()
        };
        let state = new_game(options, 0).unwrap();
        assert_eq!(state.seed, 77);
        assert_eq!(state.pair_count, 6);
        assert!(state.active_mutators.is_empty());
    }

    #[test]
    fn test_daily_challenge_is_keyed_by_day() {
        let options = GameOptions {
            pair_count: 3,
            mode: GameMode::DailyChallenge,
            seed: Some(5),
            ..GameOptions::default()
        };
        let morning = new_game(options.clone(), 1_700_000_000_000).unwrap();
        let evening = new_game(options.clone(), 1_700_000_000_000 + 3_600_000).unwrap();
        let tomorrow = new_game(options, 1_700_000_000_000 + 86_400_000).unwrap();

        assert_eq!(morning.pair_count, DAILY_CHALLENGE_PAIR_COUNT);
        assert_eq!(morning.seed, daily_seed(1_700_000_000_000));
        assert_eq!(morning.cards, evening.cards);
        assert_eq!(morning.active_mutators, evening.active_mutators);
        assert_ne!(morning.cards, tomorrow.cards);
        assert!(!morning.active_mutators.is_empty());
    }
}
