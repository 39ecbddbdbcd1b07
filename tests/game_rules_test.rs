//! Integration tests for the pure game rules

use rand::Rng;

use memory_match::core::rng::seeded_rng;
use memory_match::core::stats::GameStats;
use memory_match::core::{
    activate_double_down, apply_final_bonuses, apply_mutators, can_double_down,
    create_initial_state, flip, new_game, reset_unmatched_cards, GameDomainEvent, GameError,
    GameOptions, GameState,
};
use memory_match::types::{
    CardState, DailyChallengeMutator, DifficultyType, GameMode, Rank, ScoringConfig, Suit,
    DAILY_CHALLENGE_PAIR_COUNT,
};

/// Board where cards `2k` and `2k + 1` form pair `k`
fn paired_board(pair_count: usize) -> GameState {
    let cards = (0..pair_count)
        .flat_map(|k| {
            let suit = Suit::ALL[k % Suit::ALL.len()];
            let rank = Rank::ALL[k / Suit::ALL.len()];
            [
                CardState::new((2 * k) as u32, suit, rank),
                CardState::new((2 * k + 1) as u32, suit, rank),
            ]
        })
        .collect();
    GameState::new(cards, pair_count, ScoringConfig::default())
}

fn flip_pair(state: GameState, a: u32, b: u32) -> (GameState, Option<GameDomainEvent>) {
    let (state, event) = flip(state, a);
    assert_eq!(event, Some(GameDomainEvent::CardFlipped));
    flip(state, b)
}

#[test]
fn test_perfect_game_banks_on_milestone_and_win() {
    let mut state = paired_board(4);

    let (next, event) = flip_pair(state, 0, 1);
    assert_eq!(event, Some(GameDomainEvent::MatchSuccess));
    assert_eq!((next.score, next.current_pot, next.combo_multiplier), (0, 100, 1));
    assert_eq!(next.last_matched_ids, vec![0, 1]);
    state = next;

    let (next, _) = flip_pair(state, 2, 3);
    assert_eq!((next.score, next.current_pot), (0, 250));
    state = next;

    // third match is a milestone: the pot is banked
    let (next, _) = flip_pair(state, 4, 5);
    assert_eq!((next.score, next.current_pot, next.combo_multiplier), (550, 0, 3));
    state = next;

    let (next, event) = flip_pair(state, 6, 7);
    assert_eq!(event, Some(GameDomainEvent::GameWon));
    assert!(next.is_game_won && next.is_game_over);
    assert_eq!(next.score, 1100);
    assert_eq!(next.total_base_points, 400);
    assert_eq!(next.total_combo_bonus, 700);
    assert_eq!(next.moves, 4);

    let finished = apply_final_bonuses(next, 20);
    let b = finished.score_breakdown;
    assert_eq!(b.time_bonus, 180);
    assert_eq!(b.move_bonus, 10_000);
    assert_eq!(b.total_score, 11_280);
    assert_eq!(finished.score, 11_280);
    assert_eq!(b.earned_currency, 112);
}

#[test]
fn test_new_flip_clears_highlight() {
    let (state, _) = flip_pair(paired_board(3), 0, 1);
    assert_eq!(state.last_matched_ids, vec![0, 1]);
    let (state, _) = flip(state, 2);
    assert!(state.last_matched_ids.is_empty());
}

#[test]
fn test_mismatch_halves_pot_and_resets_combo() {
    let (state, _) = flip_pair(paired_board(4), 0, 1);
    let (state, _) = flip_pair(state, 2, 3);
    assert_eq!(state.current_pot, 250);

    let (state, event) = flip_pair(state, 4, 6);
    assert_eq!(event, Some(GameDomainEvent::MatchFailure));
    assert_eq!(state.current_pot, 125);
    assert_eq!(state.combo_multiplier, 0);
    assert!(state.card(4).unwrap().is_error && state.card(6).unwrap().is_error);

    // board is locked until the mismatch is resolved
    let (locked, event) = flip(state.clone(), 5);
    assert_eq!(event, None);
    assert_eq!(locked, state);

    let state = reset_unmatched_cards(state);
    assert_eq!(state.face_up_unmatched_count(), 0);
    assert!(!state.has_error_cards());
}

#[test]
fn test_heat_shield_checked_before_bust() {
    let mut state = paired_board(6);
    for k in 0..3u32 {
        state = flip_pair(state, 2 * k, 2 * k + 1).0;
    }
    assert!(can_double_down(&state));
    state = activate_double_down(state);
    state.is_heat_shield_available = true;

    let (state, event) = flip_pair(state, 6, 8);
    assert_eq!(event, Some(GameDomainEvent::HeatShieldUsed));
    assert!(!state.is_heat_shield_available);
    assert!(!state.is_game_over);
    assert!(state.is_double_down_active);
    assert_eq!(state.combo_multiplier, 3);

    let state = reset_unmatched_cards(state);
    let (state, event) = flip_pair(state, 6, 8);
    assert_eq!(event, Some(GameDomainEvent::GameOver));
    assert!(state.is_busted && state.is_game_over && !state.is_game_won);
    assert_eq!(state.score, 0);
}

#[test]
fn test_double_down_win_doubles_bank() {
    let mut state = paired_board(4);
    for k in 0..3u32 {
        state = flip_pair(state, 2 * k, 2 * k + 1).0;
    }
    assert_eq!(state.score, 550);
    // only one pair left: not enough to double down
    assert!(!can_double_down(&state));

    state.is_double_down_active = true;
    let (state, event) = flip_pair(state, 6, 7);
    assert_eq!(event, Some(GameDomainEvent::GameWon));
    assert_eq!(state.score, 2200);
    assert_eq!(state.total_double_down_bonus, 1100);
    assert!(!state.is_double_down_active);
}

#[test]
fn test_random_play_keeps_invariants() {
    let mut rng = seeded_rng(7);
    let mut state = create_initial_state(
        10,
        ScoringConfig::default(),
        GameMode::Standard,
        DifficultyType::Casual,
        true,
        &mut rng,
    )
    .unwrap();

    let mut was_over = false;
    for _ in 0..2_000 {
        if state.is_evaluation_pending() {
            state = reset_unmatched_cards(state);
        }
        if rng.random_bool(0.05) {
            state = activate_double_down(state);
        }
        let id = rng.random_range(0..state.cards.len() as u32);
        let (next, event) = flip(state, id);

        assert!(next.score >= 0);
        assert!(next.current_pot >= 0);
        assert!(next.face_up_unmatched_count() <= 2);
        assert!(!was_over || next.is_game_over);
        if event == Some(GameDomainEvent::MatchFailure) {
            assert_eq!(next.combo_multiplier, 0);
        }
        was_over = next.is_game_over;
        state = next;
    }
}

#[test]
fn test_daily_challenge_is_shared_for_the_day() {
    let options = GameOptions {
        mode: GameMode::DailyChallenge,
        pair_count: 3,
        seed: Some(1),
        ..GameOptions::default()
    };
    let morning = new_game(options.clone(), 1_700_000_000_000).unwrap();
    let evening = new_game(options.clone(), 1_700_000_000_000 + 3_600_000).unwrap();

    assert_eq!(morning.pair_count, DAILY_CHALLENGE_PAIR_COUNT);
    assert_eq!(morning.cards, evening.cards);
    assert_eq!(morning.active_mutators, evening.active_mutators);
    assert!(!morning.active_mutators.is_empty());
}

#[test]
fn test_seeded_game_is_reproducible() {
    let options = GameOptions {
        mode: GameMode::Standard,
        pair_count: 10,
        seed: Some(2024),
        ..GameOptions::default()
    };
    let a = new_game(options.clone(), 0).unwrap();
    let b = new_game(options, 0).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.seed, 2024);
    assert!(a.active_mutators.is_empty());
}

#[test]
fn test_invalid_options_rejected() {
    let too_many = GameOptions {
        mode: GameMode::Standard,
        pair_count: 53,
        ..GameOptions::default()
    };
    assert!(matches!(
        new_game(too_many, 0),
        Err(GameError::InvalidPairCount { got: 53, max: 52 })
    ));

    let mut config = ScoringConfig::default();
    config.pot_mismatch_penalty = 1.5;
    let bad_config = GameOptions {
        mode: GameMode::Standard,
        config,
        ..GameOptions::default()
    };
    assert!(matches!(new_game(bad_config, 0), Err(GameError::InvalidConfig(_))));
}

#[test]
fn test_mirage_keeps_matched_cards_in_place() {
    let (mut state, _) = flip_pair(paired_board(6), 0, 1);
    state.active_mutators.insert(DailyChallengeMutator::Mirage);
    state.moves = 5;

    let mut rng = seeded_rng(3);
    let moved = apply_mutators(state.clone(), &mut rng);
    assert_eq!(moved.cards[0], state.cards[0]);
    assert_eq!(moved.cards[1], state.cards[1]);
    assert_ne!(moved.cards, state.cards);

    state.moves = 6;
    assert_eq!(apply_mutators(state.clone(), &mut rng), state);
}

#[test]
fn test_stats_keep_bests() {
    let first = GameStats::record(None, 8, 900, 40).unwrap();
    let second = GameStats::record(Some(&first), 8, 700, 35).unwrap();
    assert_eq!(second.best_score, 900);
    assert_eq!(second.best_time_seconds, 35);
    assert_eq!(second.games_played, 2);
    assert!(GameStats::record(None, 0, 1, 1).is_err());
}
