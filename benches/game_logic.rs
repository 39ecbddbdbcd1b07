use criterion::{black_box, criterion_group, criterion_main, Criterion};
use memory_match::core::rng::seeded_rng;
use memory_match::core::{
    apply_final_bonuses, apply_mutators, create_initial_state, flip, reset_unmatched_cards,
    GameState,
};
use memory_match::types::{DailyChallengeMutator, DifficultyType, GameMode, ScoringConfig};

fn deal(pair_count: usize) -> GameState {
    create_initial_state(
        pair_count,
        ScoringConfig::default(),
        GameMode::Standard,
        DifficultyType::Casual,
        false,
        &mut seeded_rng(12345),
    )
    .unwrap()
}

/// Play a board to the end, matching every pair in card order
fn perfect_game(mut state: GameState) -> GameState {
    while !state.is_game_over {
        let Some(first) = state.cards.iter().find(|c| !c.is_matched).copied() else {
            break;
        };
        let Some(second) = state
            .cards
            .iter()
            .find(|c| c.id != first.id && c.pairs_with(&first))
            .copied()
        else {
            break;
        };
        state = flip(state, first.id).0;
        state = flip(state, second.id).0;
    }
    state
}

fn bench_deal(c: &mut Criterion) {
    c.bench_function("create_initial_state_26_pairs", |b| {
        b.iter(|| deal(black_box(26)))
    });
}

fn bench_flip_mismatch(c: &mut Criterion) {
    let state = deal(12);
    let first = state.cards[0];
    let other = state
        .cards
        .iter()
        .find(|c| !c.pairs_with(&first))
        .map(|c| c.id)
        .unwrap_or(1);

    c.bench_function("flip_mismatch_and_reset", |b| {
        b.iter(|| {
            let (s, _) = flip(state.clone(), black_box(first.id));
            let (s, _) = flip(s, black_box(other));
            reset_unmatched_cards(s)
        })
    });
}

fn bench_perfect_game(c: &mut Criterion) {
    let state = deal(26);
    c.bench_function("perfect_game_26_pairs", |b| {
        b.iter(|| perfect_game(black_box(state.clone())))
    });
}

fn bench_final_bonuses(c: &mut Criterion) {
    let won = perfect_game(deal(12));
    c.bench_function("apply_final_bonuses", |b| {
        b.iter(|| apply_final_bonuses(won.clone(), black_box(42)))
    });
}

fn bench_mirage(c: &mut Criterion) {
    let mut state = deal(12);
    state.active_mutators.insert(DailyChallengeMutator::Mirage);
    state.moves = 5;
    let mut rng = seeded_rng(7);

    c.bench_function("mirage_swap", |b| {
        b.iter(|| apply_mutators(state.clone(), &mut rng))
    });
}

criterion_group!(
    benches,
    bench_deal,
    bench_flip_mismatch,
    bench_perfect_game,
    bench_final_bonuses,
    bench_mirage
);
criterion_main!(benches);
