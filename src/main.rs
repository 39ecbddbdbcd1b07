//! Headless memory-match runner (default binary).
//!
//! Deals a board, drives it through the async state machine with a
//! perfect-memory autoplayer and prints the final score breakdown. Useful for
//! smoke-testing rules and timing without a UI.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MEMORY_MATCH_MODE` | `time_attack` | `standard`, `time_attack` or `daily_challenge` |
//! | `MEMORY_MATCH_PAIRS` | 8 | Pairs on the board (ignored for daily) |
//! | `MEMORY_MATCH_SEED` | random | Deck seed (ignored for daily) |
//! | `RUST_LOG` | `info` | tracing filter |
//!
//! Runtime timings are read from the `MEMORY_MATCH_*_MS` variables, see
//! [`RuntimeConfig`].

use std::env;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use memory_match::core::{can_double_down, new_game, GameOptions, GameState};
use memory_match::runtime::{
    GameAction, GameEffect, GameStateMachine, MachineOptions, RuntimeConfig, TokioClock,
};
use memory_match::types::GameMode;

/// Pause between autoplayer moves
const MOVE_DELAY_MS: u64 = 300;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(run())
}

async fn run() -> Result<()> {
    let options = options_from_env()?;
    let config = RuntimeConfig::from_env()?;
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let board = new_game(options, now_ms)?;
    let initial_seconds = if board.mode.counts_down() {
        board.config.initial_time_seconds(board.pair_count)
    } else {
        0
    };
    info!(
        mode = board.mode.as_str(),
        pairs = board.pair_count,
        seed = board.seed,
        initial_seconds,
        "dealt board"
    );

    let scan_ms = config.double_down_scan_ms;
    let machine = GameStateMachine::with_options(
        board,
        initial_seconds,
        |state: &GameState, secs: i64| -> Result<()> {
            debug!(moves = state.moves, score = state.score, secs, "save");
            Ok(())
        },
        MachineOptions {
            config,
            clock: Arc::new(TokioClock::new()),
            resumed: false,
        },
    )?;

    let mut effects = machine.subscribe_effects();
    let listener = tokio::spawn(async move {
        loop {
            match effects.recv().await {
                Ok(GameEffect::GameWon(state)) => {
                    info!(score = state.score, "won");
                }
                Ok(effect) => debug!(?effect, "effect"),
                Err(RecvError::Lagged(n)) => warn!(missed = n, "effect listener lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    machine.dispatch(GameAction::StartGame(None));
    autoplay(&machine, scan_ms).await;

    let final_state = machine.state();
    let seconds = machine.elapsed_seconds();
    machine.shutdown();
    drop(machine);
    listener.abort();

    print_summary(&final_state, seconds);
    Ok(())
}

fn options_from_env() -> Result<GameOptions> {
    let mut options = GameOptions::default();
    if let Some(raw) = env_var("MEMORY_MATCH_MODE") {
        options.mode =
            GameMode::from_str(&raw).ok_or_else(|| anyhow!("unknown game mode {raw:?}"))?;
    }
    if let Some(raw) = env_var("MEMORY_MATCH_PAIRS") {
        options.pair_count = raw
            .parse()
            .with_context(|| format!("MEMORY_MATCH_PAIRS must be a number, got {raw:?}"))?;
    }
    if let Some(raw) = env_var("MEMORY_MATCH_SEED") {
        options.seed = Some(
            raw.parse()
                .with_context(|| format!("MEMORY_MATCH_SEED must be a number, got {raw:?}"))?,
        );
    }
    Ok(options)
}

fn env_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Play until the game ends, always flipping a known pair
async fn autoplay(machine: &GameStateMachine, scan_ms: u64) {
    loop {
        let state = machine.state();
        if state.is_game_over {
            return;
        }

        if can_double_down(&state) {
            info!(combo = state.combo_multiplier, "going double down");
            machine.dispatch(GameAction::DoubleDown);
            tokio::time::sleep(Duration::from_millis(scan_ms + MOVE_DELAY_MS)).await;
            continue;
        }

        match next_flip(&state) {
            Some(card_id) => machine.dispatch(GameAction::FlipCard(card_id)),
            None => {
                warn!("no playable card left");
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(MOVE_DELAY_MS)).await;
    }
}

/// Partner of the face-up card, or the first card of an unmatched pair
fn next_flip(state: &GameState) -> Option<u32> {
    let anchor = state
        .cards
        .iter()
        .find(|c| c.is_active())
        .or_else(|| state.cards.iter().find(|c| !c.is_matched))?;

    if !anchor.is_face_up {
        return Some(anchor.id);
    }
    state
        .cards
        .iter()
        .find(|c| c.id != anchor.id && !c.is_matched && !c.is_face_up && anchor.pairs_with(c))
        .map(|c| c.id)
}

fn print_summary(state: &GameState, seconds: i64) {
    let b = &state.score_breakdown;
    println!("mode:            {}", state.mode.as_str());
    println!("result:          {}", outcome(state));
    println!("moves:           {}", state.moves);
    println!("clock:           {seconds}s");
    println!("base points:     {}", b.base_points);
    println!("combo bonus:     {}", b.combo_bonus);
    println!("double down:     {}", b.double_down_bonus);
    println!("time bonus:      {}", b.time_bonus);
    println!("move bonus:      {}", b.move_bonus);
    println!("total score:     {}", b.total_score);
    println!("currency earned: {}", b.earned_currency);
}

fn outcome(state: &GameState) -> &'static str {
    match (state.is_game_won, state.is_busted) {
        (true, _) => "won",
        (false, true) => "busted",
        (false, false) => "lost",
    }
}
