//! Game state machine - the orchestrator
//!
//! Owns the current board and the game clock, turns [`GameAction`]s into board
//! transitions, publishes [`GameEffect`]s and hands every committed change to
//! the [`StateSyncManager`].
//!
//! # Lifecycle
//!
//! ```text
//! Idle --StartGame--> Running --mismatch--> MismatchPending --ProcessMismatch--> Running
//!                        |                                                          |
//!                        +--------------> GameOver (Won | Lost | Busted) <----------+
//! ```
//!
//! Restarting is up to the host: it drops this machine and builds a new one.
//!
//! # Concurrency
//!
//! Dispatch is serial. Every action takes the same mutex, so timer ticks,
//! delayed mismatch resolution and host input can never interleave their
//! read-modify-write of the board. Effects are published after the new state
//! is committed, in order. Saves are stamped while the mutex is held and
//! written after it is released, so a slow or failing save never holds up
//! other dispatches or state reads. Background jobs (timer, mismatch delay, scan
//! reveal) each live in a [`TaskSlot`] and hold only a weak reference to the
//! machine.
//!
//! # Scan peek
//!
//! `ScanCards` shows every unmatched card face-up for a while. The peek is a
//! view overlay: [`GameStateMachine::state`] and the watch channel show it, but
//! the stored board and the persisted state never contain it. Flips are
//! ignored while a peek is showing.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use memory_match_core::rng::seeded_rng;
use memory_match_core::time_attack::{add_bonus_time, apply_mismatch_penalty, time_gain};
use memory_match_core::types::{DailyChallengeMutator, GameMode, LOW_TIME_WARNING_SECONDS};
use memory_match_core::{
    activate_double_down, apply_final_bonuses, apply_mutators, flip, reset_unmatched_cards,
    GameDomainEvent, GameState,
};

use crate::actions::GameAction;
use crate::clock::{Clock, TokioClock};
use crate::config::RuntimeConfig;
use crate::effects::{EffectSink, GameEffect};
use crate::error::RuntimeError;
use crate::persist::{Priority, SaveHandler};
use crate::scope::{TaskScope, TaskSlot};
use crate::sync::{StateSyncManager, SyncRequest};
use crate::timer::GameTimer;
use crate::transition::{TimerCommand, Transition};

/// Construction options for [`GameStateMachine::with_options`]
#[derive(Clone)]
pub struct MachineOptions {
    pub config: RuntimeConfig,
    pub clock: Arc<dyn Clock>,
    /// The board comes from storage rather than a fresh deal
    pub resumed: bool,
}

impl Default for MachineOptions {
    fn default() -> Self {
        Self {
            config: RuntimeConfig::default(),
            clock: Arc::new(TokioClock::new()),
            resumed: false,
        }
    }
}

/// Save stamped under the board lock, written once it is released
enum Write {
    Submit(SyncRequest, Priority),
    Flush(SyncRequest),
}

struct Inner {
    state: GameState,
    /// Remaining seconds in Time Attack, elapsed seconds otherwise
    time: i64,
    peek_active: bool,
    rng: StdRng,
}

struct Shared {
    inner: Mutex<Inner>,
    config: RuntimeConfig,
    scope: TaskScope,
    effects: EffectSink,
    view_tx: watch::Sender<GameState>,
    sync: StateSyncManager,
    timer: GameTimer,
    mismatch_task: TaskSlot,
    scan_task: TaskSlot,
}

/// Handle to a running game
///
/// Must be created inside a tokio runtime. Cloning is cheap and every clone
/// drives the same game.
#[derive(Clone)]
pub struct GameStateMachine {
    shared: Arc<Shared>,
}

impl GameStateMachine {
    /// Machine for a freshly dealt board
    ///
    /// # Panics
    ///
    /// Panics if `initial_seconds` is negative.
    pub fn new<S>(initial: GameState, initial_seconds: i64, saver: S) -> Result<Self, RuntimeError>
    where
        S: SaveHandler + 'static,
    {
        Self::with_options(initial, initial_seconds, saver, MachineOptions::default())
    }

    /// Machine for a board restored from storage
    pub fn resume<S>(state: GameState, seconds: i64, saver: S) -> Result<Self, RuntimeError>
    where
        S: SaveHandler + 'static,
    {
        let options = MachineOptions {
            resumed: true,
            ..MachineOptions::default()
        };
        Self::with_options(state, seconds, saver, options)
    }

    /// # Panics
    ///
    /// Panics if `initial_seconds` is negative.
    pub fn with_options<S>(
        initial: GameState,
        initial_seconds: i64,
        saver: S,
        options: MachineOptions,
    ) -> Result<Self, RuntimeError>
    where
        S: SaveHandler + 'static,
    {
        assert!(
            initial_seconds >= 0,
            "initial time cannot be negative: {initial_seconds}"
        );
        options.config.validate()?;
        let scope = TaskScope::current()?;

        let MachineOptions {
            config,
            clock,
            resumed,
        } = options;

        let mut initial = initial;
        if resumed {
            initial.last_matched_ids.clear();
        }
        let needs_mismatch = resumed && has_unresolved_cards(&initial);

        let sync = StateSyncManager::new(saver, clock, config.sync_debounce_ms, &scope);
        if !resumed {
            sync.sync(&initial, initial_seconds, Priority::High);
        }

        let (view_tx, _) = watch::channel(initial.clone());
        let rng = seeded_rng(initial.seed);

        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let weak = weak.clone();
            let timer = GameTimer::new(scope.clone(), config.tick_interval_ms, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.dispatch(GameAction::Tick);
                }
            });
            Shared {
                inner: Mutex::new(Inner {
                    state: initial,
                    time: initial_seconds,
                    peek_active: false,
                    rng,
                }),
                effects: EffectSink::new(config.effect_buffer),
                config,
                scope,
                view_tx,
                sync,
                timer,
                mismatch_task: TaskSlot::new(),
                scan_task: TaskSlot::new(),
            }
        });

        if needs_mismatch {
            let delay = shared.mismatch_delay(&shared.inner.lock().state);
            debug!(delay_ms = delay, "resumed with unresolved cards");
            shared.schedule_mismatch(delay);
        }

        Ok(Self { shared })
    }

    /// Apply an action; returns once it and its follow-ups are committed
    pub fn dispatch(&self, action: GameAction) {
        self.shared.dispatch(action);
    }

    /// Board as the player sees it, including any scan peek
    pub fn state(&self) -> GameState {
        self.shared.view_tx.borrow().clone()
    }

    /// Board as stored, without the scan overlay
    pub fn persisted_state(&self) -> GameState {
        self.shared.inner.lock().state.clone()
    }

    /// Remaining seconds in Time Attack, elapsed seconds otherwise
    pub fn elapsed_seconds(&self) -> i64 {
        self.shared.inner.lock().time
    }

    pub fn is_peeking(&self) -> bool {
        self.shared.inner.lock().peek_active
    }

    pub fn is_timer_running(&self) -> bool {
        self.shared.timer.is_running()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<GameState> {
        self.shared.view_tx.subscribe()
    }

    pub fn subscribe_effects(&self) -> broadcast::Receiver<GameEffect> {
        self.shared.effects.subscribe()
    }

    /// Save the current board right away
    pub fn flush(&self) {
        let request = {
            let inner = self.shared.inner.lock();
            self.shared.sync.request(&inner.state, inner.time)
        };
        self.shared.sync.flush_request(request);
    }

    /// Cancel all background work and save one last time
    pub fn shutdown(&self) {
        let shared = &self.shared;
        shared.timer.stop();
        shared.mismatch_task.cancel();
        shared.scan_task.cancel();
        shared.scope.close();
        let request = {
            let mut inner = shared.inner.lock();
            inner.peek_active = false;
            shared.publish_view(&inner);
            shared.sync.request(&inner.state, inner.time)
        };
        shared.sync.flush_request(request);
        shared.sync.shutdown();
        info!("game state machine shut down");
    }
}

impl std::fmt::Debug for GameStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("GameStateMachine")
            .field("mode", &inner.state.mode)
            .field("moves", &inner.state.moves)
            .field("score", &inner.state.score)
            .field("time", &inner.time)
            .field("game_over", &inner.state.is_game_over)
            .finish()
    }
}

impl Shared {
    fn dispatch(self: &Arc<Self>, action: GameAction) {
        let mut writes = Vec::new();
        let follow_ups = {
            let mut inner = self.inner.lock();
            if inner.state.is_game_over && action != GameAction::Restart {
                debug!(action = action.as_str(), "ignored: game over");
                return;
            }

            let transition = match action {
                GameAction::StartGame(board) => {
                    Some(self.start_game(&mut inner, board, &mut writes))
                }
                GameAction::FlipCard(card_id) => self.flip_card(&mut inner, card_id),
                GameAction::DoubleDown => self.double_down(&inner),
                GameAction::ScanCards(duration_ms) => {
                    self.scan_cards(&mut inner, duration_ms);
                    None
                }
                GameAction::ProcessMismatch => Some(self.process_mismatch(&inner)),
                GameAction::Tick => Some(self.tick(&inner)),
                GameAction::ClearComment => {
                    let mut t = Transition::new(inner.state.clone(), inner.time);
                    t.update(|s| s.match_comment = None);
                    Some(t)
                }
                GameAction::AddTime(seconds) => {
                    let mut t = Transition::new(inner.state.clone(), inner.time);
                    let next = add_bonus_time(inner.time, seconds);
                    t.set_time(next);
                    t.effect(GameEffect::TimerUpdate(next));
                    Some(t)
                }
                GameAction::Restart => None,
            };

            match transition {
                Some(t) => self.apply(&mut inner, t, &mut writes),
                None => Vec::new(),
            }
        };

        for write in writes {
            match write {
                Write::Submit(request, priority) => self.sync.submit(request, priority),
                Write::Flush(request) => {
                    self.sync.flush_request(request);
                }
            }
        }
        for action in follow_ups {
            self.dispatch(action);
        }
    }

    /// Commit a transition: time, board, persistence, effects, then scheduling
    fn apply(
        self: &Arc<Self>,
        inner: &mut Inner,
        t: Transition,
        writes: &mut Vec<Write>,
    ) -> Vec<GameAction> {
        let Transition {
            state,
            time,
            effects,
            timer,
            mismatch_delay_ms,
            follow_ups,
            urgent,
        } = t;

        let time_changed = time != inner.time;
        inner.time = time;
        if time_changed || state != inner.state {
            let priority = if urgent || state.is_game_over || state.moves > inner.state.moves {
                Priority::High
            } else {
                Priority::Normal
            };
            inner.state = state;
            writes.push(Write::Submit(
                self.sync.request(&inner.state, inner.time),
                priority,
            ));
            self.publish_view(inner);
        }

        for effect in effects {
            self.effects.publish(effect);
        }

        match timer {
            Some(TimerCommand::Start) => self.timer.start(),
            Some(TimerCommand::Stop) => self.timer.stop(),
            None => {}
        }
        if let Some(delay) = mismatch_delay_ms {
            self.schedule_mismatch(delay);
        }
        if inner.state.is_game_over {
            info!(
                won = inner.state.is_game_won,
                busted = inner.state.is_busted,
                score = inner.state.score,
                moves = inner.state.moves,
                "game over"
            );
        }

        follow_ups
    }

    fn publish_view(&self, inner: &Inner) {
        let view = if inner.peek_active {
            inner.state.revealed()
        } else {
            inner.state.clone()
        };
        self.view_tx.send_replace(view);
    }

    fn mismatch_delay(&self, state: &GameState) -> u64 {
        if state.has_mutator(DailyChallengeMutator::Blackout) {
            self.config.mismatch_delay_ms / 2
        } else {
            self.config.mismatch_delay_ms
        }
    }

    fn schedule_mismatch(self: &Arc<Self>, delay_ms: u64) {
        let weak = Arc::downgrade(self);
        self.mismatch_task.replace(self.scope.spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            if let Some(shared) = weak.upgrade() {
                shared.dispatch(GameAction::ProcessMismatch);
            }
        }));
    }

    fn start_game(
        &self,
        inner: &mut Inner,
        board: Option<Box<GameState>>,
        writes: &mut Vec<Write>,
    ) -> Transition {
        let mut t = Transition::new(inner.state.clone(), inner.time);
        if let Some(board) = board {
            let mut board = *board;
            board.last_matched_ids.clear();
            writes.push(Write::Flush(self.sync.request(&inner.state, inner.time)));
            self.mismatch_task.cancel();
            self.scan_task.cancel();
            inner.peek_active = false;
            inner.rng = seeded_rng(board.seed);
            info!(mode = board.mode.as_str(), pairs = board.pair_count, "adopting saved board");
            if has_unresolved_cards(&board) {
                debug!("adopted board has unresolved cards");
                t.schedule_mismatch(self.mismatch_delay(&board));
            }
            t.set_state(board);
            t.persist_now();
        } else {
            info!(
                mode = inner.state.mode.as_str(),
                pairs = inner.state.pair_count,
                "game started"
            );
        }
        t.start_timer();
        t
    }

    fn flip_card(&self, inner: &mut Inner, card_id: u32) -> Option<Transition> {
        if inner.peek_active {
            debug!(card_id, "flip ignored: scan in progress");
            return None;
        }
        if inner.state.is_evaluation_pending() {
            debug!(card_id, "flip ignored: evaluation pending");
            return None;
        }

        let (flipped, event) = flip(inner.state.clone(), card_id);
        let event = event?;

        let mut t = Transition::new(flipped, inner.time);
        match event {
            GameDomainEvent::CardFlipped => t.effect(GameEffect::PlayFlipSound),
            GameDomainEvent::MatchSuccess | GameDomainEvent::TheNutsAchieved => {
                t.effect(GameEffect::PlayFlipSound);
                t.effect(GameEffect::VibrateMatch);
                t.effect(GameEffect::PlayMatchSound);

                let combo = t.state().combo_multiplier;
                let on_heat = combo >= t.state().config.heat_mode_threshold;
                if event == GameDomainEvent::TheNutsAchieved {
                    t.effect(GameEffect::PlayTheNutsSound);
                } else if on_heat {
                    t.effect(GameEffect::VibrateHeat);
                }

                if t.state().mode == GameMode::TimeAttack {
                    let bonus = time_gain(combo, &t.state().config);
                    let next = add_bonus_time(inner.time, bonus);
                    t.set_time(next);
                    t.effect(GameEffect::TimerUpdate(next));
                    t.effect(GameEffect::TimeGain(bonus));
                }
                t.transition(|s| apply_mutators(s, &mut inner.rng));
            }
            GameDomainEvent::MatchFailure => {
                t.effect(GameEffect::PlayFlipSound);
                t.effect(GameEffect::PlayMismatch);
                t.effect(GameEffect::VibrateMismatch);
                let delay = self.mismatch_delay(t.state());
                t.schedule_mismatch(delay);
                t.transition(|s| apply_mutators(s, &mut inner.rng));
            }
            GameDomainEvent::HeatShieldUsed => {
                t.effect(GameEffect::PlayFlipSound);
                t.effect(GameEffect::HeatShieldUsed);
                let delay = self.mismatch_delay(t.state());
                t.schedule_mismatch(delay);
            }
            GameDomainEvent::GameWon => {
                t.effect(GameEffect::PlayFlipSound);
                t.effect(GameEffect::VibrateMatch);
                t.effect(GameEffect::PlayMatchSound);
                t.stop_timer();
                t.transition(|s| apply_final_bonuses(s, inner.time));
                let final_state = t.state().clone();
                t.effect(GameEffect::EarnCurrency(i64::from(
                    final_state.score_breakdown.earned_currency,
                )));
                t.effect(GameEffect::PlayWinSound);
                t.effect(GameEffect::VibrateMatch);
                t.effect(GameEffect::GameWon(Box::new(final_state)));
            }
            GameDomainEvent::GameOver => {
                t.effect(GameEffect::PlayFlipSound);
                t.stop_timer();
                t.effect(GameEffect::PlayLoseSound);
                t.effect(GameEffect::GameOver);
            }
        }
        Some(t)
    }

    fn double_down(&self, inner: &Inner) -> Option<Transition> {
        let activated = activate_double_down(inner.state.clone());
        if activated == inner.state {
            debug!("double down ignored: not eligible");
            return None;
        }
        let mut t = Transition::new(activated, inner.time);
        t.effect(GameEffect::VibrateHeat);
        t.follow_up(GameAction::ScanCards(self.config.double_down_scan_ms));
        Some(t)
    }

    fn scan_cards(self: &Arc<Self>, inner: &mut Inner, duration_ms: u64) {
        self.scan_task.cancel();
        let weak = Arc::downgrade(self);
        let task = self.scope.spawn(async move {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
            if let Some(shared) = weak.upgrade() {
                shared.end_scan();
            }
        });
        if task.is_none() {
            return;
        }
        self.scan_task.replace(task);
        inner.peek_active = true;
        self.publish_view(inner);
        debug!(duration_ms, "scan started");
    }

    fn end_scan(&self) {
        let mut inner = self.inner.lock();
        if inner.peek_active {
            inner.peek_active = false;
            self.publish_view(&inner);
            debug!("scan ended");
        }
    }

    fn process_mismatch(&self, inner: &Inner) -> Transition {
        let mut t = Transition::new(inner.state.clone(), inner.time);
        let state = &inner.state;

        if state.mode == GameMode::TimeAttack {
            let penalty = state.config.time_attack_mismatch_penalty;
            let next = apply_mismatch_penalty(inner.time, &state.config);
            t.set_time(next);
            t.effect(GameEffect::TimerUpdate(next));
            t.effect(GameEffect::TimeLoss(penalty));
            if next <= 0 {
                expire(&mut t);
                return t;
            }
        }

        t.transition(reset_unmatched_cards);
        t
    }

    fn tick(&self, inner: &Inner) -> Transition {
        let mut t = Transition::new(inner.state.clone(), inner.time);

        if inner.state.mode == GameMode::TimeAttack {
            let next = (inner.time - 1).max(0);
            t.set_time(next);
            t.effect(GameEffect::TimerUpdate(next));
            if next <= 0 {
                expire(&mut t);
            } else if next <= LOW_TIME_WARNING_SECONDS {
                t.effect(GameEffect::VibrateTick);
            }
        } else {
            let next = inner.time.saturating_add(1);
            t.set_time(next);
            t.effect(GameEffect::TimerUpdate(next));
        }
        t
    }
}

/// Time Attack clock ran out
fn expire(t: &mut Transition) {
    t.stop_timer();
    t.effect(GameEffect::VibrateWarning);
    t.effect(GameEffect::PlayLoseSound);
    t.update(|s| {
        s.is_game_over = true;
        s.is_game_won = false;
        s.score = 0;
    });
    t.effect(GameEffect::GameOver);
}

/// Face-up mismatched or half-evaluated cards that need a `ProcessMismatch`
fn has_unresolved_cards(state: &GameState) -> bool {
    state.has_error_cards() || state.is_evaluation_pending()
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_match_core::types::{CardState, Rank, ScoringConfig, Suit};

    fn board(mode: GameMode) -> GameState {
        let cards = vec![
            CardState::new(0, Suit::Hearts, Rank::Ace),
            CardState::new(1, Suit::Clubs, Rank::Two),
            CardState::new(2, Suit::Hearts, Rank::Ace),
            CardState::new(3, Suit::Clubs, Rank::Two),
        ];
        let mut state = GameState::new(cards, 2, ScoringConfig::default());
        state.mode = mode;
        state
    }

    fn no_save(_: &GameState, _: i64) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_requires_runtime() {
        let result = GameStateMachine::new(board(GameMode::Standard), 0, no_save);
        assert!(matches!(result, Err(RuntimeError::NoRuntime)));
    }

    #[tokio::test]
    #[should_panic(expected = "initial time cannot be negative")]
    async fn test_negative_initial_time_panics() {
        let _ = GameStateMachine::new(board(GameMode::Standard), -1, no_save);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopwatch_counts_up() {
        let machine = GameStateMachine::new(board(GameMode::Standard), 0, no_save).unwrap();
        machine.dispatch(GameAction::StartGame(None));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(machine.elapsed_seconds(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_comment() {
        let machine = GameStateMachine::new(board(GameMode::Standard), 0, no_save).unwrap();
        machine.dispatch(GameAction::FlipCard(0));
        machine.dispatch(GameAction::FlipCard(2));
        assert!(machine.state().match_comment.is_some());
        machine.dispatch(GameAction::ClearComment);
        assert!(machine.state().match_comment.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_time_clamps() {
        let machine = GameStateMachine::new(board(GameMode::TimeAttack), 10, no_save).unwrap();
        let mut effects = machine.subscribe_effects();
        machine.dispatch(GameAction::AddTime(15));
        assert_eq!(machine.elapsed_seconds(), 25);
        machine.dispatch(GameAction::AddTime(-100));
        assert_eq!(machine.elapsed_seconds(), 0);
        assert_eq!(effects.try_recv().unwrap(), GameEffect::TimerUpdate(25));
        assert_eq!(effects.try_recv().unwrap(), GameEffect::TimerUpdate(0));
    }
}
