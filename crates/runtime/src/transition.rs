//! Transition builder
//!
//! Action handlers describe what should happen instead of doing it: the next
//! board, the next timer value, the effects to publish and the follow-up work.
//! The state machine then commits a [`Transition`] in one step, so effects
//! always go out after the state they describe.

use memory_match_core::GameState;

use crate::actions::GameAction;
use crate::effects::GameEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Stop,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub(crate) state: GameState,
    pub(crate) time: i64,
    pub(crate) effects: Vec<GameEffect>,
    pub(crate) timer: Option<TimerCommand>,
    /// Delay before `ProcessMismatch` runs
    pub(crate) mismatch_delay_ms: Option<u64>,
    pub(crate) follow_ups: Vec<GameAction>,
    /// Save without debounce even if no move was made
    pub(crate) urgent: bool,
}

impl Transition {
    pub fn new(state: GameState, time: i64) -> Self {
        Self {
            state,
            time,
            effects: Vec::new(),
            timer: None,
            mismatch_delay_ms: None,
            follow_ups: Vec::new(),
            urgent: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn time(&self) -> i64 {
        self.time
    }

    pub fn effects(&self) -> &[GameEffect] {
        &self.effects
    }

    pub fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    /// Replace the board with `f(board)`
    pub fn transition<F>(&mut self, f: F)
    where
        F: FnOnce(GameState) -> GameState,
    {
        self.state = f(self.state.clone());
    }

    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut GameState),
    {
        f(&mut self.state);
    }

    pub fn set_time(&mut self, seconds: i64) {
        self.time = seconds;
    }

    pub fn effect(&mut self, effect: GameEffect) {
        self.effects.push(effect);
    }

    pub fn start_timer(&mut self) {
        self.timer = Some(TimerCommand::Start);
    }

    pub fn stop_timer(&mut self) {
        self.timer = Some(TimerCommand::Stop);
    }

    pub fn schedule_mismatch(&mut self, delay_ms: u64) {
        self.mismatch_delay_ms = Some(delay_ms);
    }

    pub fn persist_now(&mut self) {
        self.urgent = true;
    }

    /// Dispatch `action` once this transition is committed
    pub fn follow_up(&mut self, action: GameAction) {
        self.follow_ups.push(action);
    }
}
