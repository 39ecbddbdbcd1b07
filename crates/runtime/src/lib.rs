//! Async runtime for memory-match games
//!
//! Wraps the pure rules in [`memory_match_core`] with everything that needs a
//! clock: the game timer, delayed mismatch resolution, Double Down scans,
//! effect broadcasting and debounced persistence.
//!
//! # Module Structure
//!
//! - [`machine`]: `GameStateMachine`, the single owner of a running game
//! - [`transition`]: builder that action handlers return to the machine
//! - [`sync`]: priority-aware, debounced save pipeline
//! - [`timer`]: repeating game clock tick
//! - [`scope`]: cancellable task slots
//! - [`effects`]: broadcast of sounds, haptics and timer cues
//! - [`config`]: timing knobs from the environment
//!
//! # Example
//!
//! ```no_run
//! use memory_match_runtime::{GameAction, GameStateMachine};
//! use memory_match_runtime::core::{new_game, GameOptions, GameState};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let board = new_game(GameOptions::default(), 0)?;
//! let machine = GameStateMachine::new(board, 0, |state: &GameState, secs: i64| -> anyhow::Result<()> {
//!     println!("saving {} moves at {secs}s", state.moves);
//!     Ok(())
//! })?;
//!
//! machine.dispatch(GameAction::StartGame(None));
//! machine.dispatch(GameAction::FlipCard(0));
//! machine.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod clock;
pub mod config;
pub mod effects;
pub mod error;
pub mod machine;
pub mod persist;
pub mod scope;
pub mod sync;
pub mod timer;
pub mod transition;

pub use memory_match_core as core;
pub use memory_match_types as types;

pub use actions::GameAction;
pub use clock::{Clock, ManualClock, TokioClock};
pub use config::RuntimeConfig;
pub use effects::{EffectSink, GameEffect};
pub use error::RuntimeError;
pub use machine::{GameStateMachine, MachineOptions};
pub use persist::{Priority, SaveHandler};
pub use scope::{TaskScope, TaskSlot};
pub use sync::{StateSyncManager, SyncRequest};
pub use timer::GameTimer;
pub use transition::{TimerCommand, Transition};
