//! Persistence contract
//!
//! The runtime never stores anything itself. It hands `(state, seconds)`
//! pairs to a [`SaveHandler`]; a failed save is logged and the next save
//! catches up.

use memory_match_core::GameState;

/// Host storage for game snapshots
///
/// Called from whichever thread issued the write: the dispatching caller for
/// high-priority saves and flushes, a runtime worker for debounced ones. No
/// machine lock is held during the call, so a saver may read
/// `GameStateMachine::state` or `elapsed_seconds`. Writes are serialized, and
/// a saver that dispatches actions or flushes from inside `save` deadlocks on
/// that serialization.
pub trait SaveHandler: Send + Sync {
    fn save(&self, state: &GameState, elapsed_seconds: i64) -> anyhow::Result<()>;
}

impl<F> SaveHandler for F
where
    F: Fn(&GameState, i64) -> anyhow::Result<()> + Send + Sync,
{
    fn save(&self, state: &GameState, elapsed_seconds: i64) -> anyhow::Result<()> {
        self(state, elapsed_seconds)
    }
}

/// How urgently a state change must reach storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Debounced; only the latest request in a window is written
    Normal,
    /// Written immediately
    High,
}
