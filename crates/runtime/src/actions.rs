use memory_match_core::GameState;

/// Inputs accepted by [`GameStateMachine::dispatch`](crate::GameStateMachine::dispatch)
#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    /// Start the clock, optionally adopting a saved board first
    StartGame(Option<Box<GameState>>),
    FlipCard(u32),
    DoubleDown,
    /// Reveal every unmatched card for the given milliseconds
    ScanCards(u64),
    /// Resolve a shown mismatch
    ProcessMismatch,
    Tick,
    ClearComment,
    /// Add (or remove) seconds on the game clock
    AddTime(i64),
    /// Handled by the host, which builds a new machine
    Restart,
}

impl GameAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::StartGame(_) => "startGame",
            GameAction::FlipCard(_) => "flipCard",
            GameAction::DoubleDown => "doubleDown",
            GameAction::ScanCards(_) => "scanCards",
            GameAction::ProcessMismatch => "processMismatch",
            GameAction::Tick => "tick",
            GameAction::ClearComment => "clearComment",
            GameAction::AddTime(_) => "addTime",
            GameAction::Restart => "restart",
        }
    }
}
