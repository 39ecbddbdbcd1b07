use thiserror::Error;

/// Errors raised while wiring up the runtime
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Constructed outside a tokio runtime
    #[error("no tokio runtime is available on this thread")]
    NoRuntime,
    #[error("invalid runtime setting {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },
}
