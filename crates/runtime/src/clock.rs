//! Millisecond time sources
//!
//! The sync manager stamps requests with [`Clock::now_millis`]. Production
//! code uses [`TokioClock`], which follows tokio's (pausable) clock; tests can
//! drive a [`ManualClock`] by hand.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::time::Instant;

pub trait Clock: Send + Sync {
    /// Monotonic milliseconds since an arbitrary origin
    fn now_millis(&self) -> u64;
}

/// Monotonic clock backed by `tokio::time::Instant`
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
