//! State sync manager - priority-aware, debounced persistence
//!
//! - **High** priority requests are written immediately on the caller's path.
//! - **Normal** priority requests go into a single "latest wins" slot that a
//!   background task samples once per debounce interval.
//! - [`StateSyncManager::flush`] writes right away and discards the slot.
//!
//! Every request is stamped with `(clock millis, sequence)` when it is made.
//! A write whose stamp is older than the last processed stamp is dropped, so a
//! slow debounced write can never overwrite a newer high-priority one. A write
//! identical to the last successful save is skipped.
//!
//! The slot has its own short lock. Normal requests only swap it and never wait
//! on a save in flight. Writes are serialized by a second lock that covers the
//! stamp check and the save callback; the sampler takes the slot before it
//! acquires that lock.
//!
//! Callers that need ordering against their own state lock can stamp with
//! [`StateSyncManager::request`] while holding it, release it, and then hand
//! the request to [`StateSyncManager::submit`] or
//! [`StateSyncManager::flush_request`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use memory_match_core::GameState;

use crate::clock::Clock;
use crate::persist::{Priority, SaveHandler};
use crate::scope::{TaskScope, TaskSlot};

/// Request ordering key; the sequence breaks same-millisecond ties
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Stamp {
    at_ms: u64,
    seq: u64,
}

/// A stamped snapshot waiting to be written
#[derive(Debug)]
pub struct SyncRequest {
    state: GameState,
    elapsed_seconds: i64,
    stamp: Stamp,
}

#[derive(Debug, Default)]
struct WriteLog {
    last_saved: Option<(GameState, i64)>,
    last_processed: Option<Stamp>,
}

struct SyncShared {
    saver: Arc<dyn SaveHandler>,
    clock: Arc<dyn Clock>,
    seq: AtomicU64,
    pending: Mutex<Option<SyncRequest>>,
    written: Mutex<WriteLog>,
}

impl SyncShared {
    fn stamp(&self) -> Stamp {
        Stamp {
            at_ms: self.clock.now_millis(),
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
        }
    }

    /// Write one request; true when the saver was called and succeeded
    fn write(&self, request: SyncRequest) -> bool {
        let mut log = self.written.lock();
        if log.last_processed.is_some_and(|last| request.stamp < last) {
            debug!(stamp = ?request.stamp, "dropping stale save request");
            return false;
        }
        log.last_processed = Some(request.stamp);

        let unchanged = log
            .last_saved
            .as_ref()
            .is_some_and(|(state, secs)| *secs == request.elapsed_seconds && *state == request.state);
        if unchanged {
            trace!("state unchanged since last save");
            return false;
        }

        match self.saver.save(&request.state, request.elapsed_seconds) {
            Ok(()) => {
                log.last_saved = Some((request.state, request.elapsed_seconds));
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to save game state");
                false
            }
        }
    }

    fn save_pending(&self) {
        let request = self.pending.lock().take();
        if let Some(request) = request {
            self.write(request);
        }
    }
}

pub struct StateSyncManager {
    shared: Arc<SyncShared>,
    sampler: TaskSlot,
}

impl StateSyncManager {
    /// Create the manager and start its sampling task on `scope`
    pub fn new<S>(saver: S, clock: Arc<dyn Clock>, debounce_ms: u64, scope: &TaskScope) -> Self
    where
        S: SaveHandler + 'static,
    {
        Self::with_handler(Arc::new(saver), clock, debounce_ms, scope)
    }

    pub fn with_handler(
        saver: Arc<dyn SaveHandler>,
        clock: Arc<dyn Clock>,
        debounce_ms: u64,
        scope: &TaskScope,
    ) -> Self {
        let shared = Arc::new(SyncShared {
            saver,
            clock,
            seq: AtomicU64::new(0),
            pending: Mutex::new(None),
            written: Mutex::new(WriteLog::default()),
        });

        let sampler = TaskSlot::new();
        sampler.replace(scope.spawn(run_sampler(
            Arc::downgrade(&shared),
            Duration::from_millis(debounce_ms.max(1)),
        )));

        Self { shared, sampler }
    }

    /// Stamp a snapshot now without writing it
    pub fn request(&self, state: &GameState, elapsed_seconds: i64) -> SyncRequest {
        SyncRequest {
            state: state.clone(),
            elapsed_seconds,
            stamp: self.shared.stamp(),
        }
    }

    /// Request a save of `(state, elapsed_seconds)`
    pub fn sync(&self, state: &GameState, elapsed_seconds: i64, priority: Priority) {
        self.submit(self.request(state, elapsed_seconds), priority);
    }

    /// Hand over a request stamped earlier with [`Self::request`]
    pub fn submit(&self, request: SyncRequest, priority: Priority) {
        match priority {
            Priority::High => {
                self.shared.write(request);
            }
            Priority::Normal => {
                let mut pending = self.shared.pending.lock();
                if pending.as_ref().is_some_and(|p| p.stamp > request.stamp) {
                    trace!("newer request already pending");
                    return;
                }
                *pending = Some(request);
            }
        }
    }

    /// Save now, superseding any pending debounced request
    ///
    /// Returns true when the save callback was invoked successfully.
    pub fn flush(&self, state: &GameState, elapsed_seconds: i64) -> bool {
        self.flush_request(self.request(state, elapsed_seconds))
    }

    /// [`Self::flush`] for a request stamped earlier
    pub fn flush_request(&self, request: SyncRequest) -> bool {
        {
            let mut pending = self.shared.pending.lock();
            if pending.as_ref().is_some_and(|p| p.stamp <= request.stamp) {
                *pending = None;
            }
        }
        self.shared.write(request)
    }

    pub fn has_pending(&self) -> bool {
        self.shared.pending.lock().is_some()
    }

    /// Write whatever is pending and stop sampling
    pub fn shutdown(&self) {
        self.shared.save_pending();
        self.sampler.cancel();
    }
}

impl std::fmt::Debug for StateSyncManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSyncManager")
            .field("pending", &self.has_pending())
            .finish()
    }
}

async fn run_sampler(shared: Weak<SyncShared>, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        shared.save_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    type Saved = Arc<Mutex<Vec<i64>>>;

    fn recorder() -> (Saved, impl Fn(&GameState, i64) -> anyhow::Result<()> + Send + Sync) {
        let saved: Saved = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&saved);
        (saved, move |_: &GameState, secs: i64| -> anyhow::Result<()> {
            sink.lock().push(secs);
            Ok(())
        })
    }

    fn state() -> GameState {
        GameState::new(Vec::new(), 1, Default::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_millisecond_requests_keep_order() {
        let clock = Arc::new(ManualClock::new(0));
        let (saved, saver) = recorder();
        let manager = StateSyncManager::new(saver, clock, 2000, &TaskScope::current().unwrap());

        manager.sync(&state(), 1, Priority::Normal);
        manager.sync(&state(), 2, Priority::High);
        // same clock value as the pending normal request, but that one is older
        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(*saved.lock(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_save_is_skipped() {
        let clock = Arc::new(ManualClock::new(0));
        let (saved, saver) = recorder();
        let manager = StateSyncManager::new(saver, clock, 2000, &TaskScope::current().unwrap());

        manager.sync(&state(), 5, Priority::High);
        manager.sync(&state(), 5, Priority::High);
        assert!(!manager.flush(&state(), 5));
        assert_eq!(*saved.lock(), vec![5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_retried() {
        let clock = Arc::new(ManualClock::new(0));
        let attempts = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&attempts);
        let saver = move |_: &GameState, _: i64| -> anyhow::Result<()> {
            let mut n = counter.lock();
            *n += 1;
            if *n == 1 {
                anyhow::bail!("disk full");
            }
            Ok(())
        };
        let manager = StateSyncManager::new(saver, clock, 2000, &TaskScope::current().unwrap());

        manager.sync(&state(), 1, Priority::High);
        assert!(manager.flush(&state(), 1));
        assert_eq!(*attempts.lock(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_saves_pending_and_stops() {
        let clock = Arc::new(ManualClock::new(0));
        let (saved, saver) = recorder();
        let manager = StateSyncManager::new(saver, clock, 2000, &TaskScope::current().unwrap());

        manager.sync(&state(), 9, Priority::Normal);
        manager.shutdown();
        assert_eq!(*saved.lock(), vec![9]);

        manager.sync(&state(), 10, Priority::Normal);
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(*saved.lock(), vec![9]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_submission_keeps_newer_pending() {
        let clock = Arc::new(ManualClock::new(0));
        let (saved, saver) = recorder();
        let manager = StateSyncManager::new(saver, clock, 2000, &TaskScope::current().unwrap());

        let older = manager.request(&state(), 1);
        let newer = manager.request(&state(), 2);
        manager.submit(newer, Priority::Normal);
        manager.submit(older, Priority::Normal);
        manager.shutdown();
        assert_eq!(*saved.lock(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_keeps_newer_pending() {
        let clock = Arc::new(ManualClock::new(0));
        let (saved, saver) = recorder();
        let manager = StateSyncManager::new(saver, clock, 2000, &TaskScope::current().unwrap());

        let outgoing = manager.request(&state(), 1);
        manager.sync(&state(), 2, Priority::Normal);
        assert!(manager.flush_request(outgoing));
        assert!(manager.has_pending());
        manager.shutdown();
        assert_eq!(*saved.lock(), vec![1, 2]);
    }
}
