//! Game timer - a repeating tick on its own task

use std::sync::Arc;
use std::time::Duration;

use crate::scope::{TaskScope, TaskSlot};

/// Calls `on_tick` once per interval between `start` and `stop`
pub struct GameTimer {
    scope: TaskScope,
    interval: Duration,
    on_tick: Arc<dyn Fn() + Send + Sync>,
    task: TaskSlot,
}

impl GameTimer {
    pub fn new<F>(scope: TaskScope, interval_ms: u64, on_tick: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            scope,
            interval: Duration::from_millis(interval_ms.max(1)),
            on_tick: Arc::new(on_tick),
            task: TaskSlot::new(),
        }
    }

    /// (Re)start ticking; a running loop is cancelled first
    pub fn start(&self) {
        self.stop();
        let on_tick = Arc::clone(&self.on_tick);
        let interval = self.interval;
        self.task.replace(self.scope.spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                on_tick();
            }
        }));
    }

    pub fn stop(&self) {
        self.task.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.task.is_active()
    }
}

impl std::fmt::Debug for GameTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameTimer")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}
