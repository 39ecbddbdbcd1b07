//! Task scope and cancellable task slots
//!
//! Every background job (timer loop, mismatch delay, scan reveal, save
//! sampler) lives in its own [`TaskSlot`]. Putting a new task in a slot
//! aborts the one it replaces, so each concern has at most one task running.
//! Tasks are spawned through a [`TaskScope`]; once the scope is closed no new
//! task starts.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::RuntimeError;

#[derive(Debug, Clone)]
pub struct TaskScope {
    handle: Handle,
    closed: Arc<AtomicBool>,
}

impl TaskScope {
    /// Scope on the runtime of the calling thread
    pub fn current() -> Result<Self, RuntimeError> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|_| RuntimeError::NoRuntime)
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawn a task, or return `None` if the scope is closed
    pub fn spawn<F>(&self, future: F) -> Option<JoinHandle<()>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_closed() {
            debug!("spawn skipped: scope closed");
            return None;
        }
        Some(self.handle.spawn(future))
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Holder for at most one running task
#[derive(Debug, Default)]
pub struct TaskSlot {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `task`, aborting whatever was there
    pub fn replace(&self, task: Option<JoinHandle<()>>) {
        let previous = std::mem::replace(&mut *self.task.lock(), task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        self.replace(None);
    }

    /// A task is stored and has not finished
    pub fn is_active(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}
