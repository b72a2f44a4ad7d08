//! Deferred work.
//!
//! Inventory writes that happen while the host is still processing a death
//! must wait until the event has finished ("next tick"). The runtime never
//! sleeps itself; it hands closures to a [`TaskScheduler`].

use std::time::Duration;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// One server tick.
pub const TICK: Duration = Duration::from_millis(50);

pub trait TaskScheduler: Send + Sync {
    /// Runs `task` once after `delay`.
    fn run_later(&self, delay: Duration, task: Task);
}

/// Scheduler backed by tokio timers.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Scheduler on the runtime of the calling task.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl TaskScheduler for TokioScheduler {
    fn run_later(&self, delay: Duration, task: Task) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}
