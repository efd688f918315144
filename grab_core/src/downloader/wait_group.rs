use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

struct Inner {
    pending: AtomicUsize,
    notify: Notify,
}

/// Completion counter for a fixed number of units.
///
/// Starts at `count`; every unit calls [`WaitGroup::done`] once (or drops a
/// [`WaitGuard`]). [`WaitGroup::wait`] resolves once the counter hits zero.
/// Only completion is tracked, never outcome.
#[derive(Clone)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                pending: AtomicUsize::new(count),
                notify: Notify::new(),
            }),
        }
    }

    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::Acquire)
    }

    /// Returns a guard that marks one unit finished when dropped, including
    /// when the unit panics.
    pub fn guard(&self) -> WaitGuard {
        WaitGuard {
            group: self.clone(),
        }
    }

    /// Marks one unit finished. Returns `true` for the call that drained the
    /// group. Extra calls past zero are ignored.
    pub fn done(&self) -> bool {
        let previous = self
            .inner
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        match previous {
            Ok(1) => {
                self.inner.notify.notify_waiters();
                true
            }
            Ok(_) => false,
            Err(_) => {
                log::warn!("[wait_group] done() called on a drained group");
                false
            }
        }
    }

    /// Waits until every unit has called `done`.
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent notify_waiters is not lost.
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

pub struct WaitGuard {
    group: WaitGroup,
}

impl Drop for WaitGuard {
    fn drop(&mut self) {
        self.group.done();
    }
}
