//! Trailing-edge debouncer for the search box.

use std::{future::Future, time::Duration};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::trace;

/// Collapses bursts of calls into a single trailing call.
///
/// Every [`schedule`](Self::schedule) restarts the quiet interval and drops
/// whatever was pending before it. Once the interval elapses the action is
/// spawned as its own task, so later calls can no longer abort it.
///
/// Requires a running tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: Mutex::new(None) }
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    pub fn schedule<T, F, Fut>(&self, input: T, action: F)
    where
        T: Send + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let quiet = self.quiet;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            tokio::spawn(action(input));
        });

        if let Some(previous) = self.pending.lock().replace(timer) {
            trace!("superseding pending debounced call");
            previous.abort();
        }
    }

    /// Drop the pending call, if any. Actions already fired keep running.
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.lock().as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
