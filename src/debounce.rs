// Trailing-edge debounce for search-as-you-type inputs (blog search)

use std::{future::Future, sync::Mutex, time::Duration};
use tokio::task::JoinHandle;

pub const BLOG_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Runs only the last scheduled action, once `delay` has passed without a newer call.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer { delay, pending: Mutex::new(None) }
    }

    /// Cancels any pending action and restarts the timer for `action`.
    pub fn call<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = pending.replace(task) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
