//! Debouncing of workspace refreshes during rapid typing
//!
//! Every open document is re-analyzed on each refresh, so changes to any document share
//! one timer. A new change restarts it; when it fires the callback receives every uri
//! changed since the last run.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tower_lsp::lsp_types::Url;

const DEFAULT_DEBOUNCE_DELAY_MS: u64 = 300;

#[derive(Default)]
struct Pending {
    uris: BTreeSet<Url>,
    timer: Option<Arc<Notify>>,
}

pub struct Debouncer {
    delay: Duration,
    pending: Arc<Mutex<Pending>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(DEFAULT_DEBOUNCE_DELAY_MS))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn schedule<F, Fut>(&self, uri: Url, callback: F)
    where
        F: FnOnce(Vec<Url>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let timer = Arc::new(Notify::new());
        {
            let mut pending = self.pending.lock();
            pending.uris.insert(uri);
            if let Some(previous) = pending.timer.replace(Arc::clone(&timer)) {
                previous.notify_one();
            }
        }

        let pending = Arc::clone(&self.pending);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    let changed: Vec<Url> = {
                        let mut pending = pending.lock();
                        // A later schedule replaced this timer after the sleep finished.
                        if !pending.timer.as_ref().is_some_and(|current| Arc::ptr_eq(current, &timer)) {
                            return;
                        }
                        pending.timer = None;
                        std::mem::take(&mut pending.uris).into_iter().collect()
                    };
                    callback(changed).await;
                }
                _ = timer.notified() => {}
            }
        });
    }

    /// Forgets `uri`; the pending refresh is dropped once no changed uri remains.
    pub fn cancel(&self, uri: &Url) {
        let mut pending = self.pending.lock();
        pending.uris.remove(uri);
        if pending.uris.is_empty() {
            if let Some(timer) = pending.timer.take() {
                timer.notify_one();
            }
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.lock().timer.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
