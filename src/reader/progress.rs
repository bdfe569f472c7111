//! Debounced reading-progress persistence

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::gateway::ContentGateway;

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Action<T> = Arc<dyn Fn(T) -> BoxFuture + Send + Sync>;

/// Runs an action once values stop arriving for `quiet`.
///
/// Every `schedule` replaces the pending value and re-arms the timer. The
/// action itself is spawned detached, so re-arming never cancels a write
/// that has already started. Must be used inside a tokio runtime.
pub struct Debouncer<T: Send + 'static> {
    quiet: Duration,
    action: Action<T>,
    pending: Arc<Mutex<Option<T>>>,
    timer: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F, Fut>(quiet: Duration, action: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            quiet,
            action: Arc::new(move |value| -> BoxFuture { Box::pin(action(value)) }),
            pending: Arc::new(Mutex::new(None)),
            timer: None,
        }
    }

    pub fn schedule(&mut self, value: T) {
        *lock(&self.pending) = Some(value);
        self.abort_timer();

        let pending = Arc::clone(&self.pending);
        let action = Arc::clone(&self.action);
        let quiet = self.quiet;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let value = lock(&pending).take();
            if let Some(value) = value {
                tokio::spawn(action(value));
            }
        }));
    }

    /// Run the action now with the pending value, if any.
    pub async fn flush(&mut self) -> bool {
        self.abort_timer();
        let value = lock(&self.pending).take();
        match value {
            Some(value) => {
                (self.action)(value).await;
                true
            }
            None => false,
        }
    }

    /// Drop the pending value without running the action.
    pub fn cancel(&mut self) {
        self.abort_timer();
        lock(&self.pending).take();
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.abort_timer();
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Writes the reading position of one book back to the gateway.
///
/// Every recorded position gets a sequence number. A debounced write whose
/// number is no longer the latest is dropped before it reaches the gateway,
/// so a timer that fired just before teardown cannot replace the final
/// position with an older one.
pub struct ProgressPersister {
    debouncer: Debouncer<(u64, f64)>,
    latest: Arc<AtomicU64>,
    gateway: Arc<dyn ContentGateway>,
    user_id: String,
    book_id: String,
}

impl ProgressPersister {
    pub fn new(
        gateway: Arc<dyn ContentGateway>,
        user_id: &str,
        book_id: &str,
        quiet: Duration,
    ) -> Self {
        let latest = Arc::new(AtomicU64::new(0));
        let debouncer = {
            let gateway = Arc::clone(&gateway);
            let latest = Arc::clone(&latest);
            let user_id = user_id.to_string();
            let book_id = book_id.to_string();
            Debouncer::new(quiet, move |(seq, position)| {
                let gateway = Arc::clone(&gateway);
                let latest = Arc::clone(&latest);
                let user_id = user_id.clone();
                let book_id = book_id.clone();
                async move {
                    if latest.load(Ordering::SeqCst) != seq {
                        debug!("Dropping stale progress {:.4} for book {}", position, book_id);
                        return;
                    }
                    write_progress(gateway, user_id, book_id, position).await;
                }
            })
        };

        Self {
            debouncer,
            latest,
            gateway,
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
        }
    }

    /// Note a position change; the write happens after the quiet interval.
    pub fn record(&mut self, position: f64) {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.debouncer.schedule((seq, position));
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Final write on session teardown, whatever the timer state.
    pub async fn teardown(&mut self, position: f64) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.debouncer.cancel();
        write_progress(
            Arc::clone(&self.gateway),
            self.user_id.clone(),
            self.book_id.clone(),
            position,
        )
        .await;
    }
}

/// Failures are logged and swallowed; the next write supersedes this one.
async fn write_progress(
    gateway: Arc<dyn ContentGateway>,
    user_id: String,
    book_id: String,
    position: f64,
) {
    match gateway.update_progress(&user_id, &book_id, position).await {
        Ok(()) => debug!("Saved progress {:.4} for book {}", position, book_id),
        Err(e) => warn!("Error saving reading progress for {}: {}", book_id, e),
    }
}
