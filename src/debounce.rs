//! A restartable one-shot timer over tokio.
//!
//! `schedule` (re)arms the timer; when it expires the action runs once.
//! Rearming before expiry drops the earlier schedule, so a burst of calls
//! results in a single run `delay` after the last one.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Boxed future returned by a debounced action.
pub type ActionFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

type Action = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

#[derive(Default)]
struct Pending {
    /// Bumped by every `schedule` and `cancel_pending`.
    generation: u64,
    /// The armed timer, until it expires.
    handle: Option<JoinHandle<()>>,
}

/// Coalesces bursts of requests into one delayed run of an action.
pub struct DebouncedTask {
    delay: Duration,
    action: Action,
    pending: Arc<Mutex<Pending>>,
}

impl DebouncedTask {
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: Fn() -> ActionFuture + Send + Sync + 'static,
    {
        Self {
            delay,
            action: Arc::new(action),
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or rearm) the timer.  Must be called inside a tokio runtime.
    ///
    /// Once the timer has expired and the action started, a new
    /// `schedule` no longer affects that run; it arms a fresh timer.
    pub fn schedule(&self) {
        let mut pending = self.pending.lock();
        pending.generation = pending.generation.wrapping_add(1);
        let generation = pending.generation;
        if let Some(handle) = pending.handle.take() {
            handle.abort();
        }

        let delay = self.delay;
        let action = Arc::clone(&self.action);
        let shared = Arc::clone(&self.pending);
        pending.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut pending = shared.lock();
                if pending.generation != generation {
                    return;
                }
                pending.handle = None;
            }
            action().await;
        }));
    }

    /// Disarm the timer without running the action.
    ///
    /// Returns whether a timer was armed.
    pub fn cancel_pending(&self) -> bool {
        let mut pending = self.pending.lock();
        pending.generation = pending.generation.wrapping_add(1);
        match pending.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Disarm the timer and run the action now, on the caller's task.
    pub async fn fire_now(&self) {
        self.cancel_pending();
        (self.action)().await;
    }

    /// Whether a timer is armed and has not yet expired.
    pub fn is_pending(&self) -> bool {
        self.pending.lock().handle.is_some()
    }
}

impl Drop for DebouncedTask {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl std::fmt::Debug for DebouncedTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedTask")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}
