//! Single-slot debounced coalescer.
//!
//! A [`Debouncer`] collapses a burst of [`trigger`](Debouncer::trigger)
//! calls into one execution of its action, a fixed delay after the first
//! call of the burst. While a fire is pending, further triggers are dropped
//! outright; the pending delay is never reset or extended. This is the
//! backpressure mechanism for everything event-shaped in the shell: excess
//! trigger volume is shed instead of queued.
//!
//! The pending slot is cleared before the action runs, so a trigger that
//! arrives while the action executes schedules a fresh delay instead of
//! being swallowed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type PendingSlot = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Runs an action at most once per debounce window.
pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    action: Arc<dyn Fn() + Send + Sync>,
    pending: PendingSlot,
}

impl Debouncer {
    /// Creates a debouncer around `action`.
    ///
    /// Must be called from within a tokio runtime; the timer tasks are
    /// spawned on the runtime that is current at construction, which lets
    /// [`trigger`](Self::trigger) be called from any thread later (the
    /// filesystem watcher triggers from a non-runtime thread).
    pub fn new(delay: Duration, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            delay,
            runtime: Handle::current(),
            action: Arc::new(action),
            pending: Arc::new(Mutex::new(None)),
        }
    }

    /// Schedules the action to run after the delay, unless one is already
    /// pending, in which case this call is a no-op.
    pub fn trigger(&self) {
        let mut slot = self.pending.lock();
        if slot.is_some() {
            return;
        }

        let delay = self.delay;
        let action = Arc::clone(&self.action);
        let pending = Arc::clone(&self.pending);
        // The spawned task cannot reach the slot until the guard drops, so
        // the handle is always stored before it could be taken back out.
        *slot = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            pending.lock().take();
            action();
        }));
    }

    /// Aborts a pending fire, if any. A cancelled timer never runs the
    /// action.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }

    /// Whether a fire is currently scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool { self.pending.lock().is_some() }
}

impl Drop for Debouncer {
    fn drop(&mut self) { self.cancel() }
}

impl fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting(delay_ms: u64) -> (Debouncer, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let debouncer = Debouncer::new(Duration::from_millis(delay_ms), move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        (debouncer, count)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_one_execution() {
        let (debouncer, count) = counting(50);

        debouncer.trigger();
        debouncer.trigger();
        debouncer.trigger();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_runs_from_the_first_trigger() {
        let (debouncer, count) = counting(50);

        debouncer.trigger();
        tokio::time::sleep(Duration::from_millis(30)).await;

        // A second trigger inside the window neither fires nor extends.
        debouncer.trigger();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn triggers_after_fire_schedule_again() {
        let (debouncer, count) = counting(50);

        debouncer.trigger();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());

        debouncer.trigger();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_the_fire() {
        let (debouncer, count) = counting(50);

        debouncer.trigger();
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_without_pending_is_a_no_op() {
        let (debouncer, count) = counting(50);

        debouncer.cancel();
        debouncer.trigger();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_flag_tracks_the_slot() {
        let (debouncer, _count) = counting(50);

        assert!(!debouncer.is_pending());
        debouncer.trigger();
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!debouncer.is_pending());
    }
}
