//! Cancellable UI pacing timers.
//!
//! Every delayed transition the orchestrator performs goes through one
//! `DisposalSet`. Disposing it cancels awaited delays and aborts scheduled
//! callbacks in one step, so nothing touches chat state afterwards.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// The owning component was torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("disposed")]
pub struct Disposed;

pub struct DisposalSet {
    disposed: watch::Sender<bool>,
    pending: Mutex<Vec<AbortHandle>>,
}

impl DisposalSet {
    pub fn new() -> Self {
        let (disposed, _) = watch::channel(false);
        Self {
            disposed,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn is_disposed(&self) -> bool {
        *self.disposed.borrow()
    }

    /// Run `fut` unless the set is disposed first.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, Disposed> {
        if self.is_disposed() {
            return Err(Disposed);
        }
        let cancelled = wait_disposed(self.disposed.subscribe());
        tokio::select! {
            biased;
            _ = cancelled => Err(Disposed),
            out = fut => Ok(out),
        }
    }

    /// Sleep for `duration`, returning early with `Disposed` on teardown.
    pub async fn delay(&self, duration: Duration) -> Result<(), Disposed> {
        self.guard(tokio::time::sleep(duration)).await
    }

    /// Run `callback` after `after` unless disposed in the meantime.
    pub fn schedule<F>(&self, after: Duration, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.is_disposed() {
            return;
        }
        let cancelled = wait_disposed(self.disposed.subscribe());
        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled => {}
                _ = tokio::time::sleep(after) => callback(),
            }
        });

        let mut pending = self.lock_pending();
        pending.retain(|h| !h.is_finished());
        pending.push(task.abort_handle());
    }

    /// Scheduled callbacks that have not run yet.
    pub fn pending(&self) -> usize {
        self.lock_pending().iter().filter(|h| !h.is_finished()).count()
    }

    /// Abort scheduled callbacks that have not fired. The set stays usable.
    pub fn cancel_pending(&self) {
        for handle in self.lock_pending().drain(..) {
            handle.abort();
        }
    }

    /// Cancel everything. Idempotent.
    pub fn dispose(&self) {
        self.disposed.send_replace(true);
        self.cancel_pending();
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Vec<AbortHandle>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for DisposalSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DisposalSet {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Resolves once the flag flips to true or the sender is gone.
async fn wait_disposed(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_delay_completes() {
        let set = DisposalSet::new();
        assert_eq!(set.delay(Duration::from_millis(100)).await, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_interrupts_delay() {
        let set = Arc::new(DisposalSet::new());
        let s = set.clone();
        let waiter = tokio::spawn(async move { s.delay(Duration::from_secs(60)).await });

        tokio::task::yield_now().await;
        set.dispose();
        assert_eq!(waiter.await.unwrap(), Err(Disposed));
    }

    #[tokio::test]
    async fn test_disposed_set_rejects_new_work() {
        let set = DisposalSet::new();
        set.dispose();
        assert_eq!(set.guard(async { 1 }).await, Err(Disposed));

        let fired = Arc::new(AtomicBool::new(false));
        let f = fired.clone();
        set.schedule(Duration::ZERO, move || f.store(true, Ordering::SeqCst));
        assert_eq!(set.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduled_callback_runs() {
        let set = DisposalSet::new();
        let fired = Arc::new(AtomicBool::new(false));
        let f = fired.clone();
        set.schedule(Duration::from_millis(500), move || f.store(true, Ordering::SeqCst));
        assert_eq!(set.pending(), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(set.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_scheduled_callback() {
        let set = DisposalSet::new();
        let fired = Arc::new(AtomicBool::new(false));
        let f = fired.clone();
        set.schedule(Duration::from_millis(500), move || f.store(true, Ordering::SeqCst));

        set.dispose();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_pending_keeps_set_usable() {
        let set = DisposalSet::new();
        let stale = Arc::new(AtomicBool::new(false));
        let s = stale.clone();
        set.schedule(Duration::from_millis(500), move || s.store(true, Ordering::SeqCst));

        set.cancel_pending();
        assert_eq!(set.pending(), 0);
        assert!(!set.is_disposed());

        let fresh = Arc::new(AtomicBool::new(false));
        let f = fresh.clone();
        set.schedule(Duration::from_millis(100), move || f.store(true, Ordering::SeqCst));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!stale.load(Ordering::SeqCst));
        assert!(fresh.load(Ordering::SeqCst));
    }
}
