//! Expiry Timer
//!
//! Holds the single outstanding wake-up used to reap expired entries.
//! Arming a new deadline always cancels the previous one, so at most one
//! timer task exists per cache no matter how many expiry instants are
//! tracked.

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// One-shot wake-up slot.
#[derive(Debug, Default)]
pub struct ExpiryTimer {
    /// Instant the timer will fire at
    armed_at: Option<Instant>,
    /// Spawned sleeper task
    handle: Option<JoinHandle<()>>,
}

impl ExpiryTimer {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Arm ==
    /// Replaces any pending wake-up with one firing `on_fire` at `at`.
    ///
    /// An instant already in the past fires on the next tick.
    ///
    /// # Panics
    /// Panics if called outside of a `LocalSet`.
    pub fn arm<F>(&mut self, at: Instant, on_fire: F)
    where
        F: FnOnce() + 'static,
    {
        self.cancel();
        trace!(
            delay = ?at.saturating_duration_since(Instant::now()),
            "arming expiry timer"
        );

        self.handle = Some(tokio::task::spawn_local(async move {
            tokio::time::sleep_until(at).await;
            on_fire();
        }));
        self.armed_at = Some(at);
    }

    // == Cancel ==
    /// Aborts the pending wake-up, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.armed_at = None;
    }

    // == Fired ==
    /// Clears the slot from inside the firing callback.
    ///
    /// The running task is detached rather than aborted.
    pub fn fired(&mut self) {
        self.handle = None;
        self.armed_at = None;
    }

    pub fn armed_at(&self) -> Option<Instant> {
        self.armed_at
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;
    use tokio::task::LocalSet;

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_at_deadline() {
        LocalSet::new()
            .run_until(async {
                let fired = Rc::new(Cell::new(0));
                let mut timer = ExpiryTimer::new();

                let count = fired.clone();
                let at = Instant::now() + Duration::from_millis(10);
                timer.arm(at, move || count.set(count.get() + 1));

                assert!(timer.is_armed());
                assert_eq!(timer.armed_at(), Some(at));

                tokio::time::sleep(Duration::from_millis(5)).await;
                assert_eq!(fired.get(), 0);

                tokio::time::sleep(Duration::from_millis(10)).await;
                assert_eq!(fired.get(), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_previous_wakeup() {
        LocalSet::new()
            .run_until(async {
                let fired = Rc::new(RefCell::new(Vec::new()));
                let mut timer = ExpiryTimer::new();
                let now = Instant::now();

                let log = fired.clone();
                timer.arm(now + Duration::from_millis(10), move || log.borrow_mut().push("first"));
                let log = fired.clone();
                timer.arm(now + Duration::from_millis(20), move || log.borrow_mut().push("second"));

                tokio::time::sleep(Duration::from_millis(30)).await;
                assert_eq!(*fired.borrow(), vec!["second"]);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_firing() {
        LocalSet::new()
            .run_until(async {
                let fired = Rc::new(Cell::new(false));
                let mut timer = ExpiryTimer::new();

                let flag = fired.clone();
                timer.arm(Instant::now() + Duration::from_millis(10), move || flag.set(true));
                timer.cancel();

                assert!(!timer.is_armed());
                assert_eq!(timer.armed_at(), None);

                tokio::time::sleep(Duration::from_millis(20)).await;
                assert!(!fired.get());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        LocalSet::new()
            .run_until(async {
                let fired = Rc::new(Cell::new(false));
                let mut timer = ExpiryTimer::new();

                let flag = fired.clone();
                timer.arm(Instant::now() + Duration::from_millis(10), move || flag.set(true));
                drop(timer);

                tokio::time::sleep(Duration::from_millis(20)).await;
                assert!(!fired.get());
            })
            .await;
    }
}
