//! Owned timer handles.
//!
//! A `TimerSet` tracks every callback an agent has scheduled so that all of
//! them can be cancelled in one step when the agent stops. Dropping the set
//! cancels whatever is still pending.

use crate::agents::base::AgentError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Identifies a scheduled callback within its owning `TimerSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    /// Fires once after a delay.
    Timeout,
    /// Fires repeatedly, first after one period.
    Interval,
}

struct TimerEntry {
    kind: TimerKind,
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl TimerEntry {
    fn cancel(self, id: TimerId) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.handle.abort();
        debug!(timer = id.0, kind = ?self.kind, "Cancelled timer");
    }
}

type Entries = Arc<Mutex<HashMap<TimerId, TimerEntry>>>;

#[derive(Default)]
pub struct TimerSet {
    entries: Entries,
    next_id: AtomicU64,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` once after `delay`.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::NoRuntime` when called outside a tokio runtime.
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> Result<TimerId, AgentError>
    where
        F: FnOnce() + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| AgentError::NoRuntime)?;
        let id = self.allocate_id();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let entries = Arc::downgrade(&self.entries);

        // Held across spawn so the task cannot look itself up before it is inserted.
        let mut guard = self.entries.lock();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            // Only fire if still registered; a drained set means we were cancelled.
            let registered = entries
                .upgrade()
                .is_some_and(|entries| entries.lock().remove(&id).is_some());
            if registered && !flag.load(Ordering::SeqCst) {
                callback();
            }
        });
        guard.insert(
            id,
            TimerEntry {
                kind: TimerKind::Timeout,
                cancelled,
                handle,
            },
        );

        debug!(timer = id.0, delay_ms = delay.as_millis() as u64, "Scheduled timeout");
        Ok(id)
    }

    /// Run `callback` every `period`, starting one period from now.
    ///
    /// # Errors
    ///
    /// Returns `AgentError::NoRuntime` when called outside a tokio runtime.
    pub fn set_interval<F>(&self, period: Duration, mut callback: F) -> Result<TimerId, AgentError>
    where
        F: FnMut() + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| AgentError::NoRuntime)?;
        let id = self.allocate_id();
        let period = period.max(Duration::from_millis(1));
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let mut guard = self.entries.lock();
        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                callback();
            }
        });
        guard.insert(
            id,
            TimerEntry {
                kind: TimerKind::Interval,
                cancelled,
                handle,
            },
        );

        debug!(timer = id.0, period_ms = period.as_millis() as u64, "Scheduled interval");
        Ok(id)
    }

    /// Cancel a single timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        let entry = self.entries.lock().remove(&id);
        match entry {
            Some(entry) => {
                entry.cancel(id);
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer and return how many there were.
    ///
    /// No callback starts after this returns. On a multi-threaded runtime a
    /// callback that already passed its cancellation check on another worker
    /// may still be running when this returns, since aborting a task does
    /// not interrupt synchronous code. Callbacks that must not overlap the
    /// caller should hold their own guard.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(TimerId, TimerEntry)> = self.entries.lock().drain().collect();
        let count = drained.len();
        for (id, entry) in drained {
            entry.cancel(id);
        }
        count
    }

    /// Number of timers still pending.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn allocate_id(&self) -> TimerId {
        TimerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

impl std::fmt::Debug for TimerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerSet")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + Clone + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_once_and_releases_handle() {
        let timers = TimerSet::new();
        let (count, bump) = counter();

        let id = timers.set_timeout(Duration::from_millis(50), bump).unwrap();
        assert_eq!(timers.len(), 1);

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(timers.is_empty());
        assert!(!timers.cancel(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_fires_after_first_period() {
        let timers = TimerSet::new();
        let (count, bump) = counter();

        timers.set_interval(Duration::from_millis(10), bump).unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(count.load(Ordering::SeqCst) >= 2);
        assert_eq!(timers.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all_stops_everything() {
        let timers = TimerSet::new();
        let (count, bump) = counter();

        timers.set_timeout(Duration::from_millis(20), bump.clone()).unwrap();
        timers.set_interval(Duration::from_millis(10), bump).unwrap();

        assert_eq!(timers.cancel_all(), 2);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(timers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_set_cancels_timers() {
        let (count, bump) = counter();
        {
            let timers = TimerSet::new();
            timers.set_interval(Duration::from_millis(10), bump).unwrap();
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_requires_runtime() {
        let timers = TimerSet::new();
        let result = timers.set_timeout(Duration::from_millis(1), || {});
        assert_eq!(result, Err(AgentError::NoRuntime));
    }
}
