#![forbid(unsafe_code)]

//! Cancellable one-shot timers on a host-driven clock.
//!
//! [`TimerQueue`] replaces ambient `setTimeout`-style scheduling with an
//! explicit schedule / cancel / fire cycle. The caller owns the clock and
//! pulls due timers with [`TimerQueue::pop_due`]; nothing runs on its own.
//!
//! # Invariants
//!
//! - A [`TimerId`] is never reused, so a stale handle can never cancel or
//!   match a newer timer.
//! - Cancelling is idempotent: the second cancel of the same id is `None`.
//! - Due timers pop in deadline order; equal deadlines pop in the order they
//!   were scheduled.
//!
//! # Example
//!
//! ```
//! use core::time::Duration;
//! use livetoast_core::timer::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//! let a = timers.schedule(Duration::ZERO, Duration::from_millis(300), "evict");
//! let b = timers.schedule(Duration::ZERO, Duration::from_millis(10), "settle");
//! assert_eq!(timers.cancel(a), Some("evict"));
//! assert_eq!(timers.cancel(a), None);
//!
//! assert!(timers.pop_due(Duration::from_millis(9)).is_none());
//! assert_eq!(timers.pop_due(Duration::from_millis(10)), Some((b, "settle")));
//! ```

use core::time::Duration;
use std::collections::{BTreeMap, HashMap};

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw sequence number, unique for the lifetime of the queue.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Queue of pending one-shot timers carrying a payload of type `T`.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    next_id: u64,
    pending: BTreeMap<(Duration, TimerId), T>,
    deadlines: HashMap<TimerId, Duration>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to become due at `now + delay`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = now.saturating_add(delay);
        self.pending.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending timer, returning its payload.
    ///
    /// Returns `None` if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let deadline = self.deadlines.remove(&id)?;
        self.pending.remove(&(deadline, id))
    }

    /// Whether `id` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Deadline of a pending timer.
    #[must_use]
    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.deadlines.get(&id).copied()
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.first_key_value().map(|((deadline, _), _)| *deadline)
    }

    /// Remove and return the earliest timer whose deadline is `<= now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, T)> {
        let (&(deadline, _), _) = self.pending.first_key_value()?;
        if deadline > now {
            return None;
        }
        let ((_, id), payload) = self.pending.pop_first()?;
        self.deadlines.remove(&id);
        Some((id, payload))
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending timer. Ids already handed out stay retired.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }
}
