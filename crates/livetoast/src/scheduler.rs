#![forbid(unsafe_code)]

//! Timer scheduler.
//!
//! Wraps one [`TimerQueue`] for the whole stack. Each record owns up to three
//! handles (auto-dismiss, settle, eviction) and the scheduler keeps at most
//! one live timer per handle slot: starting a slot cancels whatever it held.
//!
//! Fired timers come back as [`Deferred`] payloads. The caller checks the
//! fired [`TimerId`] against the record's stored handle; a mismatch means the
//! timer was superseded and the callback is dropped.

use core::time::Duration;

use livetoast_core::timer::{TimerId, TimerQueue};
use livetoast_core::{debug, trace};

use crate::config::{AutoDismiss, Timings};
use crate::host::WrapperId;
use crate::registry::ToastRecord;

/// Work a timer carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Request removal of an idle toast.
    AutoDismiss(WrapperId),
    /// Enable transitions and start the first-run timer.
    Settle(WrapperId),
    /// Request removal of an over-cap toast after its hide animation.
    Evict(WrapperId),
    /// Finish closing a flash after its exit animation.
    FlashExit { key: String, flash_type: String },
}

/// Owner of every pending timer in one stack.
#[derive(Debug, Clone)]
pub struct TimerScheduler {
    queue: TimerQueue<Deferred>,
    timings: Timings,
}

impl TimerScheduler {
    /// Create a scheduler using the given delays.
    #[must_use]
    pub fn new(timings: Timings) -> Self {
        Self {
            queue: TimerQueue::new(),
            timings,
        }
    }

    /// Delays in use.
    #[must_use]
    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Arm the auto-dismiss timer, replacing any prior one.
    ///
    /// A zero duration is a no-op and leaves the prior timer alone.
    pub fn start(
        &mut self,
        now: Duration,
        record: &mut ToastRecord,
        duration: Duration,
    ) -> Option<TimerId> {
        if duration.is_zero() {
            return None;
        }
        if let Some(prior) = record.timer.take() {
            self.queue.cancel(prior);
        }
        let id = self.queue.schedule(
            now,
            duration,
            Deferred::AutoDismiss(record.wrapper_id.clone()),
        );
        debug!(
            wrapper = %record.wrapper_id,
            ms = duration.as_millis() as u64,
            "auto-dismiss timer started"
        );
        record.timer = Some(id);
        Some(id)
    }

    /// Cancel the auto-dismiss timer. Returns `false` if none was armed.
    pub fn cancel(&mut self, record: &mut ToastRecord) -> bool {
        let Some(id) = record.timer.take() else {
            return false;
        };
        self.queue.cancel(id);
        debug!(wrapper = %record.wrapper_id, "auto-dismiss timer cancelled");
        true
    }

    /// Pointer entered the toast.
    pub fn pause(&mut self, record: &mut ToastRecord) -> bool {
        self.cancel(record)
    }

    /// Pointer left the toast: arm the short post-hover timer.
    ///
    /// Skipped for toasts that never auto-dismiss or are already leaving.
    pub fn resume(&mut self, now: Duration, record: &mut ToastRecord) -> Option<TimerId> {
        if record.is_removing()
            || record.removal_scheduled
            || record.auto_dismiss == AutoDismiss::Never
        {
            return None;
        }
        self.start(now, record, self.timings.resume_after_hover)
    }

    /// Re-arm an idle toast with its own full duration.
    ///
    /// Only acts when no timer is live and the toast is neither leaving nor
    /// queued for eviction.
    pub fn rearm(&mut self, now: Duration, record: &mut ToastRecord) -> Option<TimerId> {
        if record.timer.is_some() || record.is_removing() || record.removal_scheduled {
            return None;
        }
        let duration = record.auto_dismiss.duration()?;
        self.start(now, record, duration)
    }

    /// Arm the first-run timer with the toast's own duration.
    pub fn start_first_run(&mut self, now: Duration, record: &mut ToastRecord) -> Option<TimerId> {
        let duration = record.auto_dismiss.duration()?;
        self.start(now, record, duration)
    }

    /// Schedule the settle step after measurement.
    pub fn schedule_settle(&mut self, now: Duration, record: &mut ToastRecord) -> TimerId {
        if let Some(prior) = record.settle.take() {
            self.queue.cancel(prior);
        }
        let id = self.queue.schedule(
            now,
            self.timings.settle_delay,
            Deferred::Settle(record.wrapper_id.clone()),
        );
        trace!(wrapper = %record.wrapper_id, "settle scheduled");
        record.settle = Some(id);
        id
    }

    /// Schedule removal of an over-cap toast.
    pub fn schedule_eviction(&mut self, now: Duration, record: &mut ToastRecord) -> TimerId {
        if let Some(prior) = record.eviction.take() {
            self.queue.cancel(prior);
        }
        let id = self.queue.schedule(
            now,
            self.timings.hide_delay,
            Deferred::Evict(record.wrapper_id.clone()),
        );
        record.eviction = Some(id);
        id
    }

    /// Withdraw a pending eviction. Returns `false` if none was pending.
    pub fn cancel_eviction(&mut self, record: &mut ToastRecord) -> bool {
        let Some(id) = record.eviction.take() else {
            return false;
        };
        self.queue.cancel(id).is_some()
    }

    /// Cancel every timer the record owns.
    pub fn cancel_all(&mut self, record: &mut ToastRecord) {
        for id in [record.timer.take(), record.settle.take(), record.eviction.take()]
            .into_iter()
            .flatten()
        {
            self.queue.cancel(id);
        }
    }

    /// Schedule completion of a flash close.
    pub fn schedule_flash_exit(&mut self, now: Duration, key: &str, flash_type: &str) -> TimerId {
        self.queue.schedule(
            now,
            self.timings.flash_exit_delay,
            Deferred::FlashExit {
                key: key.to_string(),
                flash_type: flash_type.to_string(),
            },
        )
    }

    /// Cancel a timer by id.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.queue.cancel(id).is_some()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.next_deadline()
    }

    /// Pop the next timer due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, Deferred)> {
        self.queue.pop_due(now)
    }

    /// Whether `id` is still pending.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.queue.is_pending(id)
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
