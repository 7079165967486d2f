#![forbid(unsafe_code)]

//! Visibility limiter.
//!
//! Toasts ranked at or past the cap are hidden and queued for removal once
//! their hide animation has finished. A queued toast that falls back under
//! the cap is shown again and its pending eviction is withdrawn, so a kept
//! toast never receives a late removal request from an earlier pass.

use core::time::Duration;
use std::num::NonZeroUsize;

use livetoast_core::debug;

use crate::host::WrapperId;
use crate::registry::Registry;
use crate::scheduler::TimerScheduler;

/// What one limiter pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LimitOutcome {
    /// Became hidden this pass.
    pub hidden: Vec<WrapperId>,
    /// Became visible again this pass.
    pub shown: Vec<WrapperId>,
    /// Eviction newly scheduled this pass.
    pub scheduled: Vec<WrapperId>,
    /// Pending eviction withdrawn this pass.
    pub rescinded: Vec<WrapperId>,
}

impl LimitOutcome {
    /// Whether the pass changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hidden.is_empty()
            && self.shown.is_empty()
            && self.scheduled.is_empty()
            && self.rescinded.is_empty()
    }
}

/// Cap enforcement over the current order.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityLimiter;

impl VisibilityLimiter {
    /// Apply `max` to `order`. No-op when `max` is `None`.
    pub fn apply(
        &self,
        registry: &mut Registry,
        order: &[WrapperId],
        max: Option<NonZeroUsize>,
        scheduler: &mut TimerScheduler,
        now: Duration,
    ) -> LimitOutcome {
        let mut outcome = LimitOutcome::default();
        let Some(max) = max else {
            return outcome;
        };

        for (rank, id) in order.iter().enumerate() {
            let Some(record) = registry.get_mut(id.as_str()) else {
                continue;
            };
            if record.is_removing() {
                continue;
            }
            if rank >= max.get() {
                if !record.hidden {
                    record.hidden = true;
                    outcome.hidden.push(id.clone());
                }
                if !record.removal_scheduled {
                    record.removal_scheduled = true;
                    scheduler.schedule_eviction(now, record);
                    debug!(wrapper = %id, rank, "eviction scheduled");
                    outcome.scheduled.push(id.clone());
                }
            } else {
                if record.hidden {
                    record.hidden = false;
                    outcome.shown.push(id.clone());
                }
                if record.removal_scheduled {
                    record.removal_scheduled = false;
                    if scheduler.cancel_eviction(record) {
                        debug!(wrapper = %id, rank, "eviction rescinded");
                        outcome.rescinded.push(id.clone());
                    }
                }
            }
        }
        outcome
    }
}
