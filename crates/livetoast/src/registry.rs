#![forbid(unsafe_code)]

//! Toast registry: wrapper id → runtime record.
//!
//! The registry holds no order of its own. Callers pass the current external
//! order to [`Registry::all`] on every pass, so iteration always reflects the
//! latest sync.

use std::collections::HashMap;

use livetoast_core::TimerId;

use crate::config::AutoDismiss;
use crate::host::WrapperId;
use crate::scheduler::TimerScheduler;

/// Lifecycle phase of a registered toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastPhase {
    /// Initial attributes applied, waiting for the next frame to measure.
    Mounting,
    /// Height fixed, waiting for the settle delay.
    Measured,
    /// Transitions enabled, timers may run.
    Interactive,
    /// Removal requested; waiting for the external list to drop it.
    Removing,
}

/// Runtime state for one toast.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastRecord {
    pub(crate) wrapper_id: WrapperId,
    pub(crate) toast_id: String,
    pub(crate) auto_dismiss: AutoDismiss,
    pub(crate) height: f64,
    pub(crate) measured: bool,
    pub(crate) phase: ToastPhase,
    pub(crate) hidden: bool,
    pub(crate) removal_scheduled: bool,
    pub(crate) timer: Option<TimerId>,
    pub(crate) settle: Option<TimerId>,
    pub(crate) eviction: Option<TimerId>,
}

impl ToastRecord {
    /// A freshly mounted record with an estimated height.
    #[must_use]
    pub fn new(wrapper_id: WrapperId, toast_id: impl Into<String>, estimated_height: f64) -> Self {
        Self {
            wrapper_id,
            toast_id: toast_id.into(),
            auto_dismiss: AutoDismiss::Never,
            height: estimated_height,
            measured: false,
            phase: ToastPhase::Mounting,
            hidden: false,
            removal_scheduled: false,
            timer: None,
            settle: None,
            eviction: None,
        }
    }

    /// Wrapper element id.
    #[must_use]
    pub fn wrapper_id(&self) -> &WrapperId {
        &self.wrapper_id
    }

    /// Server-side toast id.
    #[must_use]
    pub fn toast_id(&self) -> &str {
        &self.toast_id
    }

    /// Auto-dismiss policy from the latest sync.
    #[must_use]
    pub fn auto_dismiss(&self) -> AutoDismiss {
        self.auto_dismiss
    }

    /// Current height: the estimate until measured, then the measurement.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Whether the height came from a real measurement.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.measured
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> ToastPhase {
        self.phase
    }

    /// Whether removal was requested.
    #[must_use]
    pub fn is_removing(&self) -> bool {
        self.phase == ToastPhase::Removing
    }

    /// Whether the visibility cap hid this toast.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether an over-cap removal is queued.
    #[must_use]
    pub fn removal_scheduled(&self) -> bool {
        self.removal_scheduled
    }

    /// Pending auto-dismiss timer.
    #[must_use]
    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Pending eviction timer.
    #[must_use]
    pub fn eviction(&self) -> Option<TimerId> {
        self.eviction
    }

    /// Record a real measurement. Later calls are ignored.
    pub fn set_measured_height(&mut self, height: f64) -> bool {
        if self.measured {
            return false;
        }
        self.height = height;
        self.measured = true;
        true
    }
}

/// Records keyed by wrapper id.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    records: HashMap<WrapperId, ToastRecord>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record if `wrapper_id` is unknown. Returns `true` if created.
    pub fn upsert(
        &mut self,
        wrapper_id: &WrapperId,
        toast_id: &str,
        estimated_height: f64,
    ) -> bool {
        if self.records.contains_key(wrapper_id) {
            return false;
        }
        self.records.insert(
            wrapper_id.clone(),
            ToastRecord::new(wrapper_id.clone(), toast_id, estimated_height),
        );
        true
    }

    /// Look up a record.
    #[must_use]
    pub fn get(&self, wrapper_id: &str) -> Option<&ToastRecord> {
        self.records.get(wrapper_id)
    }

    /// Look up a record mutably.
    pub fn get_mut(&mut self, wrapper_id: &str) -> Option<&mut ToastRecord> {
        self.records.get_mut(wrapper_id)
    }

    /// Whether a record exists.
    #[must_use]
    pub fn contains(&self, wrapper_id: &str) -> bool {
        self.records.contains_key(wrapper_id)
    }

    /// Cancel every timer the record owns and delete it.
    pub fn remove(
        &mut self,
        wrapper_id: &str,
        scheduler: &mut TimerScheduler,
    ) -> Option<ToastRecord> {
        let mut record = self.records.remove(wrapper_id)?;
        scheduler.cancel_all(&mut record);
        Some(record)
    }

    /// Records in the given order. Unknown ids are skipped.
    ///
    /// The iterator is `Clone`, so it can be walked more than once.
    #[must_use]
    pub fn all<'a>(&'a self, order: &'a [WrapperId]) -> Ordered<'a> {
        Ordered {
            records: &self.records,
            order: order.iter(),
        }
    }

    /// Every registered id, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &WrapperId> {
        self.records.keys()
    }

    /// Every record, in no particular order.
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut ToastRecord> {
        self.records.values_mut()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record without touching timers.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Ordered view over a [`Registry`].
#[derive(Debug, Clone)]
pub struct Ordered<'a> {
    records: &'a HashMap<WrapperId, ToastRecord>,
    order: core::slice::Iter<'a, WrapperId>,
}

impl<'a> Iterator for Ordered<'a> {
    type Item = &'a ToastRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.order.next()?;
            if let Some(record) = self.records.get(id) {
                return Some(record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;
    use crate::config::Timings;

    fn ids(raw: &[&str]) -> Vec<WrapperId> {
        raw.iter().map(|id| WrapperId::from(*id)).collect()
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut registry = Registry::new();
        let id = WrapperId::from("toasts-a");
        assert!(registry.upsert(&id, "a", 80.0));
        registry.get_mut("toasts-a").expect("record").set_measured_height(42.0);
        assert!(!registry.upsert(&id, "other", 80.0));

        let record = registry.get("toasts-a").expect("record");
        assert_eq!(record.toast_id(), "a");
        assert_eq!(record.height(), 42.0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn measured_height_is_write_once() {
        let mut record = ToastRecord::new("w".into(), "t", 80.0);
        assert!(!record.is_measured());
        assert!(record.set_measured_height(64.0));
        assert!(!record.set_measured_height(100.0));
        assert_eq!(record.height(), 64.0);
    }

    #[test]
    fn all_follows_caller_order_and_skips_unknown() {
        let mut registry = Registry::new();
        for id in ids(&["a", "b", "c"]) {
            registry.upsert(&id, id.as_str(), 80.0);
        }
        let order = ids(&["c", "x", "a", "b"]);
        let seen: Vec<&str> = registry.all(&order).map(ToastRecord::toast_id).collect();
        assert_eq!(seen, vec!["c", "a", "b"]);
    }

    #[test]
    fn all_is_restartable() {
        let mut registry = Registry::new();
        for id in ids(&["a", "b"]) {
            registry.upsert(&id, id.as_str(), 80.0);
        }
        let order = ids(&["b", "a"]);
        let view = registry.all(&order);
        assert_eq!(view.clone().count(), 2);
        assert_eq!(view.map(ToastRecord::toast_id).collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn remove_cancels_timers() {
        let mut registry = Registry::new();
        let mut scheduler = TimerScheduler::new(Timings::default());
        let id = WrapperId::from("a");
        registry.upsert(&id, "a", 80.0);

        let record = registry.get_mut("a").expect("record");
        scheduler.start(Duration::ZERO, record, Duration::from_millis(100));
        scheduler.schedule_eviction(Duration::ZERO, record);
        assert_eq!(scheduler.pending(), 2);

        let removed = registry.remove("a", &mut scheduler).expect("removed");
        assert!(removed.timer().is_none());
        assert!(removed.eviction().is_none());
        assert_eq!(scheduler.pending(), 0);
        assert!(registry.remove("a", &mut scheduler).is_none());
    }
}
