#![forbid(unsafe_code)]

//! Flash bridge.
//!
//! Flashes are inline notifications mirrored in two places on the server:
//! the toast component's state and the page's own flash map. Closing one
//! animates it out, then removes it and notifies both.

use core::time::Duration;
use std::collections::HashMap;

use livetoast_core::{TimerId, debug};

use crate::host::{Request, ToastSurface, Transport};
use crate::scheduler::TimerScheduler;

/// Tracks flashes whose exit animation is running.
#[derive(Debug, Clone, Default)]
pub struct FlashBridge {
    closing: HashMap<String, TimerId>,
}

impl FlashBridge {
    /// Create an idle bridge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is mid-close.
    #[must_use]
    pub fn is_closing(&self, key: &str) -> bool {
        self.closing.contains_key(key)
    }

    /// Close button clicked: animate out and schedule completion.
    ///
    /// A second click while the animation runs is ignored.
    pub fn begin_close<S: ToastSurface + ?Sized>(
        &mut self,
        key: &str,
        flash_type: &str,
        now: Duration,
        scheduler: &mut TimerScheduler,
        surface: &mut S,
    ) -> bool {
        if self.closing.contains_key(key) {
            return false;
        }
        if !surface.has_flash(key) {
            debug!(key, "close for missing flash ignored");
            return false;
        }
        surface.animate_flash_out(key);
        let id = scheduler.schedule_flash_exit(now, key, flash_type);
        self.closing.insert(key.to_string(), id);
        debug!(key, flash_type, "flash close started");
        true
    }

    /// Exit animation finished: remove the element and notify both sides.
    ///
    /// `fired` must match the pending close for `key`; otherwise the close
    /// was already completed or cancelled and nothing happens.
    pub fn complete_close<S, T>(
        &mut self,
        fired: TimerId,
        key: &str,
        flash_type: &str,
        surface: &mut S,
        transport: &mut T,
    ) -> bool
    where
        S: ToastSurface + ?Sized,
        T: Transport + ?Sized,
    {
        if self.closing.get(key) != Some(&fired) {
            debug!(key, "stale flash close ignored");
            return false;
        }
        self.closing.remove(key);
        surface.remove_flash(key);
        transport.send(Request::ClearFlash {
            key: key.to_string(),
            flash_type: flash_type.to_string(),
        });
        transport.send(Request::PageClearFlash {
            key: key.to_string(),
        });
        debug!(key, "flash closed");
        true
    }

    /// Server cleared `key`: remove the element immediately.
    ///
    /// A close already in progress for the same key is abandoned, so no
    /// outbound notification follows.
    pub fn clear_by_key<S: ToastSurface + ?Sized>(
        &mut self,
        key: &str,
        scheduler: &mut TimerScheduler,
        surface: &mut S,
    ) {
        if let Some(id) = self.closing.remove(key) {
            scheduler.cancel_timer(id);
        }
        surface.remove_flash(key);
    }

    /// Abandon every pending close.
    pub fn clear(&mut self, scheduler: &mut TimerScheduler) {
        for (_, id) in self.closing.drain() {
            scheduler.cancel_timer(id);
        }
    }
}
