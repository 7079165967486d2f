#![forbid(unsafe_code)]

//! Host-controlled monotonic time.

use core::time::Duration;

/// Deterministic monotonic clock advanced explicitly by the host.
///
/// Nothing in the workspace reads the OS clock. The embedding environment
/// owns the real event loop and reports elapsed time through [`advance`] or
/// [`set`], which keeps every timer decision reproducible.
///
/// [`advance`]: DeterministicClock::advance
/// [`set`]: DeterministicClock::set
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Earlier values are ignored.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}
