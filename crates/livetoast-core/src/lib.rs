#![forbid(unsafe_code)]

//! Core: host-driven time, cancellable timers, and frame batching.
//!
//! # Role in LiveToast
//! `livetoast-core` holds the scheduling primitives the toast engine is
//! built on. None of them touch the OS: the embedding page owns the real
//! event loop and drives everything here explicitly.
//!
//! # Primary responsibilities
//! - **DeterministicClock**: monotonic time advanced by the host.
//! - **TimerQueue**: one-shot timers with explicit schedule / cancel / fire.
//! - **FrameQueue**: coalesced per-frame work (recompute flag plus tasks).
//! - **Logging**: `tracing` facade that compiles away when disabled.
//!
//! # How it fits in the system
//! `livetoast` owns one clock, one timer queue and one frame queue per toast
//! stack. `livetoast-web` feeds them host time and frame ticks.

pub mod clock;
pub mod frame;
pub mod logging;
pub mod timer;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, info_span, trace, warn};

pub use clock::DeterministicClock;
pub use frame::{FrameBatch, FrameQueue};
pub use timer::{TimerId, TimerQueue};
