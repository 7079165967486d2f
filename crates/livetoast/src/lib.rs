#![forbid(unsafe_code)]

//! Toast-stack engine.
//!
//! # Role in LiveToast
//! `livetoast` keeps a stacked set of server-rendered notifications in step
//! with the server's ordered list while adding purely local behavior on top:
//! hover-to-expand stacking, auto-dismiss timers with pause and resume, a
//! visible-count cap with deferred eviction, and close / action buttons.
//!
//! # Primary responsibilities
//! - **Registry**: wrapper id → runtime record (height, timers, flags).
//! - **TimerScheduler**: at most one live auto-dismiss timer per toast.
//! - **StackingEngine**: rank, z-order, front flag and expanded offsets.
//! - **VisibilityLimiter**: hides overflow and schedules its removal.
//! - **ToastStack**: reconciles the registry on every external sync.
//! - **InteractionHandler**: pointer input → intents via a handler table.
//! - **FlashBridge**: closes inline flashes and notifies both state owners.
//!
//! # How it fits in the system
//! The host implements [`ToastSurface`] (visual state) and [`Transport`]
//! (server events), then drives a [`ToastStack`] with syncs, frames, time and
//! pointer input. [`headless`] provides in-memory implementations of both
//! traits; `livetoast-web` wraps them in a JSON step interface.
//!
//! # Example
//!
//! ```
//! use core::time::Duration;
//! use livetoast::{ContainerConfig, ToastElement, ToastStack, WrapperElement};
//! use livetoast::headless::{HeadlessSurface, RecordingTransport};
//!
//! let mut stack = ToastStack::new(
//!     ContainerConfig::new(),
//!     HeadlessSurface::new(),
//!     RecordingTransport::new(),
//! );
//! stack.process(&[WrapperElement::new(
//!     "toasts-1",
//!     ToastElement::new("t1").duration_ms(1000),
//! )]);
//! stack.flush();
//! stack.advance(Duration::from_millis(1010));
//! assert_eq!(stack.transport().cleared(), vec!["t1"]);
//! ```

pub mod config;
pub mod error;
pub mod flash;
pub mod headless;
pub mod host;
pub mod interaction;
pub mod lifecycle;
pub mod limiter;
pub mod registry;
pub mod scheduler;
pub mod stacking;

pub use config::{AutoDismiss, ContainerConfig, ContainerDataset, Timings, ToastPosition};
pub use error::ConfigError;
pub use host::{
    EventTarget, ExitMotion, Request, SlideDirection, ToastElement, ToastSurface, Transport,
    VisualAttrs, WireEvent, WrapperElement, WrapperId,
};
pub use interaction::PointerEvent;
pub use lifecycle::ToastStack;
pub use registry::{Registry, ToastPhase, ToastRecord};
pub use stacking::{StackLayout, StackingEngine};
