#![forbid(unsafe_code)]

//! `livetoast-web` drives a toast stack from a web page.
//!
//! Design goals:
//! - **Host-driven**: the page pushes syncs, pointer input, frames and elapsed
//!   time; nothing runs on its own.
//! - **Deterministic**: the same message sequence always yields the same
//!   outputs.
//! - **JSON at the boundary**: messages in ([`input::HostMessage`]), surface
//!   operations and server events out ([`WebOutputs`]).
//!
//! On `wasm32` the host is also exported to JavaScript via `wasm-bindgen`.
//!
//! # Example
//!
//! ```
//! use livetoast_web::StepHost;
//!
//! let mut host = StepHost::new();
//! host.handle_json(r#"{"type":"init"}"#).unwrap();
//! host.handle_json(r#"{"type":"sync","wrappers":[{"id":"toasts-1","toast":{"toastId":"t1","duration":"100"}}]}"#).unwrap();
//! host.handle_json(r#"{"type":"frame","heights":{"toasts-1":64}}"#).unwrap();
//! host.handle_json(r#"{"type":"advance","ms":110}"#).unwrap();
//!
//! let outputs = host.take_outputs();
//! assert_eq!(outputs.events[0].event, "clear");
//! ```

pub mod input;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::LiveToastHost;

use core::time::Duration;

use livetoast::headless::{HeadlessSurface, RecordingTransport, SurfaceOp};
use livetoast::{ContainerConfig, ToastStack, WireEvent, WrapperId};
use livetoast_core::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use input::{HostMessage, parse_message};

/// The stack type driven by the web host.
pub type WebStack = ToastStack<HeadlessSurface, RecordingTransport>;

/// Web host error type.
#[derive(Debug, Error)]
pub enum WebHostError {
    /// Message or output could not be (de)serialized.
    #[error("invalid host message: {0}")]
    Json(#[from] serde_json::Error),

    /// A message other than `init` arrived before `init`.
    #[error("{kind} message received before init")]
    NotInitialized { kind: &'static str },
}

/// Result of a single [`StepHost::handle`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Whether frame work ran during this step.
    pub flushed: bool,
    /// Registered toasts, including ones mid-exit.
    pub toasts: usize,
    /// Toasts taking part in stacking.
    pub stacked: usize,
    /// Host time after the step, in milliseconds.
    pub now_ms: u64,
    /// Earliest pending timer, in milliseconds. The page should send an
    /// `advance` no later than this.
    pub next_deadline_ms: Option<u64>,
    /// Whether the page should schedule an animation frame.
    pub frame_requested: bool,
}

/// Captured outputs since the last [`StepHost::take_outputs`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebOutputs {
    /// Surface operations in call order.
    pub ops: Vec<SurfaceOp>,
    /// Server events in send order.
    pub events: Vec<WireEvent>,
}

impl WebOutputs {
    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty() && self.events.is_empty()
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, WebHostError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Host-driven runner around one [`WebStack`].
///
/// # Lifecycle
///
/// 1. `init` creates the stack.
/// 2. `sync`, `pointer`, `frame`, `advance`, `clear_flash` and
///    `flash_present` drive it.
/// 3. [`StepHost::take_outputs`] drains what the page must apply.
/// 4. `destroy` tears it down; a later `init` starts over.
#[derive(Debug, Default)]
pub struct StepHost {
    stack: Option<WebStack>,
    steps: u64,
}

impl StepHost {
    /// Create an uninitialized host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host with a stack already built from `config`.
    #[must_use]
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            stack: Some(Self::build(config)),
            steps: 0,
        }
    }

    /// Whether `init` has been handled.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.stack.is_some()
    }

    /// Number of messages handled.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The stack, once initialized.
    #[must_use]
    pub fn stack(&self) -> Option<&WebStack> {
        self.stack.as_ref()
    }

    /// Parse and handle one JSON message.
    pub fn handle_json(&mut self, json: &str) -> Result<StepResult, WebHostError> {
        let message = parse_message(json)?;
        self.handle(message)
    }

    /// Handle one message.
    pub fn handle(&mut self, message: HostMessage) -> Result<StepResult, WebHostError> {
        self.steps += 1;
        debug!(kind = message.kind(), step = self.steps, "host message");

        let mut flushed = false;
        match message {
            HostMessage::Init { config, dataset } => {
                if let Some(old) = self.stack.as_mut() {
                    old.destroy();
                }
                let mut stack = Self::build(config);
                if let Some(dataset) = dataset {
                    stack.refresh(&dataset);
                }
                self.stack = Some(stack);
            }
            HostMessage::Destroy => {
                if let Some(stack) = self.stack.as_mut() {
                    stack.destroy();
                }
                self.stack = None;
            }
            other => {
                let kind = other.kind();
                let stack = self
                    .stack
                    .as_mut()
                    .ok_or(WebHostError::NotInitialized { kind })?;
                flushed = Self::drive(stack, other);
            }
        }
        Ok(self.result(flushed))
    }

    /// Drain captured surface operations and server events.
    pub fn take_outputs(&mut self) -> WebOutputs {
        let Some(stack) = self.stack.as_mut() else {
            return WebOutputs::default();
        };
        let ops = stack.surface_mut().take_ops();
        let events = stack
            .transport_mut()
            .take()
            .iter()
            .map(livetoast::Request::to_wire)
            .collect();
        WebOutputs { ops, events }
    }

    fn build(config: ContainerConfig) -> WebStack {
        ToastStack::new(config, HeadlessSurface::new(), RecordingTransport::new())
    }

    fn drive(stack: &mut WebStack, message: HostMessage) -> bool {
        match message {
            HostMessage::Sync { wrappers, dataset } => {
                if let Some(dataset) = dataset {
                    stack.refresh(&dataset);
                }
                let before: Vec<WrapperId> = stack.registry().ids().cloned().collect();
                stack.process(&wrappers);
                for id in before {
                    if !stack.registry().contains(id.as_str()) {
                        stack.surface_mut().forget(id.as_str());
                    }
                }
                false
            }
            HostMessage::Pointer { event } => {
                stack.handle_pointer(&event);
                false
            }
            HostMessage::Frame { heights } => {
                for (id, height) in heights {
                    stack.surface_mut().set_height(id, height);
                }
                stack.flush()
            }
            HostMessage::Advance { ms } => {
                stack.advance(Duration::from_millis(ms));
                false
            }
            HostMessage::ClearFlash { key } => {
                stack.clear_flash(&key);
                false
            }
            HostMessage::FlashPresent { key } => {
                stack.surface_mut().add_flash(key);
                false
            }
            HostMessage::Init { .. } | HostMessage::Destroy => false,
        }
    }

    fn result(&self, flushed: bool) -> StepResult {
        let Some(stack) = self.stack.as_ref() else {
            return StepResult {
                flushed,
                toasts: 0,
                stacked: 0,
                now_ms: 0,
                next_deadline_ms: None,
                frame_requested: false,
            };
        };
        StepResult {
            flushed,
            toasts: stack.registry().len(),
            stacked: stack.order().len(),
            now_ms: millis(stack.now()),
            next_deadline_ms: stack.next_deadline().map(millis),
            frame_requested: stack.has_pending_frame(),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
