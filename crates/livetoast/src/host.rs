#![forbid(unsafe_code)]

//! Host boundary: the element list the engine reads and the two traits it
//! writes through.
//!
//! The engine never owns DOM nodes. On every sync the host hands over an
//! ordered list of [`WrapperElement`]s; the engine answers with calls on a
//! [`ToastSurface`] (visual state) and a [`Transport`] (server requests).

use core::borrow::Borrow;
use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ToastPosition;

/// Stable identifier of a toast wrapper element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WrapperId(String);

impl WrapperId {
    /// Wrap a raw element id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Raw element id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for WrapperId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WrapperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WrapperId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WrapperId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The toast element inside a wrapper, as read from its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastElement {
    /// Server-side toast id, used in outbound requests.
    pub toast_id: String,
    /// Raw `duration` attribute, in milliseconds.
    #[serde(default)]
    pub duration: Option<String>,
    /// The element is already playing its exit animation.
    #[serde(default)]
    pub removed: bool,
    /// The element contains a close button.
    #[serde(default)]
    pub closable: bool,
    /// Label of the element's action button, if it has one.
    #[serde(default)]
    pub action: Option<String>,
}

impl ToastElement {
    /// A toast with no duration attribute, close button or action.
    #[must_use]
    pub fn new(toast_id: impl Into<String>) -> Self {
        Self {
            toast_id: toast_id.into(),
            duration: None,
            removed: false,
            closable: false,
            action: None,
        }
    }

    /// Set the `duration` attribute from a millisecond count.
    #[must_use]
    pub fn duration_ms(mut self, ms: i64) -> Self {
        self.duration = Some(ms.to_string());
        self
    }

    /// Set the raw `duration` attribute.
    #[must_use]
    pub fn duration_raw(mut self, raw: impl Into<String>) -> Self {
        self.duration = Some(raw.into());
        self
    }

    /// Mark the element as mid-exit.
    #[must_use]
    pub fn removed(mut self, removed: bool) -> Self {
        self.removed = removed;
        self
    }

    /// Give the element a close button.
    #[must_use]
    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }

    /// Give the element an action button.
    #[must_use]
    pub fn action(mut self, label: impl Into<String>) -> Self {
        self.action = Some(label.into());
        self
    }
}

/// A wrapper element in the external list.
///
/// `toast` is `None` when the markup is malformed; such wrappers are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperElement {
    /// Wrapper element id.
    pub id: WrapperId,
    /// Inner toast element.
    #[serde(default)]
    pub toast: Option<ToastElement>,
}

impl WrapperElement {
    /// A well-formed wrapper around `toast`.
    #[must_use]
    pub fn new(id: impl Into<WrapperId>, toast: ToastElement) -> Self {
        Self {
            id: id.into(),
            toast: Some(toast),
        }
    }

    /// A wrapper with no toast child.
    #[must_use]
    pub fn empty(id: impl Into<WrapperId>) -> Self {
        Self {
            id: id.into(),
            toast: None,
        }
    }
}

/// Derived stacking attributes for one toast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualAttrs {
    /// Position in the stack; 0 is the front.
    pub rank: usize,
    /// Paint order; the front toast is highest.
    pub z_order: usize,
    /// Whether this is the front toast.
    pub is_front: bool,
    /// Whether the container is expanded.
    pub expanded: bool,
    /// Vertical offset in pixels. Only computed while expanded.
    pub offset: Option<f64>,
}

/// Exit slide direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideDirection {
    /// Slide off the top edge.
    Up,
    /// Slide off the bottom edge.
    Down,
}

/// Exit animation applied when a toast starts leaving. Always fades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitMotion {
    /// Slide direction.
    pub direction: SlideDirection,
}

impl ExitMotion {
    /// Exit motion for a stack anchored at `position`.
    #[must_use]
    pub const fn for_position(position: ToastPosition) -> Self {
        let direction = if position.is_top() {
            SlideDirection::Up
        } else {
            SlideDirection::Down
        };
        Self { direction }
    }
}

/// Visual side of the host (the DOM in a browser).
///
/// Every method takes the wrapper id; implementations ignore ids they do not
/// know.
pub trait ToastSurface {
    /// Apply initial attributes without animation, disable transitions and
    /// enable pointer events.
    fn prepare_mount(&mut self, id: &WrapperId, attrs: &VisualAttrs);

    /// Natural rendered height with transforms neutralized. `None` if the
    /// element is gone or has no layout.
    fn measure_height(&mut self, id: &WrapperId) -> Option<f64>;

    /// Pin an explicit pixel height.
    fn fix_height(&mut self, id: &WrapperId, height: f64);

    /// Re-enable transitions and flag the element as mounted.
    fn finish_mount(&mut self, id: &WrapperId);

    /// Write stacking attributes.
    fn apply_visual(&mut self, id: &WrapperId, attrs: &VisualAttrs);

    /// Publish the front toast's height on the container.
    fn set_front_height(&mut self, height: Option<f64>);

    /// Show (opaque, interactive) or hide (transparent, inert).
    fn set_visibility(&mut self, id: &WrapperId, visible: bool);

    /// Start the exit animation and set the removed marker.
    fn apply_exit(&mut self, id: &WrapperId, motion: ExitMotion);

    /// Whether a flash element for `key` is rendered.
    fn has_flash(&self, key: &str) -> bool;

    /// Start the flash exit animation.
    fn animate_flash_out(&mut self, key: &str);

    /// Remove a flash element.
    fn remove_flash(&mut self, key: &str);
}

/// Outbound request to the server side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    /// Drop a toast from the server's list.
    Clear { id: String },
    /// A toast's action button was clicked.
    Action { toast_id: String, action: String },
    /// Drop a flash from the component's state.
    ClearFlash {
        key: String,
        #[serde(rename = "type")]
        flash_type: String,
    },
    /// Drop a flash from the page's own flash state.
    PageClearFlash { key: String },
}

/// Which side of the server receives an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTarget {
    /// The toast container's component.
    Component,
    /// The hosting page.
    Page,
}

/// A request in its on-the-wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    /// Receiver.
    pub target: EventTarget,
    /// Event name.
    pub event: String,
    /// Event payload.
    pub payload: Value,
}

impl Request {
    /// Event name and payload as sent to the server.
    #[must_use]
    pub fn to_wire(&self) -> WireEvent {
        let (target, event, payload) = match self {
            Self::Clear { id } => (EventTarget::Component, "clear", json!({ "id": id })),
            Self::Action { toast_id, action } => (
                EventTarget::Component,
                "action",
                json!({ "toast_id": toast_id, "action": action }),
            ),
            Self::ClearFlash { key, flash_type } => (
                EventTarget::Component,
                "clear-flash",
                json!({ "key": key, "type": flash_type }),
            ),
            Self::PageClearFlash { key } => {
                (EventTarget::Page, "lv:clear-flash", json!({ "key": key }))
            }
        };
        WireEvent {
            target,
            event: event.to_string(),
            payload,
        }
    }
}

/// Server side of the host.
pub trait Transport {
    /// Deliver one request. Delivery failures are the transport's concern.
    fn send(&mut self, request: Request);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, request: Request) {
        (**self).send(request);
    }
}
