#![forbid(unsafe_code)]

//! Pointer input and the handler table.
//!
//! Instead of listeners closing over records, each wrapper id maps to the
//! affordances its markup offered at the last sync. Events are translated to
//! [`Intent`]s by looking the id up at event time; an unbound id (the toast
//! already left the registry) yields nothing.

use std::collections::HashMap;

use livetoast_core::debug;
use serde::{Deserialize, Serialize};

use crate::host::WrapperId;

/// Pointer input forwarded by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Pointer entered the container.
    ContainerEnter,
    /// Pointer left the container.
    ContainerLeave,
    /// Pointer entered one toast.
    ToastEnter { wrapper: WrapperId },
    /// Pointer left one toast.
    ToastLeave { wrapper: WrapperId },
    /// Close button clicked.
    CloseClick { wrapper: WrapperId },
    /// Action button clicked.
    ActionClick { wrapper: WrapperId },
    /// A flash's close button clicked.
    FlashCloseClick { key: String, flash_type: String },
}

/// Affordances a toast's markup offers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    /// A close button is present.
    pub close: bool,
    /// Label of the action button, if present.
    pub action: Option<String>,
}

/// What the controller should do in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Set the container's expanded mode.
    Expand(bool),
    /// Cancel every auto-dismiss timer.
    PauseAll,
    /// Re-arm idle toasts with their own durations.
    RearmAll,
    /// Cancel one toast's timer.
    Pause(WrapperId),
    /// Arm one toast's post-hover timer.
    Resume(WrapperId),
    /// Request removal of one toast.
    Close(WrapperId),
    /// Forward an action click.
    Action { wrapper: WrapperId, label: String },
    /// Start closing a flash.
    FlashClose { key: String, flash_type: String },
}

/// Handler table keyed by wrapper id.
#[derive(Debug, Clone, Default)]
pub struct InteractionHandler {
    table: HashMap<WrapperId, Bindings>,
}

impl InteractionHandler {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the bindings for a toast.
    pub fn bind(&mut self, wrapper: &WrapperId, bindings: Bindings) {
        match self.table.get_mut(wrapper) {
            Some(existing) => *existing = bindings,
            None => {
                self.table.insert(wrapper.clone(), bindings);
            }
        }
    }

    /// Drop a toast's bindings.
    pub fn unbind(&mut self, wrapper: &str) -> bool {
        self.table.remove(wrapper).is_some()
    }

    /// Current bindings for a toast.
    #[must_use]
    pub fn bindings(&self, wrapper: &str) -> Option<&Bindings> {
        self.table.get(wrapper)
    }

    /// Number of bound toasts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no toast is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Translate an event into intents.
    #[must_use]
    pub fn translate(&self, event: &PointerEvent) -> Vec<Intent> {
        match event {
            PointerEvent::ContainerEnter => vec![Intent::Expand(true), Intent::PauseAll],
            PointerEvent::ContainerLeave => vec![Intent::Expand(false), Intent::RearmAll],
            PointerEvent::ToastEnter { wrapper } => self
                .lookup(wrapper)
                .map(|_| Intent::Pause(wrapper.clone()))
                .into_iter()
                .collect(),
            PointerEvent::ToastLeave { wrapper } => self
                .lookup(wrapper)
                .map(|_| Intent::Resume(wrapper.clone()))
                .into_iter()
                .collect(),
            PointerEvent::CloseClick { wrapper } => self
                .lookup(wrapper)
                .filter(|bindings| bindings.close)
                .map(|_| Intent::Close(wrapper.clone()))
                .into_iter()
                .collect(),
            PointerEvent::ActionClick { wrapper } => self
                .lookup(wrapper)
                .and_then(|bindings| bindings.action.clone())
                .map(|label| Intent::Action {
                    wrapper: wrapper.clone(),
                    label,
                })
                .into_iter()
                .collect(),
            PointerEvent::FlashCloseClick { key, flash_type } => vec![Intent::FlashClose {
                key: key.clone(),
                flash_type: flash_type.clone(),
            }],
        }
    }

    fn lookup(&self, wrapper: &WrapperId) -> Option<&Bindings> {
        let bindings = self.table.get(wrapper);
        if bindings.is_none() {
            debug!(%wrapper, "pointer event for unbound toast ignored");
        }
        bindings
    }
}
