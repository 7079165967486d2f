#![forbid(unsafe_code)]

//! In-memory host.
//!
//! [`HeadlessSurface`] records every surface call as a [`SurfaceOp`] and keeps
//! a per-element snapshot so tests (and the web step host) can inspect the
//! visual state without a DOM. Heights returned by
//! [`ToastSurface::measure_height`] are whatever the host registered with
//! [`HeadlessSurface::set_height`].
//!
//! [`RecordingTransport`] keeps outbound requests in send order.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::host::{ExitMotion, Request, ToastSurface, Transport, VisualAttrs, WrapperId};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceOp {
    PrepareMount { wrapper: WrapperId, attrs: VisualAttrs },
    FixHeight { wrapper: WrapperId, height: f64 },
    FinishMount { wrapper: WrapperId },
    ApplyVisual { wrapper: WrapperId, attrs: VisualAttrs },
    SetFrontHeight { height: Option<f64> },
    SetVisibility { wrapper: WrapperId, visible: bool },
    ApplyExit { wrapper: WrapperId, motion: ExitMotion },
    AnimateFlashOut { key: String },
    RemoveFlash { key: String },
}

/// Snapshot of one toast element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    /// Last attributes written.
    pub attrs: VisualAttrs,
    /// `data-mounted`.
    pub mounted: bool,
    /// Whether transitions are enabled.
    pub transitions: bool,
    /// Whether the element accepts pointer input.
    pub pointer_events: bool,
    /// Whether the element is opaque.
    pub visible: bool,
    /// Explicit pixel height, once fixed.
    pub fixed_height: Option<f64>,
    /// Exit motion, once leaving.
    pub exit: Option<ExitMotion>,
}

impl ElementState {
    fn mounting(attrs: VisualAttrs) -> Self {
        Self {
            attrs,
            mounted: false,
            transitions: false,
            pointer_events: true,
            visible: true,
            fixed_height: None,
            exit: None,
        }
    }
}

/// Surface backed by plain maps.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    heights: HashMap<WrapperId, f64>,
    elements: HashMap<WrapperId, ElementState>,
    flashes: BTreeSet<String>,
    front_height: Option<f64>,
    ops: Vec<SurfaceOp>,
}

impl HeadlessSurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the height a toast will measure at.
    pub fn set_height(&mut self, wrapper: impl Into<WrapperId>, height: f64) {
        self.heights.insert(wrapper.into(), height);
    }

    /// Register a rendered flash.
    pub fn add_flash(&mut self, key: impl Into<String>) {
        self.flashes.insert(key.into());
    }

    /// Snapshot of one element.
    #[must_use]
    pub fn element(&self, wrapper: &str) -> Option<&ElementState> {
        self.elements.get(wrapper)
    }

    /// Drop an element's snapshot once the host removed it.
    pub fn forget(&mut self, wrapper: &str) {
        self.elements.remove(wrapper);
        self.heights.remove(wrapper);
    }

    /// Last published front height.
    #[must_use]
    pub fn front_height(&self) -> Option<f64> {
        self.front_height
    }

    /// Every call so far.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Drain the call log.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }
}

impl ToastSurface for HeadlessSurface {
    fn prepare_mount(&mut self, id: &WrapperId, attrs: &VisualAttrs) {
        self.elements
            .insert(id.clone(), ElementState::mounting(*attrs));
        self.ops.push(SurfaceOp::PrepareMount {
            wrapper: id.clone(),
            attrs: *attrs,
        });
    }

    fn measure_height(&mut self, id: &WrapperId) -> Option<f64> {
        self.heights.get(id).copied()
    }

    fn fix_height(&mut self, id: &WrapperId, height: f64) {
        if let Some(element) = self.elements.get_mut(id) {
            element.fixed_height = Some(height);
        }
        self.ops.push(SurfaceOp::FixHeight {
            wrapper: id.clone(),
            height,
        });
    }

    fn finish_mount(&mut self, id: &WrapperId) {
        if let Some(element) = self.elements.get_mut(id) {
            element.mounted = true;
            element.transitions = true;
        }
        self.ops.push(SurfaceOp::FinishMount { wrapper: id.clone() });
    }

    fn apply_visual(&mut self, id: &WrapperId, attrs: &VisualAttrs) {
        if let Some(element) = self.elements.get_mut(id) {
            // Offsets are left as they were while collapsed.
            let offset = attrs.offset.or(element.attrs.offset);
            element.attrs = VisualAttrs { offset, ..*attrs };
        }
        self.ops.push(SurfaceOp::ApplyVisual {
            wrapper: id.clone(),
            attrs: *attrs,
        });
    }

    fn set_front_height(&mut self, height: Option<f64>) {
        self.front_height = height;
        self.ops.push(SurfaceOp::SetFrontHeight { height });
    }

    fn set_visibility(&mut self, id: &WrapperId, visible: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            element.visible = visible;
            element.pointer_events = visible;
        }
        self.ops.push(SurfaceOp::SetVisibility {
            wrapper: id.clone(),
            visible,
        });
    }

    fn apply_exit(&mut self, id: &WrapperId, motion: ExitMotion) {
        if let Some(element) = self.elements.get_mut(id) {
            element.exit = Some(motion);
            element.visible = false;
        }
        self.ops.push(SurfaceOp::ApplyExit {
            wrapper: id.clone(),
            motion,
        });
    }

    fn has_flash(&self, key: &str) -> bool {
        self.flashes.contains(key)
    }

    fn animate_flash_out(&mut self, key: &str) {
        self.ops.push(SurfaceOp::AnimateFlashOut {
            key: key.to_string(),
        });
    }

    fn remove_flash(&mut self, key: &str) {
        self.flashes.remove(key);
        self.ops.push(SurfaceOp::RemoveFlash {
            key: key.to_string(),
        });
    }
}

/// Transport that keeps every request.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    requests: Vec<Request>,
}

impl RecordingTransport {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests in send order.
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Toast ids of every removal request, in send order.
    #[must_use]
    pub fn cleared(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter_map(|request| match request {
                Request::Clear { id } => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Drain the log.
    pub fn take(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, request: Request) {
        self.requests.push(request);
    }
}
