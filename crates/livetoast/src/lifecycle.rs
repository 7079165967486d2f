#![forbid(unsafe_code)]

//! Lifecycle controller.
//!
//! [`ToastStack`] owns every piece of per-stack state and is the only thing
//! the host talks to. The host drives it in four ways:
//!
//! 1. [`ToastStack::process`] on every external sync, with the current
//!    ordered wrapper list.
//! 2. [`ToastStack::flush`] at each animation frame.
//! 3. [`ToastStack::advance`] as time passes.
//! 4. [`ToastStack::handle_pointer`] / [`ToastStack::clear_flash`] for input.
//!
//! # Phases
//!
//! ```text
//! absent ──sync──▶ mounting ──frame──▶ measured ──settle──▶ interactive
//!                      │                   │                     │
//!                      └───────────────────┴──── removal ────────┴──▶ removing
//!                                                                       │
//! absent ◀──────────────────── wrapper leaves the list ─────────────────┘
//! ```
//!
//! A removing toast keeps its registry entry until the list drops it, but it
//! no longer takes part in stacking, limiting or timers.

use core::time::Duration;
use std::collections::HashSet;

use livetoast_core::{
    DeterministicClock, FrameQueue, TimerId, debug, debug_span, info, trace, warn,
};

use crate::config::{ContainerConfig, ContainerDataset, duration_or_default};
use crate::flash::FlashBridge;
use crate::host::{ExitMotion, Request, ToastSurface, Transport, WrapperElement, WrapperId};
use crate::interaction::{Bindings, Intent, InteractionHandler, PointerEvent};
use crate::limiter::VisibilityLimiter;
use crate::registry::{Registry, ToastPhase};
use crate::scheduler::{Deferred, TimerScheduler};
use crate::stacking::{StackLayout, StackingEngine};

/// One toast stack bound to a surface and a transport.
#[derive(Debug)]
pub struct ToastStack<S, T> {
    config: ContainerConfig,
    clock: DeterministicClock,
    scheduler: TimerScheduler,
    frames: FrameQueue<WrapperId>,
    registry: Registry,
    stacking: StackingEngine,
    limiter: VisibilityLimiter,
    handlers: InteractionHandler,
    flash: FlashBridge,
    order: Vec<WrapperId>,
    expanded: bool,
    layout: StackLayout,
    surface: S,
    transport: T,
}

impl<S: ToastSurface, T: Transport> ToastStack<S, T> {
    /// Create an empty stack.
    pub fn new(config: ContainerConfig, surface: S, transport: T) -> Self {
        Self {
            scheduler: TimerScheduler::new(config.timings),
            stacking: StackingEngine::new(config.gap),
            config,
            clock: DeterministicClock::new(),
            frames: FrameQueue::new(),
            registry: Registry::new(),
            limiter: VisibilityLimiter,
            handlers: InteractionHandler::new(),
            flash: FlashBridge::new(),
            order: Vec::new(),
            expanded: false,
            layout: StackLayout::default(),
            surface,
            transport,
        }
    }

    /// Re-read the container's data attributes.
    pub fn refresh(&mut self, dataset: &ContainerDataset) {
        self.config.apply_dataset(dataset);
        trace!(
            position = %self.config.position,
            max_visible = self.config.max_visible.map_or(0, |max| max.get()),
            "container config refreshed"
        );
    }

    /// Reconcile against the current external list.
    ///
    /// Vanished ids are dropped first, then existing records are refreshed and
    /// new ones mounted, then the limiter runs. Layout reads wait for the
    /// next [`flush`](Self::flush).
    pub fn process(&mut self, wrappers: &[WrapperElement]) {
        let span = debug_span!("process", wrappers = wrappers.len());
        let _guard = span.enter();
        let now = self.clock.now();

        let present: HashSet<&str> = wrappers.iter().map(|w| w.id.as_str()).collect();
        let vanished: Vec<WrapperId> = self
            .registry
            .ids()
            .filter(|id| !present.contains(id.as_str()))
            .cloned()
            .collect();
        for id in &vanished {
            self.registry.remove(id.as_str(), &mut self.scheduler);
            self.handlers.unbind(id.as_str());
            self.frames.forget(id);
            debug!(wrapper = %id, "toast left the list");
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(wrappers.len());
        let mut order = Vec::with_capacity(wrappers.len());
        let mut mounted = Vec::new();
        for wrapper in wrappers {
            let id = &wrapper.id;
            if !seen.insert(id.as_str()) {
                warn!(wrapper = %id, "duplicate wrapper id skipped");
                continue;
            }
            let Some(toast) = wrapper.toast.as_ref() else {
                warn!(wrapper = %id, "wrapper has no toast element, skipped");
                continue;
            };

            let created =
                self.registry
                    .upsert(id, &toast.toast_id, self.config.default_height);
            let Some(record) = self.registry.get_mut(id.as_str()) else {
                continue;
            };
            record.auto_dismiss = duration_or_default(
                toast.duration.as_deref(),
                self.config.timings.default_duration,
            );
            if toast.removed && !record.is_removing() {
                self.scheduler.cancel_all(record);
                record.phase = ToastPhase::Removing;
                self.frames.forget(id);
                debug!(wrapper = %id, "toast arrived already removed");
            }
            if created && !record.is_removing() {
                mounted.push(id.clone());
            }
            self.handlers.bind(
                id,
                Bindings {
                    close: toast.closable,
                    action: toast.action.clone(),
                },
            );
            if !record.is_removing() {
                order.push(id.clone());
            }
        }
        self.order = order;

        if !mounted.is_empty() {
            let layout = self
                .stacking
                .recompute(self.registry.all(&self.order), self.expanded);
            for id in &mounted {
                if let Some(attrs) = layout.get(id.as_str()) {
                    self.surface.prepare_mount(id, attrs);
                    self.frames.defer(id.clone());
                    debug!(wrapper = %id, rank = attrs.rank, "toast mounted");
                }
            }
        }

        self.frames.request_recompute();
        self.apply_limit(now);
    }

    /// Run work deferred to the animation frame. Returns `false` if there was
    /// nothing to do.
    pub fn flush(&mut self) -> bool {
        let batch = self.frames.take();
        if batch.is_empty() {
            return false;
        }
        let now = self.clock.now();
        let mut recompute = batch.recompute;
        for id in &batch.tasks {
            recompute |= self.measure(id, now);
        }
        if recompute {
            self.recompute();
        }
        trace!(frame = batch.frame_idx, recompute, "frame flushed");
        true
    }

    /// Advance time by `dt`, firing every timer that falls due.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.clock.now().saturating_add(dt);
        self.advance_to(target);
    }

    /// Advance time to `target`. Earlier targets only fire already-due timers.
    pub fn advance_to(&mut self, target: Duration) {
        let target = target.max(self.clock.now());
        while let Some(deadline) = self
            .scheduler
            .next_deadline()
            .filter(|deadline| *deadline <= target)
        {
            self.clock.set(deadline);
            while let Some((fired, deferred)) = self.scheduler.pop_due(deadline) {
                self.fire(fired, deferred, deadline);
            }
        }
        self.clock.set(target);
    }

    /// Apply pointer input.
    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        let now = self.clock.now();
        for intent in self.handlers.translate(event) {
            match intent {
                Intent::Expand(expanded) => {
                    if self.expanded != expanded {
                        self.expanded = expanded;
                        self.frames.request_recompute();
                    }
                }
                Intent::PauseAll => {
                    for record in self.registry.records_mut() {
                        self.scheduler.pause(record);
                    }
                }
                Intent::RearmAll => {
                    for record in self.registry.records_mut() {
                        if record.phase == ToastPhase::Interactive {
                            self.scheduler.rearm(now, record);
                        }
                    }
                }
                Intent::Pause(id) => {
                    if let Some(record) = self.registry.get_mut(id.as_str()) {
                        self.scheduler.pause(record);
                    }
                }
                Intent::Resume(id) => {
                    // While expanded the record stays idle; leaving the
                    // container rearms it.
                    if let Some(record) = self.registry.get_mut(id.as_str()) {
                        if self.expanded {
                            self.scheduler.pause(record);
                        } else {
                            self.scheduler.resume(now, record);
                        }
                    }
                }
                Intent::Close(id) => {
                    self.request_removal(id.as_str());
                }
                Intent::Action { wrapper, label } => {
                    if let Some(record) = self.registry.get(wrapper.as_str()) {
                        info!(wrapper = %wrapper, action = %label, "action requested");
                        self.transport.send(Request::Action {
                            toast_id: record.toast_id.clone(),
                            action: label,
                        });
                    }
                }
                Intent::FlashClose { key, flash_type } => {
                    self.flash.begin_close(
                        &key,
                        &flash_type,
                        now,
                        &mut self.scheduler,
                        &mut self.surface,
                    );
                }
            }
        }
    }

    /// Ask the server to drop a toast and start its exit animation.
    ///
    /// Returns `false` for unknown ids and toasts already leaving.
    pub fn request_removal(&mut self, wrapper: &str) -> bool {
        let Some(record) = self.registry.get_mut(wrapper) else {
            debug!(wrapper, "removal for unknown toast ignored");
            return false;
        };
        if record.is_removing() {
            debug!(wrapper, "removal already requested");
            return false;
        }
        self.scheduler.cancel_all(record);
        record.phase = ToastPhase::Removing;
        let id = record.wrapper_id.clone();
        let toast_id = record.toast_id.clone();

        info!(wrapper = %id, toast = %toast_id, "removal requested");
        self.transport.send(Request::Clear { id: toast_id });
        self.surface
            .apply_exit(&id, ExitMotion::for_position(self.config.position));
        self.order.retain(|other| *other != id);
        self.frames.forget(&id);
        self.frames.request_recompute();
        true
    }

    /// The server cleared a flash: remove it without animation.
    pub fn clear_flash(&mut self, key: &str) {
        debug!(key, "flash cleared by server");
        self.flash
            .clear_by_key(key, &mut self.scheduler, &mut self.surface);
    }

    /// Tear down: cancel every timer and forget all state.
    pub fn destroy(&mut self) {
        self.flash.clear(&mut self.scheduler);
        self.scheduler.clear();
        self.registry.clear();
        self.handlers.clear();
        self.frames.clear();
        self.order.clear();
        self.expanded = false;
        self.layout = StackLayout::default();
        debug!("toast stack destroyed");
    }

    /// Current configuration.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Current host time.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Whether a frame has work queued.
    pub fn has_pending_frame(&self) -> bool {
        self.frames.has_pending()
    }

    /// Whether the pointer is over the container.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Toasts taking part in stacking, front first.
    pub fn order(&self) -> &[WrapperId] {
        &self.order
    }

    /// Registry view.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Layout from the last recompute.
    pub fn layout(&self) -> &StackLayout {
        &self.layout
    }

    /// Surface view.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access for the host.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Transport view.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable transport access for the host.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn apply_limit(&mut self, now: Duration) {
        let outcome = self.limiter.apply(
            &mut self.registry,
            &self.order,
            self.config.max_visible,
            &mut self.scheduler,
            now,
        );
        for id in &outcome.hidden {
            self.surface.set_visibility(id, false);
        }
        for id in &outcome.shown {
            self.surface.set_visibility(id, true);
        }
        if self.expanded {
            return;
        }
        for id in &outcome.rescinded {
            if let Some(record) = self.registry.get_mut(id.as_str()) {
                if record.phase == ToastPhase::Interactive {
                    self.scheduler.rearm(now, record);
                }
            }
        }
    }

    fn measure(&mut self, id: &WrapperId, now: Duration) -> bool {
        let Some(record) = self.registry.get_mut(id.as_str()) else {
            return false;
        };
        if record.phase != ToastPhase::Mounting {
            return false;
        }
        match self.surface.measure_height(id) {
            Some(height) => {
                record.set_measured_height(height);
                self.surface.fix_height(id, height);
                debug!(wrapper = %id, height, "toast measured");
            }
            None => {
                debug!(wrapper = %id, "no layout yet, keeping estimate");
            }
        }
        record.phase = ToastPhase::Measured;
        self.scheduler.schedule_settle(now, record);
        true
    }

    fn recompute(&mut self) {
        let layout = self
            .stacking
            .recompute(self.registry.all(&self.order), self.expanded);
        for entry in &layout.entries {
            self.surface.apply_visual(&entry.wrapper_id, &entry.attrs);
        }
        self.surface.set_front_height(layout.front_height);
        self.layout = layout;
    }

    fn fire(&mut self, fired: TimerId, deferred: Deferred, now: Duration) {
        match deferred {
            Deferred::AutoDismiss(id) => {
                let Some(record) = self.registry.get_mut(id.as_str()) else {
                    debug!(wrapper = %id, "auto-dismiss for unknown toast ignored");
                    return;
                };
                if record.timer != Some(fired) {
                    debug!(wrapper = %id, "superseded auto-dismiss ignored");
                    return;
                }
                record.timer = None;
                debug!(wrapper = %id, "auto-dismiss timer expired");
                self.request_removal(id.as_str());
            }
            Deferred::Settle(id) => self.settle(&id, fired, now),
            Deferred::Evict(id) => {
                let Some(record) = self.registry.get_mut(id.as_str()) else {
                    debug!(wrapper = %id, "eviction for unknown toast ignored");
                    return;
                };
                if record.eviction != Some(fired) {
                    debug!(wrapper = %id, "superseded eviction ignored");
                    return;
                }
                record.eviction = None;
                self.request_removal(id.as_str());
            }
            Deferred::FlashExit { key, flash_type } => {
                self.flash.complete_close(
                    fired,
                    &key,
                    &flash_type,
                    &mut self.surface,
                    &mut self.transport,
                );
            }
        }
    }

    fn settle(&mut self, id: &WrapperId, fired: TimerId, now: Duration) {
        let rank = self.order.iter().position(|other| other == id);
        let Some(record) = self.registry.get_mut(id.as_str()) else {
            debug!(wrapper = %id, "settle for unknown toast ignored");
            return;
        };
        if record.settle != Some(fired) || record.phase != ToastPhase::Measured {
            return;
        }
        record.settle = None;
        record.phase = ToastPhase::Interactive;
        self.surface.finish_mount(id);

        let within_cap = match (rank, self.config.max_visible) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(rank), Some(max)) => rank < max.get(),
        };
        if self.expanded || record.removal_scheduled || !within_cap {
            debug!(wrapper = %id, expanded = self.expanded, "first-run timer deferred");
            return;
        }
        self.scheduler.start_first_run(now, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessSurface, RecordingTransport};
    use crate::host::ToastElement;

    type Stack = ToastStack<HeadlessSurface, RecordingTransport>;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn stack(config: ContainerConfig) -> Stack {
        ToastStack::new(config, HeadlessSurface::new(), RecordingTransport::new())
    }

    fn wrapper(id: &str, duration: i64) -> WrapperElement {
        WrapperElement::new(id, ToastElement::new(id).duration_ms(duration))
    }

    #[test]
    fn mount_measure_settle() {
        let mut stack = stack(ContainerConfig::new());
        stack.surface_mut().set_height("a", 64.0);
        stack.process(&[wrapper("a", 6000)]);

        let record = stack.registry().get("a").expect("record");
        assert_eq!(record.phase(), ToastPhase::Mounting);
        assert_eq!(record.height(), 80.0);

        assert!(stack.flush());
        let record = stack.registry().get("a").expect("record");
        assert_eq!(record.phase(), ToastPhase::Measured);
        assert_eq!(record.height(), 64.0);
        assert_eq!(stack.surface().front_height(), Some(64.0));

        stack.advance(ms(10));
        let record = stack.registry().get("a").expect("record");
        assert_eq!(record.phase(), ToastPhase::Interactive);
        assert!(record.timer().is_some());
        assert!(stack.surface().element("a").expect("element").mounted);
    }

    #[test]
    fn flush_without_work_is_noop() {
        let mut stack = stack(ContainerConfig::new());
        assert!(!stack.flush());
        stack.process(&[]);
        assert!(stack.flush());
        assert!(!stack.flush());
    }

    #[test]
    fn timer_fired_mid_advance_uses_its_own_deadline() {
        let mut stack = stack(ContainerConfig::new());
        stack.process(&[wrapper("a", 1000)]);
        stack.flush();
        // settle at 10, expiry at 1010, all inside one advance
        stack.advance(ms(5000));
        assert_eq!(stack.transport().cleared(), vec!["a"]);
        assert_eq!(stack.now(), ms(5000));
    }

    #[test]
    fn removal_is_requested_once() {
        let mut stack = stack(ContainerConfig::new());
        stack.process(&[wrapper("a", 0)]);
        assert!(stack.request_removal("a"));
        assert!(!stack.request_removal("a"));
        assert!(!stack.request_removal("ghost"));
        assert_eq!(stack.transport().cleared(), vec!["a"]);
        assert!(stack.order().is_empty());
        assert!(stack.registry().contains("a"));

        stack.process(&[]);
        assert!(!stack.registry().contains("a"));
    }

    #[test]
    fn destroy_cancels_everything() {
        let mut stack = stack(ContainerConfig::new().max_visible(1));
        stack.process(&[wrapper("a", 6000), wrapper("b", 6000)]);
        stack.flush();
        assert!(stack.pending_timers() > 0);

        stack.destroy();
        assert_eq!(stack.pending_timers(), 0);
        assert!(stack.registry().is_empty());
        stack.advance(ms(60_000));
        assert!(stack.transport().requests().is_empty());
    }

    #[test]
    fn exit_direction_follows_position() {
        let config = ContainerConfig::new().position(crate::config::ToastPosition::TopRight);
        let mut stack = stack(config);
        stack.process(&[wrapper("a", 0)]);
        stack.request_removal("a");
        let exit = stack.surface().element("a").and_then(|e| e.exit);
        assert_eq!(exit.map(|m| m.direction), Some(crate::host::SlideDirection::Up));
    }
}
