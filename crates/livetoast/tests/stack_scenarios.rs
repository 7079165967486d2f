#![forbid(unsafe_code)]

//! End-to-end stack scenarios over the headless host.
//!
//! Each test drives a [`ToastStack`] the way a page would: syncs, frames,
//! elapsed time and pointer input, then checks the registry, the surface
//! snapshot and the outbound requests.

use core::time::Duration;

use livetoast::headless::{HeadlessSurface, RecordingTransport, SurfaceOp};
use livetoast::{
    ContainerConfig, ContainerDataset, PointerEvent, Request, ToastElement, ToastPhase,
    ToastStack, ToastSurface, WrapperElement, WrapperId,
};
use pretty_assertions::assert_eq;

type Stack = ToastStack<HeadlessSurface, RecordingTransport>;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn stack(config: ContainerConfig) -> Stack {
    ToastStack::new(config, HeadlessSurface::new(), RecordingTransport::new())
}

fn toast(id: &str, duration: i64) -> WrapperElement {
    WrapperElement::new(id, ToastElement::new(id).duration_ms(duration).closable(true))
}

fn list(ids: &[&str], duration: i64) -> Vec<WrapperElement> {
    ids.iter().map(|id| toast(id, duration)).collect()
}

/// Sync, run the frame, let the settle delay pass.
fn sync_and_settle(stack: &mut Stack, wrappers: &[WrapperElement]) {
    stack.process(wrappers);
    stack.flush();
    stack.advance(ms(10));
}

fn registry_keys(stack: &Stack) -> Vec<String> {
    let mut keys: Vec<String> = stack
        .registry()
        .ids()
        .map(|id| id.as_str().to_string())
        .collect();
    keys.sort();
    keys
}

// ═════════════════════════════════════════════════════════════════════════
// Registry mirrors the external list
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn registry_tracks_external_ids_across_syncs() {
    let mut stack = stack(ContainerConfig::new());

    stack.process(&list(&["a", "b", "c"], 6000));
    assert_eq!(registry_keys(&stack), vec!["a", "b", "c"]);

    stack.process(&list(&["b", "d"], 6000));
    assert_eq!(registry_keys(&stack), vec!["b", "d"]);

    stack.process(&[]);
    assert!(stack.registry().is_empty());
    assert_eq!(stack.pending_timers(), 0);
}

#[test]
fn vanished_toast_timers_never_fire() {
    let mut stack = stack(ContainerConfig::new());
    sync_and_settle(&mut stack, &list(&["a"], 1000));
    assert!(stack.registry().get("a").is_some_and(|r| r.timer().is_some()));

    stack.process(&[]);
    stack.advance(ms(5000));
    assert!(stack.transport().requests().is_empty());
}

// ═════════════════════════════════════════════════════════════════════════
// Visibility cap
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn overflow_is_hidden_and_evicted_exactly_once() {
    let mut stack = stack(ContainerConfig::new().max_visible(3));
    let wrappers = list(&["a", "b", "c", "d", "e"], 6000);
    sync_and_settle(&mut stack, &wrappers);

    for id in ["a", "b", "c"] {
        let element = stack.surface().element(id).expect("element");
        assert!(element.visible && element.pointer_events, "{id} visible");
        let record = stack.registry().get(id).expect("record");
        assert!(!record.is_hidden());
        assert!(record.timer().is_some(), "{id} has a first-run timer");
    }
    for id in ["d", "e"] {
        let element = stack.surface().element(id).expect("element");
        assert!(!element.visible && !element.pointer_events, "{id} hidden");
        let record = stack.registry().get(id).expect("record");
        assert!(record.removal_scheduled());
        assert!(record.timer().is_none(), "{id} has no first-run timer");
    }

    // Re-syncing while still over the cap does not schedule again.
    stack.process(&wrappers);
    stack.process(&wrappers);

    stack.advance(ms(300));
    assert_eq!(stack.transport().cleared(), vec!["d", "e"]);

    // Server has not removed them yet.
    stack.process(&wrappers);
    stack.advance(ms(1000));
    assert_eq!(stack.transport().cleared(), vec!["d", "e"]);
}

#[test]
fn promoted_toast_keeps_living() {
    let mut stack = stack(ContainerConfig::new().max_visible(2));
    sync_and_settle(&mut stack, &list(&["a", "b", "c"], 6000));
    assert!(stack.registry().get("c").is_some_and(|r| r.eviction().is_some()));

    stack.advance(ms(100));
    stack.process(&list(&["b", "c"], 6000));

    let c = stack.registry().get("c").expect("record");
    assert!(!c.removal_scheduled());
    assert!(c.eviction().is_none());
    assert!(c.timer().is_some(), "promoted toast gets its own timer");
    assert!(stack.surface().element("c").expect("element").visible);

    stack.advance(ms(1000));
    assert!(stack.transport().cleared().is_empty());
}

#[test]
fn cap_is_refreshed_from_dataset() {
    let mut stack = stack(ContainerConfig::new());
    stack.refresh(&ContainerDataset {
        position: Some("top-left".into()),
        max_toasts: Some("1".into()),
    });
    sync_and_settle(&mut stack, &list(&["a", "b"], 6000));
    assert!(stack.registry().get("b").is_some_and(|r| r.is_hidden()));

    stack.refresh(&ContainerDataset {
        position: None,
        max_toasts: Some("0".into()),
    });
    assert_eq!(stack.config().max_visible, None);
}

// ═════════════════════════════════════════════════════════════════════════
// Stacking
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn removing_front_promotes_next() {
    let mut stack = stack(ContainerConfig::new());
    sync_and_settle(&mut stack, &list(&["a", "b", "c"], 6000));
    assert_eq!(stack.layout().front().map(|e| e.wrapper_id.as_str()), Some("a"));

    stack.process(&list(&["b", "c"], 6000));
    stack.flush();

    let b = stack.surface().element("b").expect("element");
    assert_eq!(b.attrs.rank, 0);
    assert!(b.attrs.is_front);
    assert_eq!(b.attrs.z_order, 2);
    assert_eq!(stack.layout().get("c").map(|a| a.rank), Some(1));
}

#[test]
fn expanded_offsets_with_cap() {
    let mut stack = stack(ContainerConfig::new().max_visible(3).gap(15.0));
    for id in ["a", "b", "c", "d"] {
        stack.surface_mut().set_height(id, 80.0);
    }
    stack.handle_pointer(&PointerEvent::ContainerEnter);
    assert!(stack.is_expanded());

    stack.process(&list(&["a", "b", "c", "d"], 6000));
    stack.flush();

    let offsets: Vec<Option<f64>> = ["a", "b", "c"]
        .iter()
        .map(|id| stack.layout().get(id).and_then(|a| a.offset))
        .collect();
    assert_eq!(offsets, vec![Some(0.0), Some(95.0), Some(190.0)]);
    assert!(!stack.surface().element("d").expect("element").visible);
    assert_eq!(stack.surface().front_height(), Some(80.0));

    stack.advance(ms(299));
    assert!(stack.transport().cleared().is_empty());
    stack.advance(ms(1));
    assert_eq!(stack.transport().cleared(), vec!["d"]);
    stack.advance(ms(10_000));
    assert_eq!(stack.transport().cleared(), vec!["d"]);
}

#[test]
fn removal_drops_toast_from_stacking_immediately() {
    let mut stack = stack(ContainerConfig::new());
    sync_and_settle(&mut stack, &list(&["a", "b"], 6000));

    stack.handle_pointer(&PointerEvent::CloseClick { wrapper: "a".into() });
    assert_eq!(stack.order(), &[WrapperId::from("b")]);
    assert_eq!(
        stack.registry().get("a").map(|r| r.phase()),
        Some(ToastPhase::Removing)
    );

    stack.flush();
    assert!(stack.layout().get("b").is_some_and(|a| a.is_front));
    assert!(stack.surface().element("a").expect("element").exit.is_some());
}

// ═════════════════════════════════════════════════════════════════════════
// Hover and timers
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn container_hover_pauses_every_timer() {
    let mut stack = stack(ContainerConfig::new());
    sync_and_settle(&mut stack, &list(&["a", "b"], 6000));

    stack.handle_pointer(&PointerEvent::ContainerEnter);
    assert_eq!(stack.pending_timers(), 0);
    stack.advance(Duration::from_secs(600));
    assert!(stack.transport().requests().is_empty());

    stack.handle_pointer(&PointerEvent::ContainerLeave);
    assert_eq!(stack.pending_timers(), 2);
    stack.advance(ms(5999));
    assert!(stack.transport().requests().is_empty());
    stack.advance(ms(1));
    let mut cleared = stack.transport().cleared();
    cleared.sort_unstable();
    assert_eq!(cleared, vec!["a", "b"]);
}

#[test]
fn toast_hover_rearms_with_short_duration() {
    let mut stack = stack(ContainerConfig::new());
    sync_and_settle(&mut stack, &list(&["a"], 10_000));
    let a: WrapperId = "a".into();

    stack.handle_pointer(&PointerEvent::ToastEnter { wrapper: a.clone() });
    assert!(stack.registry().get("a").is_some_and(|r| r.timer().is_none()));

    stack.advance(ms(500));
    stack.handle_pointer(&PointerEvent::ToastLeave { wrapper: a });
    assert_eq!(stack.next_deadline(), Some(ms(10 + 500 + 2000)));

    stack.advance(ms(1999));
    assert!(stack.transport().requests().is_empty());
    stack.advance(ms(1));
    assert_eq!(stack.transport().cleared(), vec!["a"]);
}

#[test]
fn toast_leave_inside_hovered_container_stays_paused() {
    let mut stack = stack(ContainerConfig::new());
    sync_and_settle(&mut stack, &list(&["a"], 6000));
    let a: WrapperId = "a".into();

    stack.handle_pointer(&PointerEvent::ContainerEnter);
    stack.handle_pointer(&PointerEvent::ToastEnter { wrapper: a.clone() });
    stack.handle_pointer(&PointerEvent::ToastLeave { wrapper: a });
    assert!(stack.is_expanded());
    assert_eq!(stack.pending_timers(), 0);

    stack.advance(Duration::from_secs(60));
    assert!(stack.transport().requests().is_empty());

    stack.handle_pointer(&PointerEvent::ContainerLeave);
    stack.advance(ms(5999));
    assert!(stack.transport().requests().is_empty());
    stack.advance(ms(1));
    assert_eq!(stack.transport().cleared(), vec!["a"]);
}

#[test]
fn zero_duration_never_gets_a_timer() {
    let mut stack = stack(ContainerConfig::new());
    sync_and_settle(&mut stack, &list(&["a"], 0));
    let a: WrapperId = "a".into();

    stack.handle_pointer(&PointerEvent::ToastEnter { wrapper: a.clone() });
    stack.handle_pointer(&PointerEvent::ToastLeave { wrapper: a });
    stack.handle_pointer(&PointerEvent::ContainerEnter);
    stack.handle_pointer(&PointerEvent::ContainerLeave);

    assert!(stack.registry().get("a").is_some_and(|r| r.timer().is_none()));
    assert_eq!(stack.pending_timers(), 0);
    stack.advance(Duration::from_secs(3600));
    assert!(stack.transport().requests().is_empty());
}

#[test]
fn toast_mounted_while_hovered_starts_on_leave() {
    let mut stack = stack(ContainerConfig::new());
    stack.handle_pointer(&PointerEvent::ContainerEnter);
    sync_and_settle(&mut stack, &list(&["a"], 3000));
    assert_eq!(stack.pending_timers(), 0);

    stack.handle_pointer(&PointerEvent::ContainerLeave);
    stack.advance(ms(3000));
    assert_eq!(stack.transport().cleared(), vec!["a"]);
}

// ═════════════════════════════════════════════════════════════════════════
// Idempotence
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn repeated_sync_changes_nothing() {
    let mut stack = stack(ContainerConfig::new().max_visible(2));
    let wrappers = list(&["a", "b", "c"], 6000);
    sync_and_settle(&mut stack, &wrappers);

    let timers = stack.pending_timers();
    let layout = stack.layout().clone();
    let snapshots: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|id| stack.surface().element(id).cloned())
        .collect();

    stack.process(&wrappers);
    stack.flush();
    stack.process(&wrappers);
    stack.flush();

    assert_eq!(stack.pending_timers(), timers);
    assert_eq!(stack.layout(), &layout);
    let after: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|id| stack.surface().element(id).cloned())
        .collect();
    assert_eq!(after, snapshots);
    assert!(stack.transport().requests().is_empty());
}

#[test]
fn syncs_before_a_frame_coalesce_to_latest_order() {
    let mut stack = stack(ContainerConfig::new());
    stack.process(&list(&["a", "b"], 6000));
    stack.process(&list(&["b", "a"], 6000));
    stack.process(&list(&["a", "b", "c"], 6000));
    assert!(stack.has_pending_frame());
    stack.surface_mut().take_ops();

    assert!(stack.flush());
    let visuals: Vec<(String, usize)> = stack
        .surface_mut()
        .take_ops()
        .into_iter()
        .filter_map(|op| match op {
            SurfaceOp::ApplyVisual { wrapper, attrs } => Some((wrapper.to_string(), attrs.rank)),
            _ => None,
        })
        .collect();
    assert_eq!(
        visuals,
        vec![("a".to_string(), 0), ("b".to_string(), 1), ("c".to_string(), 2)]
    );
    assert!(!stack.has_pending_frame());
}

// ═════════════════════════════════════════════════════════════════════════
// Markup edge cases
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn malformed_wrapper_is_skipped() {
    let mut stack = stack(ContainerConfig::new());
    let wrappers = vec![toast("a", 6000), WrapperElement::empty("broken"), toast("b", 6000)];
    sync_and_settle(&mut stack, &wrappers);

    assert_eq!(registry_keys(&stack), vec!["a", "b"]);
    assert_eq!(stack.layout().get("b").map(|a| a.rank), Some(1));

    // An existing toast whose child goes missing keeps its record.
    stack.process(&[toast("a", 6000), WrapperElement::empty("b")]);
    assert!(stack.registry().contains("b"));
    assert_eq!(stack.order(), &[WrapperId::from("a")]);
}

#[test]
fn element_already_removed_is_not_timed() {
    let mut stack = stack(ContainerConfig::new());
    let wrapper = WrapperElement::new("a", ToastElement::new("a").duration_ms(1000).removed(true));
    sync_and_settle(&mut stack, &[wrapper]);

    let record = stack.registry().get("a").expect("record");
    assert_eq!(record.phase(), ToastPhase::Removing);
    assert!(stack.order().is_empty());
    stack.handle_pointer(&PointerEvent::ContainerLeave);
    stack.advance(ms(5000));
    assert!(stack.transport().requests().is_empty());
}

#[test]
fn invalid_duration_falls_back_to_default() {
    let mut stack = stack(ContainerConfig::new());
    let wrapper = WrapperElement::new("a", ToastElement::new("a").duration_raw("soon"));
    sync_and_settle(&mut stack, &[wrapper]);

    stack.advance(ms(5999));
    assert!(stack.transport().requests().is_empty());
    stack.advance(ms(1));
    assert_eq!(stack.transport().cleared(), vec!["a"]);
}

// ═════════════════════════════════════════════════════════════════════════
// Buttons and flashes
// ═════════════════════════════════════════════════════════════════════════

#[test]
fn close_and_action_buttons() {
    let mut stack = stack(ContainerConfig::new());
    let wrapper = WrapperElement::new(
        "w1",
        ToastElement::new("t1").duration_ms(6000).closable(true).action("undo"),
    );
    sync_and_settle(&mut stack, &[wrapper]);
    let w1: WrapperId = "w1".into();

    stack.handle_pointer(&PointerEvent::ActionClick { wrapper: w1.clone() });
    assert_eq!(
        stack.transport().requests(),
        &[Request::Action {
            toast_id: "t1".into(),
            action: "undo".into()
        }]
    );
    assert_eq!(
        stack.registry().get("w1").map(|r| r.phase()),
        Some(ToastPhase::Interactive)
    );

    stack.handle_pointer(&PointerEvent::CloseClick { wrapper: w1.clone() });
    stack.handle_pointer(&PointerEvent::CloseClick { wrapper: w1 });
    stack.advance(ms(10_000));
    assert_eq!(stack.transport().cleared(), vec!["t1"]);
}

#[test]
fn flash_close_and_server_clear() {
    let mut stack = stack(ContainerConfig::new());
    stack.surface_mut().add_flash("info");
    stack.surface_mut().add_flash("error");

    stack.handle_pointer(&PointerEvent::FlashCloseClick {
        key: "info".into(),
        flash_type: "info".into(),
    });
    assert!(stack.surface().has_flash("info"));
    stack.advance(ms(300));
    assert!(!stack.surface().has_flash("info"));
    assert_eq!(
        stack.transport().requests(),
        &[
            Request::ClearFlash {
                key: "info".into(),
                flash_type: "info".into()
            },
            Request::PageClearFlash { key: "info".into() },
        ]
    );

    stack.clear_flash("error");
    assert!(!stack.surface().has_flash("error"));
    assert_eq!(stack.transport().requests().len(), 2);
}

#[test]
fn closing_a_missing_flash_sends_nothing() {
    let mut stack = stack(ContainerConfig::new());
    stack.handle_pointer(&PointerEvent::FlashCloseClick {
        key: "info".into(),
        flash_type: "info".into(),
    });
    assert_eq!(stack.pending_timers(), 0);
    stack.advance(ms(1000));
    assert!(stack.transport().requests().is_empty());
    assert!(stack.surface().ops().is_empty());
}
