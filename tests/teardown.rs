// Teardown paths: per-subscription independence, destroy finality, RAII
// handles, and scoped disposal.

mod common;

use atlas_events::{binding_scope, on_scope_teardown, EventManager, ListenerKind};
use common::{RecordingMap, RecordingMarker};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn unsubscribing_one_of_two_leaves_the_other_active() {
    let manager = EventManager::new();
    let map = RecordingMap::new();
    manager.set_target(Some(map.clone()));

    let clicks = manager.lazy_emitter::<u32>("click", ListenerKind::Custom);

    let a_count = Rc::new(Cell::new(0u32));
    let b_count = Rc::new(Cell::new(0u32));

    let a = a_count.clone();
    let sub_a = clicks.subscribe(move |n| a.set(a.get() + n));
    let b = b_count.clone();
    let _sub_b = clicks.subscribe(move |n| b.set(b.get() + n));

    assert_eq!(manager.active_listener_count(), 2);

    sub_a.unsubscribe();

    assert_eq!(map.removed(), 1, "only a's listener is removed");
    assert_eq!(manager.active_listener_count(), 1);

    map.fire("click", 5u32);
    assert_eq!(a_count.get(), 0);
    assert_eq!(b_count.get(), 5, "b still receives events");
}

#[test]
fn unsubscribe_is_idempotent() {
    let manager = EventManager::new();
    let map = RecordingMap::new();
    manager.set_target(Some(map.clone()));

    let sub = manager
        .lazy_emitter::<u32>("click", ListenerKind::Custom)
        .subscribe(|_| {});

    sub.unsubscribe();
    sub.unsubscribe();

    assert_eq!(map.removed(), 1, "removal handle is single-use");
}

#[test]
fn destroy_removes_everything_and_is_final() {
    let manager = EventManager::new();
    let map = RecordingMap::new();
    manager.set_target(Some(map.clone()));

    let clicks = manager.lazy_emitter::<u32>("click", ListenerKind::Custom);
    let count = Rc::new(Cell::new(0u32));
    let count_clone = count.clone();
    clicks
        .subscribe(move |n| count_clone.set(count_clone.get() + n))
        .forget();

    manager.destroy();
    assert!(manager.is_destroyed());
    assert_eq!(map.removed(), 1);
    assert_eq!(manager.active_listener_count(), 0);

    // A destroyed manager is permanently inert
    let late = RecordingMap::new();
    manager.set_target(Some(late.clone()));
    assert_eq!(late.added(), 0);

    map.fire("click", 1u32);
    assert_eq!(count.get(), 0, "no emissions after destroy");

    // Safe to call repeatedly
    manager.destroy();
}

#[test]
fn subscribing_after_destroy_yields_a_completed_stream() {
    let manager = EventManager::new();
    let clicks = manager.lazy_emitter::<u32>("click", ListenerKind::Custom);

    manager.destroy();

    let sub = clicks.subscribe(|_| {});
    assert!(sub.is_completed());
    assert_eq!(manager.pending_subscription_count(), 0);
}

#[test]
fn dropping_a_subscription_handle_unsubscribes() {
    let manager = EventManager::new();
    let map = RecordingMap::new();
    manager.set_target(Some(map.clone()));

    {
        let _sub = manager
            .lazy_emitter::<u32>("click", ListenerKind::Custom)
            .subscribe(|_| {});
        assert_eq!(map.live_listeners(), 1);
    }

    assert_eq!(map.live_listeners(), 0);
    assert_eq!(map.removed(), 1);
}

#[test]
fn forgotten_subscriptions_live_until_manager_teardown() {
    let map = RecordingMap::new();

    {
        let manager = EventManager::new();
        manager.set_target(Some(map.clone()));

        manager
            .lazy_emitter::<u32>("click", ListenerKind::Custom)
            .subscribe(|_| {})
            .forget();

        assert_eq!(map.live_listeners(), 1, "forget keeps the listener");
        // Last manager handle drops here
    }

    assert_eq!(map.live_listeners(), 0, "manager drop still cleans up");
}

#[test]
fn dom_listener_teardown_goes_through_remove_event_listener() {
    let manager = EventManager::new();
    let marker = RecordingMarker::new();
    manager.set_target(Some(marker.clone()));

    let sub = manager
        .lazy_emitter::<u32>("dblclick", ListenerKind::Native)
        .subscribe(|_| {});

    assert_eq!(marker.live_listeners(), 1);

    sub.unsubscribe();
    assert_eq!(marker.removed(), 1);
    assert_eq!(marker.live_listeners(), 0);
}

#[test]
fn scope_stop_destroys_managers_and_runs_teardowns_last_in_first_out() {
    let map = RecordingMap::new();
    let order = Rc::new(RefCell::new(Vec::new()));
    let scope = binding_scope(false);

    scope.run(|| {
        let manager = EventManager::new();
        manager.set_target(Some(map.clone()));
        manager
            .lazy_emitter::<u32>("click", ListenerKind::Custom)
            .subscribe(|_| {})
            .forget();

        let early = order.clone();
        on_scope_teardown(move || early.borrow_mut().push("registered-first"));
        let late = order.clone();
        on_scope_teardown(move || late.borrow_mut().push("registered-second"));
    });

    assert_eq!(map.live_listeners(), 1);

    scope.stop();

    assert_eq!(map.live_listeners(), 0);
    assert_eq!(
        *order.borrow(),
        vec!["registered-second", "registered-first"]
    );
}

#[test]
fn destroyed_manager_reports_empty_bookkeeping() {
    let manager = EventManager::new();
    let clicks = manager.lazy_emitter::<u32>("click", ListenerKind::Custom);
    let _queued = clicks.subscribe(|_| {});
    assert_eq!(manager.pending_subscription_count(), 1);

    manager.destroy();

    assert_eq!(manager.pending_subscription_count(), 0);
    assert_eq!(manager.active_listener_count(), 0);
    assert!(manager.target().is_none());
}
