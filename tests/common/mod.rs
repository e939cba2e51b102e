// Shared recording targets for the integration suites.
#![allow(dead_code)]

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use atlas_events::{DomEventHooks, DomToken, EventCallback, ListenerHandle, NativeTarget};

// =============================================================================
// RECORDING MAP (custom-kind capability)
// =============================================================================

#[derive(Default)]
struct MapState {
    listeners: RefCell<Vec<(u64, String, EventCallback)>>,
    next_id: Cell<u64>,
    added: Cell<usize>,
    removed: Cell<usize>,
}

/// Custom-kind target that records every registration and removal.
#[derive(Default)]
pub struct RecordingMap {
    state: Rc<MapState>,
    decline: Cell<bool>,
}

impl RecordingMap {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// A target that refuses to hand out registration handles.
    pub fn declined() -> Rc<Self> {
        let target = Self::default();
        target.decline.set(true);
        Rc::new(target)
    }

    /// Raise `event` to every currently registered listener, in
    /// registration order.
    pub fn fire<T: 'static>(&self, event: &str, payload: T) {
        let payload: Rc<dyn Any> = Rc::new(payload);
        let callbacks: Vec<EventCallback> = self
            .state
            .listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| e == event)
            .map(|(_, _, cb)| cb.clone())
            .collect();
        for cb in callbacks {
            cb(payload.clone());
        }
    }

    /// Registrations seen over this target's lifetime.
    pub fn added(&self) -> usize {
        self.state.added.get()
    }

    /// Removals seen over this target's lifetime.
    pub fn removed(&self) -> usize {
        self.state.removed.get()
    }

    /// Listeners currently registered.
    pub fn live_listeners(&self) -> usize {
        self.state.listeners.borrow().len()
    }
}

impl NativeTarget for RecordingMap {
    fn add_listener(&self, event: &str, callback: EventCallback) -> Option<ListenerHandle> {
        if self.decline.get() {
            return None;
        }

        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);
        self.state.added.set(self.state.added.get() + 1);
        self.state
            .listeners
            .borrow_mut()
            .push((id, event.to_string(), callback));

        let state = self.state.clone();
        Some(ListenerHandle::new(move || {
            state.listeners.borrow_mut().retain(|(lid, _, _)| *lid != id);
            state.removed.set(state.removed.get() + 1);
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// RECORDING MARKER (DOM-style capability only)
// =============================================================================

/// Native-kind target exposing only the DOM hook pair.
#[derive(Default)]
pub struct RecordingMarker {
    listeners: RefCell<Vec<(u64, String, EventCallback)>>,
    next_id: Cell<u64>,
    removed: Cell<usize>,
}

impl RecordingMarker {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn fire<T: 'static>(&self, event: &str, payload: T) {
        let payload: Rc<dyn Any> = Rc::new(payload);
        let callbacks: Vec<EventCallback> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| e == event)
            .map(|(_, _, cb)| cb.clone())
            .collect();
        for cb in callbacks {
            cb(payload.clone());
        }
    }

    pub fn removed(&self) -> usize {
        self.removed.get()
    }

    pub fn live_listeners(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl NativeTarget for RecordingMarker {
    fn add_listener(&self, _event: &str, _callback: EventCallback) -> Option<ListenerHandle> {
        None
    }

    fn dom_hooks(&self) -> Option<&dyn DomEventHooks> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl DomEventHooks for RecordingMarker {
    fn add_event_listener(&self, event: &str, callback: EventCallback) -> Option<DomToken> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners
            .borrow_mut()
            .push((id, event.to_string(), callback));
        Some(DomToken::new(id))
    }

    fn remove_event_listener(&self, _event: &str, token: DomToken) {
        self.listeners
            .borrow_mut()
            .retain(|(id, _, _)| *id != token.raw());
        self.removed.set(self.removed.get() + 1);
    }
}

// =============================================================================
// TAGGED TARGET (shared add/remove log across targets)
// =============================================================================

/// Custom-kind target that writes `add:<tag>` / `remove:<tag>` entries into
/// a log shared between targets, for cross-target ordering assertions.
pub struct TaggedTarget {
    tag: &'static str,
    log: Rc<RefCell<Vec<String>>>,
}

impl TaggedTarget {
    pub fn new(tag: &'static str, log: Rc<RefCell<Vec<String>>>) -> Rc<Self> {
        Rc::new(Self { tag, log })
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

impl NativeTarget for TaggedTarget {
    fn add_listener(&self, _event: &str, _callback: EventCallback) -> Option<ListenerHandle> {
        self.log.borrow_mut().push(format!("add:{}", self.tag));

        let log = self.log.clone();
        let tag = self.tag;
        Some(ListenerHandle::new(move || {
            log.borrow_mut().push(format!("remove:{}", tag));
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
