// ============================================================================
// atlas-events - Type Definitions
// Capability traits and handle types for the native event boundary
// ============================================================================

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::constants::*;

// =============================================================================
// PAYLOAD AND CALLBACK ALIASES
// =============================================================================
//
// The native side of the boundary is type-erased: a native object raises
// events as opaque payloads, and the typed surface (LazyEmitter<T>) recovers
// the concrete type by downcasting. This mirrors how the rest of the crate
// keeps graph-level plumbing untyped and puts types only at the public API.
// =============================================================================

/// Opaque event payload raised by a native object.
pub type EventPayload = Rc<dyn Any>;

/// Callback registered against a native object's event system.
///
/// `Rc` so the same callback can be cloned into the target's own bookkeeping
/// and invoked any number of times.
pub type EventCallback = Rc<dyn Fn(EventPayload)>;

// =============================================================================
// LISTENER KIND
// =============================================================================

/// Which of the two attachment mechanisms a listener uses.
///
/// Most native objects expose the generic `add_listener` capability. A few
/// (historically, certain marker types) only expose DOM-style
/// `add_event_listener`/`remove_event_listener`, selected with `Native`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Generic `add_listener(event, callback) -> handle` registration
    Custom,
    /// DOM-style `add_event_listener`/`remove_event_listener` pair
    Native,
}

impl ListenerKind {
    /// The flag bit for this kind
    pub(crate) fn flag(self) -> u32 {
        match self {
            ListenerKind::Custom => CUSTOM_KIND,
            ListenerKind::Native => NATIVE_KIND,
        }
    }
}

// =============================================================================
// LISTENER HANDLE
// =============================================================================

/// Single-use removal capability returned from attaching a listener.
///
/// Invoking [`remove`](ListenerHandle::remove) more than once is a guarded
/// no-op: the removal closure is taken out of the handle on first use.
pub struct ListenerHandle {
    remove: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl ListenerHandle {
    /// Wrap a removal closure into a handle.
    pub fn new(remove: impl FnOnce() + 'static) -> Self {
        Self {
            remove: RefCell::new(Some(Box::new(remove))),
        }
    }

    /// Remove the listener this handle was issued for.
    ///
    /// Safe to call multiple times; only the first call runs the removal.
    pub fn remove(&self) {
        if let Some(f) = self.remove.borrow_mut().take() {
            f();
        }
    }

    /// Whether the removal has already run.
    pub fn is_spent(&self) -> bool {
        self.remove.borrow().is_none()
    }
}

impl fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("spent", &self.is_spent())
            .finish()
    }
}

// =============================================================================
// DOM-STYLE CAPABILITY
// =============================================================================

/// Opaque registration token minted by a [`DomEventHooks`] implementation.
///
/// The target chooses the raw values; the manager only carries them back to
/// `remove_event_listener`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomToken(u64);

impl DomToken {
    /// Mint a token from a target-chosen raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value this token was minted with.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// DOM-style event registration pair.
///
/// Targets that expose this capability can host [`ListenerKind::Native`]
/// listeners. Returning `None` from `add_event_listener` means the target
/// declines to raise that event (the stream completes empty).
pub trait DomEventHooks {
    /// Register `callback` for `event`, returning a token for later removal.
    fn add_event_listener(&self, event: &str, callback: EventCallback) -> Option<DomToken>;

    /// Remove the registration identified by `token`.
    fn remove_event_listener(&self, event: &str, token: DomToken);
}

// =============================================================================
// NATIVE TARGET
// =============================================================================

/// A native object whose events can be bound - a map, marker, shape, layer.
///
/// The manager treats targets as opaque: it only ever registers and removes
/// listeners through this trait, and is handed targets explicitly (there is
/// no ambient registry to reach into).
pub trait NativeTarget: Any {
    /// Register `callback` for `event` through the generic capability.
    ///
    /// Returning `None` models a target that silently declines to expose the
    /// event; the subscription completes without ever emitting.
    fn add_listener(&self, event: &str, callback: EventCallback) -> Option<ListenerHandle>;

    /// The DOM-style capability pair, for targets that have one.
    ///
    /// Targets lacking these hooks cannot host [`ListenerKind::Native`]
    /// listeners; attempting it is a misuse diagnosed in debug builds.
    fn dom_hooks(&self) -> Option<&dyn DomEventHooks> {
        None
    }

    /// Upcast to `Any` so owners can downcast the published target back to
    /// its concrete type.
    fn as_any(&self) -> &dyn Any;
}

// =============================================================================
// TESTS
// =============================================================================
