// ============================================================================
// atlas-events - Subscriptions
// Per-subscription bookkeeping and the consumer-facing handle
// ============================================================================
//
// Every call to LazyEmitter::subscribe creates one BindingInner: the record
// the manager queues while no target exists and tracks in its active list
// once a native listener is registered. The public Subscription wraps it and
// tears the listener down on drop unless explicitly preserved.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::types::{EventPayload, ListenerHandle, ListenerKind};
use crate::events::manager::ManagerInner;

// =============================================================================
// BINDING INNER
// =============================================================================

/// Internal state for a single subscription.
///
/// Held by the manager (pending queue or active list), by the native
/// callback (weakly), and by the consumer's `Subscription` handle.
pub(crate) struct BindingInner {
    /// Flags bitmask (kind + state)
    flags: Cell<u32>,

    /// The native event name this subscription listens for
    event: String,

    /// Type-erased delivery: downcasts the payload and invokes the consumer
    deliver: Box<dyn Fn(EventPayload)>,

    /// Removal handle for the currently registered native listener
    handle: RefCell<Option<ListenerHandle>>,

    /// The owning manager, for bookkeeping on teardown
    manager: Weak<ManagerInner>,
}

impl BindingInner {
    pub(crate) fn new(
        kind: ListenerKind,
        event: String,
        deliver: Box<dyn Fn(EventPayload)>,
        manager: Weak<ManagerInner>,
    ) -> Rc<Self> {
        Rc::new(Self {
            flags: Cell::new(kind.flag() | PENDING),
            event,
            deliver,
            handle: RefCell::new(None),
            manager,
        })
    }

    pub(crate) fn kind(&self) -> ListenerKind {
        if self.flags.get() & NATIVE_KIND != 0 {
            ListenerKind::Native
        } else {
            ListenerKind::Custom
        }
    }

    pub(crate) fn event(&self) -> &str {
        &self.event
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.flags.get() & PENDING != 0
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.flags.get() & ATTACHED != 0
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.flags.get() & COMPLETED != 0
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.flags.get() & CLOSED != 0
    }

    pub(crate) fn is_preserved(&self) -> bool {
        self.flags.get() & PRESERVED != 0
    }

    pub(crate) fn mark_attached(&self) {
        self.flags.set((self.flags.get() & STATUS_MASK) | ATTACHED);
    }

    /// The stream finished without ever attaching or after detachment; a
    /// completed subscription is also closed.
    pub(crate) fn mark_completed(&self) {
        self.flags
            .set((self.flags.get() & STATUS_MASK) | COMPLETED | CLOSED);
    }

    pub(crate) fn mark_closed(&self) {
        self.flags.set((self.flags.get() & STATUS_MASK) | CLOSED);
    }

    pub(crate) fn mark_preserved(&self) {
        self.flags.set(self.flags.get() | PRESERVED);
    }

    pub(crate) fn set_handle(&self, handle: ListenerHandle) {
        *self.handle.borrow_mut() = Some(handle);
    }

    /// Remove the native listener, if one is registered. The handle is
    /// single-use, so this can never remove twice.
    pub(crate) fn remove_native(&self) {
        if let Some(handle) = self.handle.borrow_mut().take() {
            handle.remove();
        }
    }

    /// Deliver a payload to the consumer callback.
    pub(crate) fn deliver(&self, payload: EventPayload) {
        (self.deliver)(payload);
    }

    /// Full teardown for this subscription only: remove the native listener
    /// and drop the manager's bookkeeping entry. Idempotent.
    pub(crate) fn close(self: &Rc<Self>) {
        if self.is_closed() {
            return;
        }

        self.remove_native();
        self.mark_closed();

        if let Some(manager) = self.manager.upgrade() {
            manager.forget_binding(self);
        }
    }
}

// =============================================================================
// SUBSCRIPTION (Public handle)
// =============================================================================

/// Handle to one live subscription on a [`LazyEmitter`](crate::LazyEmitter).
///
/// Dropping the handle unsubscribes, removing only this subscription's
/// native listener. Call [`forget`](Subscription::forget) to keep the
/// listener alive for the manager's lifetime instead.
pub struct Subscription {
    inner: Rc<BindingInner>,
}

impl Subscription {
    pub(crate) fn new(inner: Rc<BindingInner>) -> Self {
        Self { inner }
    }

    /// Synchronously remove this subscription's native listener and its
    /// bookkeeping entry. Other subscriptions are unaffected.
    ///
    /// Safe to call multiple times.
    pub fn unsubscribe(&self) {
        self.inner.close();
    }

    /// Whether this subscription is queued, waiting for a target.
    pub fn is_pending(&self) -> bool {
        self.inner.is_pending()
    }

    /// Whether a native listener is currently registered.
    pub fn is_attached(&self) -> bool {
        self.inner.is_attached()
    }

    /// Whether the stream completed without error (the target yielded no
    /// registration handle, so no events will ever arrive).
    pub fn is_completed(&self) -> bool {
        self.inner.is_completed()
    }

    /// Whether the subscription is torn down (unsubscribed, discarded on
    /// target replacement, completed, or the manager was destroyed).
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Keep the listener registered after this handle is dropped.
    ///
    /// The subscription then lives until the manager tears it down (target
    /// replacement or destroy).
    pub fn forget(self) {
        self.inner.mark_preserved();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.inner.is_preserved() {
            self.inner.close();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.inner.event())
            .field("is_pending", &self.inner.is_pending())
            .field("is_attached", &self.inner.is_attached())
            .field("is_completed", &self.inner.is_completed())
            .field("is_closed", &self.inner.is_closed())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
