// ============================================================================
// atlas-events - Event Manager
// Lazy listener attachment against a late-arriving native target
// ============================================================================
//
// One manager per wrapper component instance. Consumers subscribe to named
// event streams before the component's native object exists; the manager
// queues those subscriptions and attaches them, in order, the moment a
// target is published. Replacing the target tears down every listener bound
// to the old one first. Destroying the manager makes it permanently inert.
//
// Key features:
// - Deferred attachment (subscribe before the native object is constructed)
// - Per-subscription native listener bookkeeping with single-use removal
// - Reference-identity no-op on redundant set_target calls
// - Zone-marshaled delivery (registration/removal stay outside the zone)
// - RAII destroy on last handle drop
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::binding::scope::register_manager_with_scope;
use crate::core::context::{default_zone, EventZone};
use crate::core::types::{EventCallback, EventPayload, ListenerHandle, ListenerKind, NativeTarget};
use crate::error::BindingError;
use crate::events::emitter::LazyEmitter;
use crate::events::subscription::BindingInner;

// =============================================================================
// TARGET IDENTITY
// =============================================================================

/// Thin pointer identifying a target allocation, for the redundant
/// `set_target` no-op check.
fn target_identity(target: &Rc<dyn NativeTarget>) -> *const () {
    Rc::as_ptr(target) as *const ()
}

/// Callback observing the manager's published target.
type TargetWatcher = Rc<dyn Fn(Option<&Rc<dyn NativeTarget>>)>;

// =============================================================================
// MANAGER INNER
// =============================================================================

/// Internal manager state. Single-owner, single-threaded: every mutation is
/// driven by the owning component's thread of control, so interior
/// mutability is cells, not locks.
pub(crate) struct ManagerInner {
    /// Zone used to marshal deliveries into the managed execution context
    zone: Rc<dyn EventZone>,

    /// The native object listeners are currently bound to
    target: RefCell<Option<Rc<dyn NativeTarget>>>,

    /// Identity of the most recently published target
    last_published: Cell<Option<*const ()>>,

    /// Subscriptions queued while no target is available, in arrival order
    pending: RefCell<Vec<Rc<BindingInner>>>,

    /// Subscriptions holding a live native listener registration
    active: RefCell<Vec<Rc<BindingInner>>>,

    /// Observers of the target stream
    watchers: RefCell<Vec<(u64, TargetWatcher)>>,

    /// Id for the next target watcher
    next_watch_id: Cell<u64>,

    /// Once set, the manager is permanently inert
    destroyed: Cell<bool>,
}

impl ManagerInner {
    fn new(zone: Rc<dyn EventZone>) -> Rc<Self> {
        Rc::new(Self {
            zone,
            target: RefCell::new(None),
            last_published: Cell::new(None),
            pending: RefCell::new(Vec::new()),
            active: RefCell::new(Vec::new()),
            watchers: RefCell::new(Vec::new()),
            next_watch_id: Cell::new(1),
            destroyed: Cell::new(false),
        })
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub(crate) fn current_target(&self) -> Option<Rc<dyn NativeTarget>> {
        self.target.borrow().clone()
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active.borrow().len()
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    // =========================================================================
    // SUBSCRIPTION ENTRY POINTS
    // =========================================================================

    /// Route a fresh subscription: attach now if a target is present, queue
    /// it otherwise. Called synchronously from the subscribe path.
    pub(crate) fn subscribe_binding(&self, binding: Rc<BindingInner>) {
        if self.destroyed.get() {
            binding.mark_completed();
            return;
        }

        let target = self.current_target();
        match target {
            Some(target) => self.attach(&binding, &target),
            None => {
                trace!(event = binding.event(), "subscription queued, no target yet");
                self.pending.borrow_mut().push(binding);
            }
        }
    }

    /// Drop a single subscription's bookkeeping entry (it already removed
    /// its own native listener).
    pub(crate) fn forget_binding(&self, binding: &Rc<BindingInner>) {
        self.active.borrow_mut().retain(|b| !Rc::ptr_eq(b, binding));
        self.pending.borrow_mut().retain(|b| !Rc::ptr_eq(b, binding));
    }

    // =========================================================================
    // ATTACHMENT
    // =========================================================================

    /// Attempt one native registration for `binding` against `target`.
    ///
    /// No handle from the target means the stream completes empty; it is not
    /// an error and is never retried.
    fn attach(&self, binding: &Rc<BindingInner>, target: &Rc<dyn NativeTarget>) {
        let callback = self.delivery_callback(binding);

        let handle = match binding.kind() {
            ListenerKind::Custom => target.add_listener(binding.event(), callback),
            ListenerKind::Native => self.attach_dom(binding, target, callback),
        };

        match handle {
            Some(handle) => {
                binding.set_handle(handle);
                binding.mark_attached();
                self.active.borrow_mut().push(binding.clone());
                trace!(event = binding.event(), "listener attached");
            }
            None => {
                binding.mark_completed();
                trace!(event = binding.event(), "target yielded no handle, stream completed");
            }
        }
    }

    /// DOM-style attachment for `ListenerKind::Native`.
    ///
    /// A target without the hook pair is a misuse: fatal in debug builds,
    /// skipped entirely in release builds (the stream just stays silent).
    fn attach_dom(
        &self,
        binding: &Rc<BindingInner>,
        target: &Rc<dyn NativeTarget>,
        callback: EventCallback,
    ) -> Option<ListenerHandle> {
        let Some(hooks) = target.dom_hooks() else {
            if cfg!(debug_assertions) {
                panic!(
                    "{}",
                    BindingError::MissingDomHooks {
                        event: binding.event().to_string(),
                    }
                );
            }
            warn!(
                event = binding.event(),
                "native-kind listener requested on a target without DOM hooks"
            );
            return None;
        };

        let token = hooks.add_event_listener(binding.event(), callback)?;

        let target = target.clone();
        let event = binding.event().to_string();
        Some(ListenerHandle::new(move || {
            if let Some(hooks) = target.dom_hooks() {
                hooks.remove_event_listener(&event, token);
            }
        }))
    }

    /// Build the callback handed to the native object: upgrade the binding,
    /// skip it once closed, and marshal the delivery through the zone.
    fn delivery_callback(&self, binding: &Rc<BindingInner>) -> EventCallback {
        let weak = Rc::downgrade(binding);
        let zone = self.zone.clone();

        Rc::new(move |payload: EventPayload| {
            let Some(binding) = weak.upgrade() else {
                return;
            };
            if binding.is_closed() {
                return;
            }

            let mut task = || binding.deliver(payload.clone());
            zone.run(&mut task);
        })
    }

    // =========================================================================
    // TARGET LIFECYCLE
    // =========================================================================

    /// Publish a new target.
    ///
    /// Reference-identical targets are a no-op. Otherwise: tear down every
    /// listener bound to the previous target (and discard never-attached
    /// queue entries), publish to watchers, then attach everything that was
    /// queued strictly before this call, in queue order.
    pub(crate) fn set_target(&self, target: Option<Rc<dyn NativeTarget>>) {
        if self.destroyed.get() {
            trace!("set_target ignored, manager destroyed");
            return;
        }

        let incoming = target.as_ref().map(target_identity);
        if incoming == self.last_published.get() {
            return;
        }

        let had_target = self.target.borrow().is_some();
        if had_target {
            self.clear_listeners();
            self.discard_pending();
        }

        *self.target.borrow_mut() = target.clone();
        self.last_published.set(incoming);
        debug!(has_target = target.is_some(), "target published");

        // Snapshot so a watcher can subscribe or unsubscribe re-entrantly
        let watchers: Vec<TargetWatcher> = self
            .watchers
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for watcher in watchers {
            watcher(target.as_ref());
        }

        if let Some(ref target) = target {
            let queued: Vec<Rc<BindingInner>> = self.pending.borrow_mut().drain(..).collect();
            for binding in queued {
                if !binding.is_closed() {
                    self.attach(&binding, target);
                }
            }
        }
    }

    /// Remove every active native listener. The active list is drained
    /// before any removal runs, so re-entrant mutation cannot corrupt it.
    fn clear_listeners(&self) {
        let active: Vec<Rc<BindingInner>> = self.active.borrow_mut().drain(..).collect();
        for binding in active {
            binding.remove_native();
            binding.mark_closed();
            trace!(event = binding.event(), "listener removed");
        }
    }

    /// Discard subscriptions that never attached.
    fn discard_pending(&self) {
        let pending: Vec<Rc<BindingInner>> = self.pending.borrow_mut().drain(..).collect();
        for binding in pending {
            binding.mark_closed();
        }
    }

    // =========================================================================
    // WATCHERS
    // =========================================================================

    pub(crate) fn add_watcher(&self, watcher: TargetWatcher) -> u64 {
        let id = self.next_watch_id.get();
        self.next_watch_id.set(id + 1);
        self.watchers.borrow_mut().push((id, watcher));
        id
    }

    pub(crate) fn remove_watcher(&self, id: u64) {
        self.watchers.borrow_mut().retain(|(wid, _)| *wid != id);
    }

    // =========================================================================
    // DESTROY
    // =========================================================================

    /// Tear everything down and make the manager permanently inert.
    /// Safe to call multiple times.
    pub(crate) fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }

        self.clear_listeners();
        self.discard_pending();
        *self.target.borrow_mut() = None;
        self.watchers.borrow_mut().clear();
        debug!("event manager destroyed");
    }
}

// =============================================================================
// EVENT MANAGER (Public wrapper)
// =============================================================================

/// Lazily attaches native event listeners to a target that may not exist
/// yet, multiplexing many named event streams through one lifecycle.
///
/// A wrapper component creates one manager, hands out
/// [`LazyEmitter`]s for its events, publishes the native object with
/// [`set_target`](EventManager::set_target) once constructed, and calls
/// [`destroy`](EventManager::destroy) (or just drops the last handle) on
/// teardown.
///
/// # Example
///
/// ```ignore
/// let manager = EventManager::new();
/// let clicks = manager.lazy_emitter::<ClickEvent>("click", ListenerKind::Custom);
///
/// // Subscribing before the native object exists queues the attachment.
/// let sub = clicks.subscribe(|e| println!("clicked at {}, {}", e.lat, e.lng));
///
/// // Later, once the native object is constructed:
/// manager.set_target(Some(native_map));
/// ```
pub struct EventManager {
    inner: Rc<ManagerInner>,
}

impl EventManager {
    /// Create a manager delivering through the default managed zone.
    ///
    /// If a [`BindingScope`](crate::BindingScope) is active, the manager is
    /// registered with it and destroyed when the scope stops.
    pub fn new() -> Self {
        Self::with_zone(default_zone())
    }

    /// Create a manager delivering through a caller-supplied zone.
    pub fn with_zone(zone: Rc<dyn EventZone>) -> Self {
        let inner = ManagerInner::new(zone);
        register_manager_with_scope(&inner);
        Self { inner }
    }

    /// A cold, multicast-safe stream of `event` payloads.
    ///
    /// No native listener is registered until a consumer subscribes; each
    /// subscription makes its own attachment attempt against whatever
    /// target is current at that moment. Name validation also happens at
    /// the subscription step, not here.
    pub fn lazy_emitter<T: 'static>(
        &self,
        event: impl Into<String>,
        kind: ListenerKind,
    ) -> LazyEmitter<T> {
        LazyEmitter::new(Rc::downgrade(&self.inner), event.into(), kind)
    }

    /// Publish the native object events should bind to, or `None` to keep
    /// queueing.
    ///
    /// Publishing the same reference twice is a no-op. Publishing a
    /// different one first removes every listener bound to the previous
    /// target and discards never-attached queue entries, then notifies
    /// target watchers, then attaches the subscriptions that were queued
    /// before this call, in their original order.
    pub fn set_target(&self, target: Option<Rc<dyn NativeTarget>>) {
        self.inner.set_target(target);
    }

    /// The currently bound target, if any.
    pub fn target(&self) -> Option<Rc<dyn NativeTarget>> {
        self.inner.current_target()
    }

    /// Observe every published target transition.
    ///
    /// The watcher is invoked immediately with the current target, then on
    /// each change, until the returned handle is dropped or the manager is
    /// destroyed.
    pub fn watch_target(
        &self,
        watcher: impl Fn(Option<&Rc<dyn NativeTarget>>) + 'static,
    ) -> TargetWatch {
        if self.inner.is_destroyed() {
            return TargetWatch {
                manager: Weak::new(),
                id: 0,
            };
        }

        let current = self.inner.current_target();
        watcher(current.as_ref());

        let id = self.inner.add_watcher(Rc::new(watcher));
        TargetWatch {
            manager: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Remove all listeners, discard pending subscriptions, and make the
    /// manager permanently inert. Safe to call multiple times.
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    /// Whether [`destroy`](EventManager::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }

    /// Number of live native listener registrations.
    pub fn active_listener_count(&self) -> usize {
        self.inner.active_count()
    }

    /// Number of subscriptions queued for a future target.
    pub fn pending_subscription_count(&self) -> usize {
        self.inner.pending_count()
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventManager {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for EventManager {
    fn drop(&mut self) {
        // Auto-destroy when the last handle goes away. A scope holding the
        // manager keeps the count above one until the scope itself stops.
        if Rc::strong_count(&self.inner) == 1 {
            self.inner.destroy();
        }
    }
}

// =============================================================================
// TARGET WATCH
// =============================================================================

/// Handle to one target-stream observer; dropping it stops the watcher.
pub struct TargetWatch {
    manager: Weak<ManagerInner>,
    id: u64,
}

impl TargetWatch {
    /// Stop observing target transitions. Safe to call multiple times.
    pub fn unsubscribe(&self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.remove_watcher(self.id);
        }
    }
}

impl Drop for TargetWatch {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

// =============================================================================
// TESTS
// =============================================================================
