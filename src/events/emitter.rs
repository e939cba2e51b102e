// ============================================================================
// atlas-events - Lazy Emitter
// Cold, typed event streams over the manager's untyped listener plumbing
// ============================================================================

use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::core::types::{EventPayload, ListenerKind};
use crate::error::BindingError;
use crate::events::manager::ManagerInner;
use crate::events::subscription::{BindingInner, Subscription};

// =============================================================================
// LAZY EMITTER
// =============================================================================

/// A cold, multicast-safe stream of typed payloads for one named event.
///
/// Creating an emitter has no side effects; only subscribing does. Each
/// subscription independently attaches a native listener against whatever
/// target the owning [`EventManager`](crate::EventManager) holds at that
/// moment, or queues until one arrives.
///
/// The emitter holds the manager weakly: once the manager is gone,
/// subscribing yields an already-completed stream.
pub struct LazyEmitter<T: 'static> {
    manager: Weak<ManagerInner>,
    event: String,
    kind: ListenerKind,
    _payload: PhantomData<fn(&T)>,
}

impl<T: 'static> LazyEmitter<T> {
    pub(crate) fn new(manager: Weak<ManagerInner>, event: String, kind: ListenerKind) -> Self {
        Self {
            manager,
            event,
            kind,
            _payload: PhantomData,
        }
    }

    /// The native event name this emitter listens for.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// The attachment mechanism this emitter uses.
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }

    /// Subscribe to the stream.
    ///
    /// Attaches synchronously when a target is present, queues otherwise.
    /// Payloads are delivered inside the manager's execution zone. Native
    /// payloads whose concrete type is not `T` are wiring bugs and are
    /// skipped with a warning.
    ///
    /// # Panics
    ///
    /// In debug builds, when the event name is empty or a
    /// [`ListenerKind::Native`] listener is attached to a target without
    /// DOM hooks. Release builds skip both checks.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        #[cfg(debug_assertions)]
        if self.event.is_empty() {
            panic!("{}", BindingError::EmptyEventName);
        }

        self.subscribe_erased(Rc::new(callback))
    }

    /// Fallible companion to [`subscribe`](LazyEmitter::subscribe): misuse
    /// is reported as a value in every build profile instead of a
    /// debug-only panic.
    ///
    /// The DOM-hooks check can only run against a target that already
    /// exists; a queued native-kind subscription is still diagnosed at
    /// attachment time by the infallible rules.
    pub fn try_subscribe(
        &self,
        callback: impl Fn(&T) + 'static,
    ) -> Result<Subscription, BindingError> {
        if self.event.is_empty() {
            return Err(BindingError::EmptyEventName);
        }

        if self.kind == ListenerKind::Native {
            if let Some(manager) = self.manager.upgrade() {
                if let Some(target) = manager.current_target() {
                    if target.dom_hooks().is_none() {
                        return Err(BindingError::MissingDomHooks {
                            event: self.event.clone(),
                        });
                    }
                }
            }
        }

        Ok(self.subscribe_erased(Rc::new(callback)))
    }

    fn subscribe_erased(&self, callback: Rc<dyn Fn(&T)>) -> Subscription {
        let deliver = {
            let event = self.event.clone();
            Box::new(move |payload: EventPayload| match payload.downcast::<T>() {
                Ok(value) => callback(&*value),
                Err(_) => warn!(event = event.as_str(), "dropped payload of unexpected type"),
            })
        };

        let binding = BindingInner::new(self.kind, self.event.clone(), deliver, self.manager.clone());

        match self.manager.upgrade() {
            Some(manager) => manager.subscribe_binding(binding.clone()),
            // Manager already gone: an empty, completed stream
            None => binding.mark_completed(),
        }

        Subscription::new(binding)
    }
}

impl<T: 'static> Clone for LazyEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            event: self.event.clone(),
            kind: self.kind,
            _payload: PhantomData,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
