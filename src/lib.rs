// ============================================================================
// atlas-events - Lazy Event Bindings for Native Objects
// ============================================================================
//
// Wrapper components need event streams from native objects (maps, markers,
// shapes, layers) that are constructed asynchronously. This crate provides
// the event manager that hides the gap: consumers subscribe to named event
// streams whenever they like, and listeners are registered against the
// native object the moment it becomes available - then torn down cleanly on
// target replacement, unsubscribe, or manager destroy.
// ============================================================================

pub mod binding;
pub mod core;
pub mod error;
pub mod events;

#[macro_use]
mod macros;

// Re-export core items at crate root for ergonomic access
pub use crate::core::constants;
pub use crate::core::context::{
    default_zone, in_managed_zone, with_zone_context, zone_entry_count, EventZone, InlineZone,
    ManagedZone, ZoneContext,
};
pub use crate::core::types::{
    DomEventHooks, DomToken, EventCallback, EventPayload, ListenerHandle, ListenerKind,
    NativeTarget,
};

// Re-export the event surface at crate root
pub use crate::events::emitter::LazyEmitter;
pub use crate::events::manager::{EventManager, TargetWatch};
pub use crate::events::subscription::Subscription;

// Re-export scoped teardown
pub use crate::binding::scope::{
    binding_scope, current_scope, on_scope_teardown, BindingScope, ScopeTeardownFn,
};

// Re-export errors
pub use crate::error::BindingError;

// =============================================================================
// TESTS
// =============================================================================
