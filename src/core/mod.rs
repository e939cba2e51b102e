// ============================================================================
// atlas-events - Core Module
// Capability traits, flag constants, and the execution-zone context
// ============================================================================

pub mod constants;
pub mod context;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use context::{
    default_zone, in_managed_zone, with_zone_context, zone_entry_count, EventZone, InlineZone,
    ManagedZone, ZoneContext,
};
pub use types::{
    DomEventHooks, DomToken, EventCallback, EventPayload, ListenerHandle, ListenerKind,
    NativeTarget,
};
