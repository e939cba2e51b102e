// ============================================================================
// atlas-events - Binding Module
// Scoped resource management for manager lifecycles
// ============================================================================

pub mod scope;

// Re-export for convenience
pub use scope::{binding_scope, current_scope, on_scope_teardown, BindingScope, ScopeTeardownFn};
