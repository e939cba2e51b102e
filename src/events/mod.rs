// ============================================================================
// atlas-events - Events Module
// The manager, its typed emitters, and per-subscription handles
// ============================================================================

pub mod emitter;
pub mod manager;
pub mod subscription;

// Re-export for convenience
pub use emitter::LazyEmitter;
pub use manager::{EventManager, TargetWatch};
pub use subscription::Subscription;
