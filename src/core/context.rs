// ============================================================================
// atlas-events - Execution Zone
// Thread-local state for marshaling deliveries into the managed context
// ============================================================================
//
// Listener registration and removal run outside the host framework's managed
// execution context for performance; every *delivered* payload is marshaled
// back inside it so the host observes the emission. The zone context below
// tracks whether the current call stack is inside a managed delivery, which
// is also what the test suite asserts against.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

// =============================================================================
// ZONE CONTEXT
// =============================================================================

/// Thread-local bookkeeping for the managed execution context.
pub struct ZoneContext {
    /// Nesting depth of managed-zone entries on the current stack
    depth: Cell<u32>,

    /// Total number of managed-zone entries on this thread
    entries: Cell<u64>,
}

impl ZoneContext {
    fn new() -> Self {
        Self {
            depth: Cell::new(0),
            entries: Cell::new(0),
        }
    }

    /// Enter the managed zone, returning the new depth.
    pub fn enter(&self) -> u32 {
        let depth = self.depth.get() + 1;
        self.depth.set(depth);
        self.entries.set(self.entries.get() + 1);
        depth
    }

    /// Leave the managed zone, returning the new depth.
    pub fn exit(&self) -> u32 {
        let depth = self.depth.get().saturating_sub(1);
        self.depth.set(depth);
        depth
    }

    /// Current nesting depth.
    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    /// Total entries recorded on this thread.
    pub fn entry_count(&self) -> u64 {
        self.entries.get()
    }
}

thread_local! {
    /// The thread-local zone context
    static CONTEXT: ZoneContext = ZoneContext::new();
}

/// Access the thread-local zone context.
pub fn with_zone_context<R>(f: impl FnOnce(&ZoneContext) -> R) -> R {
    CONTEXT.with(f)
}

/// Whether the current call stack is inside a managed-zone delivery.
pub fn in_managed_zone() -> bool {
    with_zone_context(|ctx| ctx.depth() > 0)
}

/// Total managed-zone entries on this thread.
pub fn zone_entry_count() -> u64 {
    with_zone_context(|ctx| ctx.entry_count())
}

// =============================================================================
// EVENT ZONE
// =============================================================================

/// Marshals a single delivery onto the host's managed execution context.
///
/// A manager runs every payload delivery through its zone; registration and
/// removal never go through it.
pub trait EventZone {
    /// Run `task` inside the managed context.
    fn run(&self, task: &mut dyn FnMut());
}

/// Default zone: enters the thread-local [`ZoneContext`] around the task.
///
/// Hosts with a real scheduler wrap it here; the thread-local depth is what
/// makes the marshaling observable without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManagedZone;

impl EventZone for ManagedZone {
    fn run(&self, task: &mut dyn FnMut()) {
        with_zone_context(|ctx| ctx.enter());
        task();
        with_zone_context(|ctx| ctx.exit());
    }
}

/// Pass-through zone for hosts that manage their own execution context.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineZone;

impl EventZone for InlineZone {
    fn run(&self, task: &mut dyn FnMut()) {
        task();
    }
}

/// The default zone used by managers constructed without an explicit one.
pub fn default_zone() -> Rc<dyn EventZone> {
    Rc::new(ManagedZone)
}

// =============================================================================
// TESTS
// =============================================================================
