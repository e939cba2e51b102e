// ============================================================================
// atlas-events - Binding Scope
//
// Group event managers for batch teardown.
// ============================================================================
//
// A BindingScope models the host component's lifecycle as an explicit
// resource scope: managers created while the scope is active are collected
// by it, and stopping the scope destroys them all and runs any registered
// teardown callbacks. This replaces framework lifecycle hooks with a
// construct-on-init / guaranteed-release-on-teardown pair.
//
// Key features:
// - run(fn) - Execute function with this scope active
// - stop() - Destroy all collected managers and run teardowns
// - Nested scopes (child scopes stop with their parent)
// - Detached scopes (opt out of parent collection)
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::events::manager::ManagerInner;

// =============================================================================
// THREAD-LOCAL SCOPE STATE
// =============================================================================

thread_local! {
    /// Currently active scope (if any)
    static ACTIVE_SCOPE: RefCell<Option<Rc<BindingScopeInner>>> = const { RefCell::new(None) };
}

/// Get the currently active scope
fn get_active_scope() -> Option<Rc<BindingScopeInner>> {
    ACTIVE_SCOPE.with(|s| s.borrow().clone())
}

/// Set the active scope, returning the previous one
fn set_active_scope(scope: Option<Rc<BindingScopeInner>>) -> Option<Rc<BindingScopeInner>> {
    ACTIVE_SCOPE.with(|s| {
        let prev = s.borrow().clone();
        *s.borrow_mut() = scope;
        prev
    })
}

// =============================================================================
// TEARDOWN TYPE
// =============================================================================

/// Teardown callback type for scope disposal
pub type ScopeTeardownFn = Box<dyn FnOnce()>;

// =============================================================================
// BINDING SCOPE INNER
// =============================================================================

/// Internal scope implementation
pub struct BindingScopeInner {
    /// Whether the scope is still active (not stopped)
    active: Cell<bool>,

    /// Managers created within this scope
    managers: RefCell<Vec<Rc<ManagerInner>>>,

    /// Teardown callbacks to run on stop
    teardowns: RefCell<Vec<ScopeTeardownFn>>,

    /// Parent scope (for nested scopes)
    parent: RefCell<Option<Weak<BindingScopeInner>>>,

    /// Child scopes
    children: RefCell<Vec<Rc<BindingScopeInner>>>,

    /// Self-reference for returning from run()
    self_weak: RefCell<Weak<BindingScopeInner>>,
}

impl BindingScopeInner {
    /// Create a new scope
    fn new(detached: bool) -> Rc<Self> {
        let parent = if detached { None } else { get_active_scope() };

        let scope = Rc::new(Self {
            active: Cell::new(true),
            managers: RefCell::new(Vec::new()),
            teardowns: RefCell::new(Vec::new()),
            parent: RefCell::new(parent.as_ref().map(Rc::downgrade)),
            children: RefCell::new(Vec::new()),
            self_weak: RefCell::new(Weak::new()),
        });

        // Store self-reference
        *scope.self_weak.borrow_mut() = Rc::downgrade(&scope);

        // Register with parent scope unless detached
        if let Some(ref parent_scope) = parent {
            parent_scope.children.borrow_mut().push(scope.clone());
        }

        scope
    }

    /// Check if scope is active
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Run a function within this scope
    pub fn run<R, F: FnOnce() -> R>(&self, f: F) -> Option<R> {
        if !self.active.get() {
            return None;
        }

        // Get Rc to self
        let self_rc = self.self_weak.borrow().upgrade()?;

        let prev_scope = set_active_scope(Some(self_rc));
        let result = f();
        set_active_scope(prev_scope);

        Some(result)
    }

    /// Stop the scope, destroying all collected managers
    pub fn stop(&self) {
        if !self.active.get() {
            return;
        }

        // Destroy all managers
        let managers: Vec<_> = self.managers.borrow_mut().drain(..).collect();
        for manager in managers {
            manager.destroy();
        }

        // Run teardowns (in reverse order for proper nesting)
        let teardowns: Vec<_> = self.teardowns.borrow_mut().drain(..).collect();
        for teardown in teardowns.into_iter().rev() {
            // Teardown panics are contained so the rest of the scope closes
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(teardown));
        }

        // Stop child scopes
        let children: Vec<_> = self.children.borrow_mut().drain(..).collect();
        for child in children {
            child.stop();
        }

        // Remove from parent's child list
        if let Some(parent) = self.parent.borrow().as_ref().and_then(|w| w.upgrade()) {
            if let Some(self_rc) = self.self_weak.borrow().upgrade() {
                parent
                    .children
                    .borrow_mut()
                    .retain(|s| !Rc::ptr_eq(s, &self_rc));
            }
        }

        self.active.set(false);
        trace!("binding scope stopped");
    }

    /// Collect a manager into this scope
    fn add_manager(&self, manager: Rc<ManagerInner>) {
        self.managers.borrow_mut().push(manager);
    }

    /// Add a teardown callback to this scope
    fn add_teardown(&self, teardown: ScopeTeardownFn) {
        self.teardowns.borrow_mut().push(teardown);
    }
}

impl Drop for BindingScopeInner {
    fn drop(&mut self) {
        // Stop the scope if it's still active so managers are destroyed and
        // teardowns run on every exit path
        if self.active.get() {
            self.stop();
        }
    }
}

// =============================================================================
// BINDING SCOPE (Public wrapper)
// =============================================================================

/// A resource scope that groups event managers for batch teardown.
///
/// Managers created while a scope is active are automatically collected by
/// that scope. When the scope is stopped, every collected manager is
/// destroyed together.
///
/// # Example
///
/// ```ignore
/// let scope = binding_scope(false);
///
/// scope.run(|| {
///     // These managers are collected by the scope
///     let map_events = EventManager::new();
///     let marker_events = EventManager::new();
/// });
///
/// // Later, on component teardown
/// scope.stop();
/// ```
#[derive(Clone)]
pub struct BindingScope {
    inner: Rc<BindingScopeInner>,
}

impl BindingScope {
    /// Create from inner
    fn from_inner(inner: Rc<BindingScopeInner>) -> Self {
        Self { inner }
    }

    /// Whether the scope is still active (not stopped)
    pub fn active(&self) -> bool {
        self.inner.is_active()
    }

    /// Run a function within this scope.
    ///
    /// Managers created during execution are collected by this scope.
    /// Returns None if the scope has been stopped.
    pub fn run<R, F: FnOnce() -> R>(&self, f: F) -> Option<R> {
        self.inner.run(f)
    }

    /// Stop the scope.
    ///
    /// - All collected managers are destroyed
    /// - All teardown callbacks run (in reverse order)
    /// - All child scopes are stopped
    ///
    /// After stopping, `run()` returns None.
    pub fn stop(&self) {
        self.inner.stop();
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        // Auto-stop if this is the last strong reference
        if Rc::strong_count(&self.inner) == 1 {
            self.inner.stop();
        }
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Create a binding scope.
///
/// Managers created within the scope can be destroyed together. Child
/// scopes are stopped when the parent is stopped.
///
/// # Arguments
///
/// * `detached` - If true, scope won't be collected by a parent scope
pub fn binding_scope(detached: bool) -> BindingScope {
    BindingScope::from_inner(BindingScopeInner::new(detached))
}

/// Get the currently active scope, if any.
///
/// Returns None if not inside a scope's `run()` call.
pub fn current_scope() -> Option<BindingScope> {
    get_active_scope().map(BindingScope::from_inner)
}

/// Register a teardown callback on the current scope.
///
/// Runs when the scope is stopped. Does nothing if called outside of a
/// scope context (with a debug-build warning).
pub fn on_scope_teardown<F: FnOnce() + 'static>(f: F) {
    if let Some(scope) = get_active_scope() {
        scope.add_teardown(Box::new(f));
    } else {
        #[cfg(debug_assertions)]
        eprintln!("on_scope_teardown() called outside of scope context");
    }
}

/// Collect a freshly created manager into the current scope.
///
/// Called internally when a manager is constructed; this is what lets
/// scopes destroy managers on teardown.
pub(crate) fn register_manager_with_scope(manager: &Rc<ManagerInner>) {
    if let Some(scope) = get_active_scope() {
        scope.add_manager(manager.clone());
    }
}

// =============================================================================
// TESTS
// =============================================================================
