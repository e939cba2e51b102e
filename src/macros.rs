// ============================================================================
// atlas-events - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// This reduces the boilerplate of manually cloning `Rc` or `EventManager`
/// types before moving them into a closure.
///
/// # Usage
///
/// ```rust
/// use atlas_events::cloned;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let hits = Rc::new(Cell::new(0));
///
/// let bump = cloned!(hits => move || hits.set(hits.get() + 1));
/// bump();
/// bump();
///
/// assert_eq!(hits.get(), 2);
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Subscribe to a lazy emitter with automatic variable capturing.
///
/// Wraps `emitter.subscribe(cloned!(... => move |payload| ...))`.
///
/// # Usage
///
/// ```rust
/// use atlas_events::{subscribe, EventManager, ListenerKind};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let manager = EventManager::new();
/// let clicks = manager.lazy_emitter::<u32>("click", ListenerKind::Custom);
/// let total = Rc::new(Cell::new(0));
///
/// // Clean syntax: captures ; payload => expression
/// let sub = subscribe!(clicks, total; value => total.set(total.get() + *value));
/// assert!(sub.is_pending());
/// ```
#[macro_export]
macro_rules! subscribe {
    // Case 1: With captured variables
    ($emitter:expr, $($deps:ident),+ ; $payload:pat => $body:expr) => {
        {
            $( let $deps = $deps.clone(); )+
            $emitter.subscribe(move |$payload| { $body; })
        }
    };
    // Case 2: No captures (just the payload binding)
    ($emitter:expr, $payload:pat => $body:expr) => {
        $emitter.subscribe(move |$payload| { $body; })
    };
}
