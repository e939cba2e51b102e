// ============================================================================
// atlas-events - Errors
// ============================================================================

use thiserror::Error;

/// Errors surfaced by the fallible subscription surface.
///
/// Both variants are misuse diagnostics: the infallible `subscribe` path
/// panics with the same messages in debug builds and skips the checks
/// entirely in release builds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// Event names must be non-empty identifiers meaningful to the target.
    #[error("event name must be a non-empty identifier")]
    EmptyEventName,

    /// A native-kind listener was requested on a target without DOM hooks.
    #[error("native-kind listener for `{event}` requires addEventListener/removeEventListener on the target")]
    MissingDomHooks {
        /// The event the listener was requested for
        event: String,
    },
}
