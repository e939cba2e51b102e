// ============================================================================
// atlas-events - Constants
// Flag constants for listener kinds and subscription states
// ============================================================================

// =============================================================================
// LISTENER KIND FLAGS
// =============================================================================

/// Listener registered through the target's generic `add_listener` capability
pub const CUSTOM_KIND: u32 = 1 << 0;

/// Listener registered through DOM-style `add_event_listener`/`remove_event_listener`
pub const NATIVE_KIND: u32 = 1 << 1;

// =============================================================================
// SUBSCRIPTION STATE FLAGS
// =============================================================================

/// Subscription is queued, waiting for a target to become available
pub const PENDING: u32 = 1 << 8;

/// Subscription holds a live native listener registration
pub const ATTACHED: u32 = 1 << 9;

/// Stream finished without error (the target yielded no registration handle)
pub const COMPLETED: u32 = 1 << 10;

/// Subscription is torn down - no further deliveries are possible
pub const CLOSED: u32 = 1 << 11;

/// Subscription survives its handle being dropped (opt-out of RAII teardown)
pub const PRESERVED: u32 = 1 << 12;

// =============================================================================
// STATUS MASK (for clearing state bits)
// =============================================================================

/// Mask to clear the lifecycle state bits (PENDING, ATTACHED, COMPLETED, CLOSED)
pub const STATUS_MASK: u32 = !(PENDING | ATTACHED | COMPLETED | CLOSED);

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_distinct() {
        // Ensure no flags overlap
        let all_flags = [CUSTOM_KIND, NATIVE_KIND, PENDING, ATTACHED, COMPLETED, CLOSED, PRESERVED];

        for (i, &a) in all_flags.iter().enumerate() {
            for (j, &b) in all_flags.iter().enumerate() {
                if i != j {
                    assert_eq!(
                        a & b,
                        0,
                        "Flags at index {} and {} overlap: {:b} & {:b}",
                        i,
                        j,
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn status_mask_clears_state_bits() {
        let flags = CUSTOM_KIND | ATTACHED | PRESERVED;
        let cleared = flags & STATUS_MASK;

        // Should clear ATTACHED but keep the kind and PRESERVED
        assert_eq!(cleared & ATTACHED, 0);
        assert_ne!(cleared & CUSTOM_KIND, 0);
        assert_ne!(cleared & PRESERVED, 0);
    }

    #[test]
    fn can_transition_states() {
        let mut flags = CUSTOM_KIND | PENDING;

        assert_ne!(flags & PENDING, 0);
        assert_eq!(flags & ATTACHED, 0);

        // Pending -> attached
        flags = (flags & STATUS_MASK) | ATTACHED;

        assert_ne!(flags & CUSTOM_KIND, 0);
        assert_eq!(flags & PENDING, 0);
        assert_ne!(flags & ATTACHED, 0);

        // Attached -> closed
        flags = (flags & STATUS_MASK) | CLOSED;

        assert_eq!(flags & ATTACHED, 0);
        assert_ne!(flags & CLOSED, 0);
    }
}
