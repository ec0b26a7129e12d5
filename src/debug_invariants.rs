//! Invariant checks for the registry and metric storage.
//!
//! Builders in this crate keep legacy behaviour (e.g. last-writer-wins on
//! colliding material children) instead of rejecting input; the checks here
//! are how such states are surfaced.

use crate::mesh_error::MeshMetricError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshMetricError>;

    /// Panic on a broken invariant in debug builds or when invariant checking
    /// is enabled; no-op otherwise.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "debug_assert_invariants");
    }
}

/// Returns `InvariantViolation(msg())` unless `cond` holds.
pub(crate) fn ensure(
    cond: bool,
    msg: impl FnOnce() -> String,
) -> Result<(), MeshMetricError> {
    if cond {
        Ok(())
    } else {
        Err(MeshMetricError::InvariantViolation(msg()))
    }
}

/// Run a fallible check and panic on error when invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
