//! MeshMetricError: Unified error type for mesh-metric public APIs
//!
//! Every fallible routine in the crate reports through this enum, so drivers
//! can decide per failure whether to skip a point or abort a pass. Nothing in
//! the crate terminates the process on degenerate input.

use thiserror::Error;

use crate::topology::point::PointId;

/// Unified error type for mesh-metric operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshMetricError {
    /// Attempted to construct a PointId with a zero value (invalid).
    #[error("PointId must be non-zero (0 is reserved as invalid/sentinel)")]
    InvalidPointId,
    /// The point id does not address a point of the mesh.
    #[error("Point {0} is not part of the mesh")]
    PointOutOfRange(PointId),
    /// The tetra index does not address a tetra of the mesh.
    #[error("Tetra {0} is not part of the mesh")]
    TetraOutOfRange(usize),
    /// An extended (boundary) record index is dangling.
    #[error("Extended record {index} for {what} is missing")]
    MissingExtendedRecord {
        /// Kind of record (`"xtetra"`, `"xpoint"`).
        what: &'static str,
        /// Index that failed to resolve.
        index: usize,
    },
    /// A local edge/face/vertex index is outside its table.
    #[error("Local {what} index {index} out of range")]
    LocalIndexOutOfRange {
        /// Kind of local entity (`"edge"`, `"face"`, `"vertex"`).
        what: &'static str,
        /// Index that was requested.
        index: usize,
    },
    /// Fewer materials were registered than declared.
    #[error("Only {set} materials out of {declared} have been set")]
    IncompleteConfig {
        /// Number of materials actually provided.
        set: usize,
        /// Number of materials declared.
        declared: usize,
    },
    /// A tensor could not be inverted, or a blend produced a degenerate tensor.
    #[error("Invalid metric: {reason}")]
    InvalidMetric {
        /// What went wrong, for logging.
        reason: String,
    },
    /// Ridge interpolation was requested for a point without boundary normal.
    #[error("Contract violation: point {0} has no boundary-normal record")]
    MissingBoundaryNormal(PointId),
    /// A scalar routine was applied to a tensor field or vice versa.
    #[error("Metric kind mismatch: expected {expected}, found {found}")]
    MetricKindMismatch {
        /// Kind required by the routine.
        expected: &'static str,
        /// Kind stored in the field.
        found: &'static str,
    },
    /// Storage write/read range does not fit the buffer.
    #[error("Storage chunk mismatch at offset {offset} (len {len})")]
    ScatterChunkMismatch {
        /// Start of the requested range.
        offset: usize,
        /// Length of the requested range.
        len: usize,
    },
    /// Destination length differs from requested length.
    #[error("Storage length mismatch: expected {expected}, found {found}")]
    ScatterLengthMismatch {
        /// Requested length.
        expected: usize,
        /// Destination length.
        found: usize,
    },
    /// A registry or field invariant is broken.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

impl MeshMetricError {
    /// Shorthand for [`MeshMetricError::InvalidMetric`].
    pub fn invalid_metric(reason: impl Into<String>) -> Self {
        MeshMetricError::InvalidMetric {
            reason: reason.into(),
        }
    }
}
