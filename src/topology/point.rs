//! `PointId`: a strong, zero-cost handle for mesh vertices
//!
//! Vertices are numbered from 1, so a `PointId` wraps a `NonZeroU64` and 0
//! stays available as the "no point" sentinel. Per-point arrays (mesh points,
//! metric field) store vertex `p` at slot `p.index() == p.get() - 1`.

use std::{fmt, num::NonZeroU64};

use crate::mesh_error::MeshMetricError;

/// Handle of a mesh vertex.
///
/// # Memory layout
/// This type is `repr(transparent)`, meaning it has the same ABI and
/// alignment as its single field (`NonZeroU64`).
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct PointId(NonZeroU64);

impl PointId {
    /// Creates a new `PointId` from a raw `u64` value.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mesh_metric::topology::point::PointId;
    /// let p = PointId::new(1)?;
    /// assert_eq!(p.get(), 1);
    /// assert!(PointId::new(0).is_err());
    /// # Ok::<(), mesh_metric::mesh_error::MeshMetricError>(())
    /// ```
    #[inline]
    pub fn new(raw: u64) -> Result<Self, MeshMetricError> {
        NonZeroU64::new(raw)
            .map(PointId)
            .ok_or(MeshMetricError::InvalidPointId)
    }

    /// Returns the inner `u64` value of this `PointId`.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Zero-based slot of this point in per-point arrays.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// Inverse of [`PointId::index`].
    #[inline]
    pub fn from_index(index: usize) -> Result<Self, MeshMetricError> {
        PointId::new(index as u64 + 1)
    }
}

impl fmt::Debug for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PointId").field(&self.get()).finish()
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
