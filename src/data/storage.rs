//! Pluggable storage for per-point metric buffers.
//!
//! [`MetricField`](crate::data::metric_field::MetricField) keeps its values
//! in a flat buffer of `f64`; this trait abstracts where that buffer lives so
//! a driver can hand over its own allocation.

use core::fmt::{self, Debug};

use crate::mesh_error::MeshMetricError;

/// Contiguous, indexable storage for `V` with slice access.
pub trait Storage<V>: Debug {
    /// Construct a buffer of `len`, filled with `fill`.
    fn with_len(len: usize, fill: V) -> Self
    where
        V: Clone;

    /// Current length in elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resize to `new_len`, filling new cells with `fill`.
    fn resize(&mut self, new_len: usize, fill: V)
    where
        V: Clone;

    /// Entire read-only buffer.
    fn as_slice(&self) -> &[V];

    /// Entire mutable buffer.
    fn as_mut_slice(&mut self) -> &mut [V];

    /// Copy `src` into the range `[offset .. offset + src.len())`.
    fn write_at(&mut self, offset: usize, src: &[V]) -> Result<(), MeshMetricError>
    where
        V: Clone,
    {
        let len = src.len();
        let end = offset
            .checked_add(len)
            .ok_or(MeshMetricError::ScatterChunkMismatch { offset, len })?;
        let dst = self
            .as_mut_slice()
            .get_mut(offset..end)
            .ok_or(MeshMetricError::ScatterChunkMismatch { offset, len })?;
        dst.clone_from_slice(src);
        Ok(())
    }

    /// Borrow the range `[offset .. offset + len)`.
    fn read_at(&self, offset: usize, len: usize) -> Result<&[V], MeshMetricError> {
        let end = offset
            .checked_add(len)
            .ok_or(MeshMetricError::ScatterChunkMismatch { offset, len })?;
        self.as_slice()
            .get(offset..end)
            .ok_or(MeshMetricError::ScatterChunkMismatch { offset, len })
    }

    /// Read the range `[offset .. offset + len)` into `dst`.
    fn read_into(&self, offset: usize, len: usize, dst: &mut [V]) -> Result<(), MeshMetricError>
    where
        V: Clone,
    {
        if dst.len() != len {
            return Err(MeshMetricError::ScatterLengthMismatch {
                expected: len,
                found: dst.len(),
            });
        }
        dst.clone_from_slice(self.read_at(offset, len)?);
        Ok(())
    }
}

/// `Vec`-backed storage (default).
#[derive(Clone, Default)]
pub struct VecStorage<V>(pub(crate) Vec<V>);

impl<V> Debug for VecStorage<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecStorage")
            .field("len", &self.0.len())
            .finish()
    }
}

impl<V> Storage<V> for VecStorage<V> {
    fn with_len(len: usize, fill: V) -> Self
    where
        V: Clone,
    {
        Self(vec![fill; len])
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn resize(&mut self, new_len: usize, fill: V)
    where
        V: Clone,
    {
        self.0.resize(new_len, fill);
    }

    fn as_slice(&self) -> &[V] {
        &self.0
    }

    fn as_mut_slice(&mut self) -> &mut [V] {
        &mut self.0
    }
}

impl<V> From<Vec<V>> for VecStorage<V> {
    fn from(v: Vec<V>) -> Self {
        Self(v)
    }
}

impl<V> VecStorage<V> {
    pub fn into_inner(self) -> Vec<V> {
        self.0
    }
}
