//! Per-point sizing values: one scalar or one symmetric tensor per vertex.
//!
//! The field grows as the driver inserts points; a slot is written once when
//! its point is created and only rewritten when the point is moved or
//! removed, which is the driver's business.

use std::fmt;

use crate::debug_invariants::{DebugInvariants, ensure};
use crate::data::storage::{Storage, VecStorage};
use crate::geometry::tensor::SymTensor;
use crate::mesh_error::MeshMetricError;
use crate::topology::point::PointId;

/// Largest number of `f64` a field buffer may hold.
const MAX_BUFFER_LEN: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// Shape of the values stored per point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MetricKind {
    /// One target edge length per point.
    Isotropic,
    /// One symmetric tensor (6 coefficients) per point.
    Anisotropic,
}

impl MetricKind {
    /// Number of `f64` per point.
    pub const fn stride(self) -> usize {
        match self {
            MetricKind::Isotropic => 1,
            MetricKind::Anisotropic => 6,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            MetricKind::Isotropic => "isotropic",
            MetricKind::Anisotropic => "anisotropic",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metric values indexed by [`PointId`].
#[derive(Clone, Debug)]
pub struct MetricField<S = VecStorage<f64>> {
    kind: MetricKind,
    storage: S,
}

impl MetricField<VecStorage<f64>> {
    /// `Vec`-backed scalar field with `n` zero-filled slots.
    pub fn isotropic(n: usize) -> Self {
        Self::with_points(MetricKind::Isotropic, n)
    }

    /// `Vec`-backed tensor field with `n` zero-filled slots.
    pub fn anisotropic(n: usize) -> Self {
        Self::with_points(MetricKind::Anisotropic, n)
    }
}

impl<S: Storage<f64>> MetricField<S> {
    /// Empty field of the given kind.
    pub fn new(kind: MetricKind) -> Self {
        Self::with_points(kind, 0)
    }

    /// Field with `n` zero-filled slots.
    pub fn with_points(kind: MetricKind, n: usize) -> Self {
        Self {
            kind,
            storage: S::with_len(n * kind.stride(), 0.0),
        }
    }

    /// Wraps an existing buffer; its length must be a multiple of the stride.
    pub fn from_storage(kind: MetricKind, storage: S) -> Result<Self, MeshMetricError> {
        let field = Self { kind, storage };
        field.validate_invariants()?;
        Ok(field)
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn num_points(&self) -> usize {
        self.storage.len() / self.kind.stride()
    }

    /// Flat coefficient buffer.
    pub fn as_slice(&self) -> &[f64] {
        self.storage.as_slice()
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Grows the field so that `p` has a slot.
    ///
    /// Fails with `PointOutOfRange` when the slot of `p` lies beyond the
    /// addressable range.
    pub fn ensure_point(&mut self, p: PointId) -> Result<(), MeshMetricError> {
        let needed = self
            .offset(p)?
            .checked_add(self.kind.stride())
            .filter(|&n| n <= MAX_BUFFER_LEN)
            .ok_or(MeshMetricError::PointOutOfRange(p))?;
        if self.storage.len() < needed {
            self.storage.resize(needed, 0.0);
        }
        Ok(())
    }

    fn expect_kind(&self, expected: MetricKind) -> Result<(), MeshMetricError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(MeshMetricError::MetricKindMismatch {
                expected: expected.name(),
                found: self.kind.name(),
            })
        }
    }

    fn offset(&self, p: PointId) -> Result<usize, MeshMetricError> {
        p.index()
            .checked_mul(self.kind.stride())
            .ok_or(MeshMetricError::PointOutOfRange(p))
    }

    /// Scalar size of `p`.
    pub fn scalar(&self, p: PointId) -> Result<f64, MeshMetricError> {
        self.expect_kind(MetricKind::Isotropic)?;
        let slot = self
            .storage
            .read_at(self.offset(p)?, 1)
            .map_err(|_| MeshMetricError::PointOutOfRange(p))?;
        Ok(slot[0])
    }

    /// Tensor of `p`.
    pub fn tensor(&self, p: PointId) -> Result<SymTensor, MeshMetricError> {
        self.expect_kind(MetricKind::Anisotropic)?;
        let mut out = SymTensor::ZERO;
        self.storage
            .read_into(self.offset(p)?, 6, &mut out.0)
            .map_err(|_| MeshMetricError::PointOutOfRange(p))?;
        Ok(out)
    }

    /// All tensors, in point order.
    pub fn tensors(&self) -> Result<&[SymTensor], MeshMetricError> {
        self.expect_kind(MetricKind::Anisotropic)?;
        bytemuck::try_cast_slice(self.storage.as_slice())
            .map_err(|e| MeshMetricError::InvariantViolation(format!("tensor view: {e}")))
    }

    /// Writes the scalar slot of `p`, growing the field if needed.
    pub fn set_scalar(&mut self, p: PointId, value: f64) -> Result<(), MeshMetricError> {
        self.expect_kind(MetricKind::Isotropic)?;
        self.ensure_point(p)?;
        let offset = self.offset(p)?;
        self.storage.write_at(offset, &[value])
    }

    /// Writes the tensor slot of `p`, growing the field if needed.
    pub fn set_tensor(&mut self, p: PointId, value: &SymTensor) -> Result<(), MeshMetricError> {
        self.expect_kind(MetricKind::Anisotropic)?;
        self.ensure_point(p)?;
        let offset = self.offset(p)?;
        self.storage.write_at(offset, value.coefficients())
    }
}

impl<S: Storage<f64>> DebugInvariants for MetricField<S> {
    fn validate_invariants(&self) -> Result<(), MeshMetricError> {
        let stride = self.kind.stride();
        ensure(self.storage.len() % stride == 0, || {
            format!(
                "{} field buffer of length {} is not a multiple of {stride}",
                self.kind,
                self.storage.len()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(id: u64) -> PointId {
        PointId::new(id).unwrap()
    }

    #[test]
    fn tensor_field_grows_on_write() {
        let mut field = MetricField::anisotropic(0);
        let m = SymTensor::new(1.0, 0.1, 0.2, 2.0, 0.3, 3.0);
        field.set_tensor(pt(3), &m).unwrap();
        assert_eq!(field.num_points(), 3);
        assert_eq!(field.tensor(pt(3)).unwrap(), m);
        assert_eq!(field.tensor(pt(1)).unwrap(), SymTensor::ZERO);
        assert_eq!(field.tensors().unwrap()[2], m);
        assert_eq!(
            field.tensor(pt(4)),
            Err(MeshMetricError::PointOutOfRange(pt(4)))
        );
    }

    #[test]
    fn huge_point_ids_are_out_of_range() {
        let mut field = MetricField::anisotropic(4);
        for raw in [u64::MAX / 2, u64::MAX] {
            let p = pt(raw);
            assert_eq!(field.tensor(p), Err(MeshMetricError::PointOutOfRange(p)));
            assert_eq!(
                field.set_tensor(p, &SymTensor::IDENTITY),
                Err(MeshMetricError::PointOutOfRange(p))
            );
            assert_eq!(field.ensure_point(p), Err(MeshMetricError::PointOutOfRange(p)));
        }
        assert_eq!(field.num_points(), 4);

        let mut sizes = MetricField::isotropic(1);
        for raw in [u64::MAX / 2, u64::MAX] {
            let p = pt(raw);
            assert_eq!(sizes.scalar(p), Err(MeshMetricError::PointOutOfRange(p)));
            assert_eq!(sizes.set_scalar(p, 1.0), Err(MeshMetricError::PointOutOfRange(p)));
        }
        assert_eq!(sizes.num_points(), 1);
    }

    #[test]
    fn scalar_field_roundtrip() {
        let mut field = MetricField::isotropic(2);
        field.set_scalar(pt(2), 0.5).unwrap();
        assert_eq!(field.scalar(pt(2)).unwrap(), 0.5);
        assert_eq!(field.as_slice(), &[0.0, 0.5]);
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let field = MetricField::isotropic(1);
        assert_eq!(
            field.tensor(pt(1)),
            Err(MeshMetricError::MetricKindMismatch {
                expected: "anisotropic",
                found: "isotropic",
            })
        );
    }

    #[test]
    fn from_storage_checks_stride() {
        let ok = MetricField::from_storage(
            MetricKind::Anisotropic,
            VecStorage::from(vec![1.0, 0.0, 0.0, 1.0, 0.0, 1.0]),
        );
        assert!(ok.is_ok());
        let bad = MetricField::from_storage(MetricKind::Anisotropic, VecStorage::from(vec![1.0; 5]));
        assert!(matches!(bad, Err(MeshMetricError::InvariantViolation(_))));
    }
}
