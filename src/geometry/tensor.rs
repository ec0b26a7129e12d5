//! Symmetric 3×3 metric tensors.
//!
//! A [`SymTensor`] stores the six independent coefficients in the order
//! `[xx, xy, xz, yy, yz, zz]`, which is also the layout of one anisotropic
//! slot of a [`MetricField`](crate::data::metric_field::MetricField).
//!
//! Interpolation between metrics is done on inverses (see
//! [`SymTensor::inverse_lerp`]): blending the inverses and inverting back
//! keeps intermediate ellipsoids meaningful, where blending the metrics
//! themselves does not.

use std::ops::{Add, AddAssign, Mul};

use bytemuck::{Pod, Zeroable};

use crate::mesh_error::MeshMetricError;

/// Determinants below this magnitude are treated as singular.
const MIN_DETERMINANT: f64 = 1e-200;
/// Tensors whose largest coefficient is below this are treated as zero.
const MIN_COEFFICIENT: f64 = 1e-30;

/// Symmetric 3×3 tensor, coefficients `[xx, xy, xz, yy, yz, zz]`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct SymTensor(pub [f64; 6]);

impl SymTensor {
    pub const ZERO: SymTensor = SymTensor([0.0; 6]);
    pub const IDENTITY: SymTensor = SymTensor([1.0, 0.0, 0.0, 1.0, 0.0, 1.0]);

    pub const fn new(xx: f64, xy: f64, xz: f64, yy: f64, yz: f64, zz: f64) -> Self {
        SymTensor([xx, xy, xz, yy, yz, zz])
    }

    pub const fn diagonal(xx: f64, yy: f64, zz: f64) -> Self {
        SymTensor([xx, 0.0, 0.0, yy, 0.0, zz])
    }

    /// Isotropic metric prescribing edge length `h` in every direction.
    pub fn from_size(h: f64) -> Self {
        let lambda = 1.0 / (h * h);
        SymTensor::diagonal(lambda, lambda, lambda)
    }

    #[inline]
    pub const fn coefficients(&self) -> &[f64; 6] {
        &self.0
    }

    #[inline]
    pub fn xx(&self) -> f64 {
        self.0[0]
    }

    #[inline]
    pub fn zz(&self) -> f64 {
        self.0[5]
    }

    /// Full row-major matrix.
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        let [a, b, c, d, e, f] = self.0;
        [[a, b, c], [b, d, e], [c, e, f]]
    }

    /// Cofactors along the first row: `(m11, m12, m13)`.
    fn first_row_cofactors(&self) -> (f64, f64, f64) {
        let [_, b, c, d, e, f] = self.0;
        (d * f - e * e, e * c - b * f, b * e - c * d)
    }

    pub fn determinant(&self) -> f64 {
        let (aa, bb, cc) = self.first_row_cofactors();
        self.0[0] * aa + self.0[1] * bb + self.0[2] * cc
    }

    /// Leading principal minors `(Δ1, Δ2, Δ3)`.
    pub fn leading_minors(&self) -> (f64, f64, f64) {
        let [a, b, _, d, _, _] = self.0;
        (a, a * d - b * b, self.determinant())
    }

    /// Sylvester test on the leading minors.
    pub fn is_positive_definite(&self) -> bool {
        if !self.0.iter().all(|v| v.is_finite()) {
            return false;
        }
        let scale = self.0.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if scale < MIN_COEFFICIENT {
            return false;
        }
        let (d1, d2, d3) = self.leading_minors();
        d1 > 0.0 && d2 > 0.0 && d3 > MIN_DETERMINANT
    }

    /// Inverse of a positive-definite tensor.
    ///
    /// Fails with `InvalidMetric` if the tensor is not positive-definite.
    pub fn try_inverse(&self) -> Result<SymTensor, MeshMetricError> {
        if !self.is_positive_definite() {
            return Err(MeshMetricError::invalid_metric(format!(
                "tensor {:?} is not positive-definite",
                self.0
            )));
        }
        let [a, b, c, d, e, f] = self.0;
        let (aa, bb, cc) = self.first_row_cofactors();
        let inv_det = 1.0 / (a * aa + b * bb + c * cc);
        Ok(SymTensor([
            aa * inv_det,
            bb * inv_det,
            cc * inv_det,
            (a * f - c * c) * inv_det,
            (b * c - a * e) * inv_det,
            (a * d - b * b) * inv_det,
        ]))
    }

    /// `(1 - t)·a + t·b`, coefficient-wise.
    pub fn lerp(a: &SymTensor, b: &SymTensor, t: f64) -> SymTensor {
        *a * (1.0 - t) + *b * t
    }

    /// Inverse-space interpolation: `inv((1 - t)·inv(a) + t·inv(b))`.
    pub fn inverse_lerp(
        a: &SymTensor,
        b: &SymTensor,
        t: f64,
    ) -> Result<SymTensor, MeshMetricError> {
        let ai = a.try_inverse()?;
        let bi = b.try_inverse()?;
        SymTensor::lerp(&ai, &bi, t).try_inverse()
    }

    /// Max coefficient-wise difference below `tol`, relative to the larger
    /// of the two magnitudes (absolute when both are below 1).
    pub fn approx_eq(&self, other: &SymTensor, tol: f64) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(x, y)| {
            let scale = x.abs().max(y.abs()).max(1.0);
            (x - y).abs() <= tol * scale
        })
    }
}

impl From<[f64; 6]> for SymTensor {
    fn from(value: [f64; 6]) -> Self {
        SymTensor(value)
    }
}

impl Add for SymTensor {
    type Output = SymTensor;
    fn add(mut self, rhs: SymTensor) -> SymTensor {
        self += rhs;
        self
    }
}

impl AddAssign for SymTensor {
    fn add_assign(&mut self, rhs: SymTensor) {
        for (lhs, r) in self.0.iter_mut().zip(rhs.0) {
            *lhs += r;
        }
    }
}

impl Mul<f64> for SymTensor {
    type Output = SymTensor;
    fn mul(self, rhs: f64) -> SymTensor {
        SymTensor(self.0.map(|v| v * rhs))
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(SymTensor, [f64; 6]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matmul(a: [[f64; 3]; 3], b: [[f64; 3]; 3]) -> [[f64; 3]; 3] {
        let mut out = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                for k in 0..3 {
                    out[i][j] += a[i][k] * b[k][j];
                }
            }
        }
        out
    }

    #[test]
    fn inverse_of_full_tensor() {
        let m = SymTensor::new(4.0, 1.0, 0.5, 3.0, 0.25, 2.0);
        let inv = m.try_inverse().unwrap();
        let prod = matmul(m.to_matrix(), inv.to_matrix());
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((prod[i][j] - expected).abs() < 1e-12, "{prod:?}");
            }
        }
    }

    #[test]
    fn diagonal_inverse() {
        let inv = SymTensor::diagonal(2.0, 4.0, 8.0).try_inverse().unwrap();
        assert!(inv.approx_eq(&SymTensor::diagonal(0.5, 0.25, 0.125), 1e-15));
    }

    #[test]
    fn zero_and_indefinite_tensors_fail() {
        assert!(matches!(
            SymTensor::ZERO.try_inverse(),
            Err(MeshMetricError::InvalidMetric { .. })
        ));
        assert!(SymTensor::diagonal(1.0, -1.0, 1.0).try_inverse().is_err());
        assert!(SymTensor::diagonal(1.0, 1.0, 0.0).try_inverse().is_err());
        assert!(SymTensor::diagonal(f64::NAN, 1.0, 1.0).try_inverse().is_err());
    }

    #[test]
    fn inverse_lerp_endpoints() {
        let a = SymTensor::new(4.0, 1.0, 0.0, 3.0, 0.0, 2.0);
        let b = SymTensor::diagonal(100.0, 1.0, 0.01);
        assert!(SymTensor::inverse_lerp(&a, &b, 0.0).unwrap().approx_eq(&a, 1e-12));
        assert!(SymTensor::inverse_lerp(&a, &b, 1.0).unwrap().approx_eq(&b, 1e-12));
    }

    #[test]
    fn inverse_lerp_of_isotropic_sizes() {
        // sizes h=1 and h=2: inverse blend interpolates h^2 linearly
        let a = SymTensor::from_size(1.0);
        let b = SymTensor::from_size(2.0);
        let mid = SymTensor::inverse_lerp(&a, &b, 0.5).unwrap();
        let expected = 1.0 / 2.5;
        assert!((mid.xx() - expected).abs() < 1e-14);
        assert!((mid.zz() - expected).abs() < 1e-14);
    }

    #[test]
    fn pod_cast_from_flat_slice() {
        let flat = [1.0, 0.0, 0.0, 2.0, 0.0, 3.0, 4.0, 0.0, 0.0, 5.0, 0.0, 6.0];
        let tensors: &[SymTensor] = bytemuck::cast_slice(&flat);
        assert_eq!(tensors.len(), 2);
        assert_eq!(tensors[1], SymTensor::diagonal(4.0, 5.0, 6.0));
    }
}
