//! Size-map interpolation at points inserted by the remeshing driver.
//!
//! A new point either splits an edge of a tetra (edge parameter `s`, from
//! the edge's first local vertex toward its second) or lies inside a tetra
//! (barycentric weights). The routines here compute its scalar size or
//! metric tensor from the surrounding vertices and write it to the point's
//! slot in the [`MetricField`]. Nothing else in the field is modified.
//!
//! Anisotropic values are always blended on inverses: each operand is
//! inverted, the inverses are combined with the interpolation weights and
//! the result is inverted back. Any non-invertible operand or combination is
//! reported as `InvalidMetric`.
//!
//! # Edge cases handled by [`MetricInterpolator::anisotropic_edge`]
//! - tetra without boundary record, or untagged edge: internal-edge rule;
//! - ridge edge: [`BoundaryMetricOps::ridge_metric`] with the new point's normal;
//! - surface edge: [`BoundaryMetricOps::regular_boundary_metric`] on the
//!   triangle of an incident boundary face. When neither incident face is a
//!   boundary face the tetra cannot handle the edge and the call returns
//!   [`InterpolationOutcome::TopologicalMismatch`] without writing anything.

use crate::adapt::ops::{BoundaryMetricOps, StoredTensorOps};
use crate::adapt::options::{InterpolationOptions, RidgeMetricStorage};
use crate::data::metric_field::{MetricField, MetricKind};
use crate::data::storage::Storage;
use crate::geometry::tensor::SymTensor;
use crate::mesh_error::MeshMetricError;
use crate::topology::mesh::TetMesh;
use crate::topology::point::PointId;
use crate::topology::tetra::{FACE_EDGE_LOCAL, Tetra, XTetra, check_edge};

/// Result of an edge interpolation that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum InterpolationOutcome {
    /// The new point's slot has been written.
    Interpolated,
    /// The edge is a boundary edge but this tetra has no boundary face
    /// through it; retry from a neighbouring tetra.
    TopologicalMismatch,
}

/// How the edge of a given tetra must be interpolated.
#[derive(Clone, Copy, Debug, PartialEq)]
enum EdgeClass {
    Internal,
    Ridge { normal: [f64; 3] },
    BoundaryRegular { xt: XTetra },
}

/// Interpolates sizes at new points from the mesh and its metric field.
#[derive(Clone, Debug, Default)]
pub struct MetricInterpolator<O = StoredTensorOps> {
    ops: O,
    options: InterpolationOptions,
}

impl<O: BoundaryMetricOps> MetricInterpolator<O> {
    pub fn new(ops: O, options: InterpolationOptions) -> Self {
        Self { ops, options }
    }

    pub fn options(&self) -> &InterpolationOptions {
        &self.options
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Fills the size of `ip`, inserted at parameter `s` on local edge
    /// `edge` of tetra `k`, choosing the routine from the field kind and the
    /// configured ridge storage.
    pub fn interpolate_edge<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &mut MetricField<S>,
        k: usize,
        edge: usize,
        ip: PointId,
        s: f64,
    ) -> Result<InterpolationOutcome, MeshMetricError> {
        match (field.kind(), self.options.ridge_storage) {
            (MetricKind::Isotropic, _) => {
                self.isotropic_edge(mesh, field, k, edge, ip, s)?;
                Ok(InterpolationOutcome::Interpolated)
            }
            (MetricKind::Anisotropic, RidgeMetricStorage::Directional) => {
                self.anisotropic_edge(mesh, field, k, edge, ip, s)
            }
            (MetricKind::Anisotropic, RidgeMetricStorage::Raw) => {
                self.raw_anisotropic_edge(mesh, field, k, edge, ip, s)?;
                Ok(InterpolationOutcome::Interpolated)
            }
        }
    }

    /// Fills the size of `ip`, located in tetra `k` with barycentric
    /// coordinates `cb`, choosing the routine as [`Self::interpolate_edge`] does.
    pub fn interpolate_barycentric<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &mut MetricField<S>,
        k: usize,
        ip: PointId,
        cb: &[f64; 4],
    ) -> Result<(), MeshMetricError> {
        match (field.kind(), self.options.ridge_storage) {
            (MetricKind::Isotropic, _) => self.isotropic_barycentric(mesh, field, k, ip, cb),
            (MetricKind::Anisotropic, RidgeMetricStorage::Directional) => {
                self.anisotropic_barycentric(mesh, field, k, ip, cb)
            }
            (MetricKind::Anisotropic, RidgeMetricStorage::Raw) => {
                self.raw_anisotropic_barycentric(mesh, field, k, ip, cb)
            }
        }
    }

    /// `(1 - s)·size1 + s·size2`.
    pub fn isotropic_edge<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &mut MetricField<S>,
        k: usize,
        edge: usize,
        ip: PointId,
        s: f64,
    ) -> Result<(), MeshMetricError> {
        let (p1, p2) = mesh.tetra(k)?.edge_endpoints(edge)?;
        let size = (1.0 - s) * field.scalar(p1)? + s * field.scalar(p2)?;
        field.set_scalar(ip, size)
    }

    /// Point-type-aware anisotropic edge interpolation.
    pub fn anisotropic_edge<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &mut MetricField<S>,
        k: usize,
        edge: usize,
        ip: PointId,
        s: f64,
    ) -> Result<InterpolationOutcome, MeshMetricError> {
        let tetra = mesh.tetra(k)?;
        let class = classify_edge(mesh, tetra, edge, ip)?;
        log::trace!("tetra {k} edge {edge}: {class:?}");

        let (p1, p2) = tetra.edge_endpoints(edge)?;
        let metric = match class {
            EdgeClass::Ridge { normal } => {
                self.ops.ridge_metric(mesh, field, p1, p2, s, &normal)?
            }
            EdgeClass::BoundaryRegular { xt } => {
                let Some(face) = xt.boundary_face_of_edge(edge)? else {
                    log::debug!(
                        "tetra {k} edge {edge} is tagged boundary but has no boundary face"
                    );
                    return Ok(InterpolationOutcome::TopologicalMismatch);
                };
                let tria = mesh.boundary_triangle(k, face)?;
                let local = FACE_EDGE_LOCAL[face][edge].ok_or(
                    MeshMetricError::LocalIndexOutOfRange {
                        what: "face edge",
                        index: edge,
                    },
                )?;
                let (first, _) = tria.edge_endpoints(local)?;
                let s_tria = if first == p1 { s } else { 1.0 - s };
                self.ops
                    .regular_boundary_metric(mesh, field, &tria, local, s_tria)?
            }
            EdgeClass::Internal => self.internal_edge_metric(mesh, field, tetra, p1, p2, s)?,
        };
        field.set_tensor(ip, &metric)?;
        Ok(InterpolationOutcome::Interpolated)
    }

    /// Anisotropic edge interpolation reading both endpoints' stored tensors.
    pub fn raw_anisotropic_edge<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &mut MetricField<S>,
        k: usize,
        edge: usize,
        ip: PointId,
        s: f64,
    ) -> Result<(), MeshMetricError> {
        let (p1, p2) = mesh.tetra(k)?.edge_endpoints(edge)?;
        let metric = blend_pair(&field.tensor(p1)?, &field.tensor(p2)?, s)?;
        field.set_tensor(ip, &metric)
    }

    /// `Σ cb[v]·size[v]`.
    pub fn isotropic_barycentric<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &mut MetricField<S>,
        k: usize,
        ip: PointId,
        cb: &[f64; 4],
    ) -> Result<(), MeshMetricError> {
        let tetra = mesh.tetra(k)?;
        let mut size = 0.0;
        for (w, &v) in cb.iter().zip(&tetra.vertices) {
            size += w * field.scalar(v)?;
        }
        field.set_scalar(ip, size)
    }

    /// Point-type-aware anisotropic interpolation inside a tetra.
    pub fn anisotropic_barycentric<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &mut MetricField<S>,
        k: usize,
        ip: PointId,
        cb: &[f64; 4],
    ) -> Result<(), MeshMetricError> {
        let tetra = mesh.tetra(k)?;
        let mut metrics = [SymTensor::ZERO; 4];
        for (m, &v) in metrics.iter_mut().zip(&tetra.vertices) {
            *m = self.vertex_metric(mesh, field, tetra, v)?;
        }
        let metric = blend_barycentric(&metrics, cb)?;
        field.set_tensor(ip, &metric)
    }

    /// Anisotropic interpolation inside a tetra from stored tensors.
    pub fn raw_anisotropic_barycentric<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &mut MetricField<S>,
        k: usize,
        ip: PointId,
        cb: &[f64; 4],
    ) -> Result<(), MeshMetricError> {
        let tetra = mesh.tetra(k)?;
        let mut metrics = [SymTensor::ZERO; 4];
        for (m, &v) in metrics.iter_mut().zip(&tetra.vertices) {
            *m = field.tensor(v)?;
        }
        let metric = blend_barycentric(&metrics, cb)?;
        field.set_tensor(ip, &metric)
    }

    /// Tensor representing vertex `p` of `tetra`: stored tensor for
    /// singular, non-manifold and regular points; the tetra's mean metric
    /// for ridge points.
    fn vertex_metric<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &MetricField<S>,
        tetra: &Tetra,
        p: PointId,
    ) -> Result<SymTensor, MeshMetricError> {
        let tag = mesh.point(p)?.tag;
        if tag.is_singular() || tag.is_non_manifold() {
            field.tensor(p)
        } else if tag.is_ridge() {
            self.ops.mean_metric(mesh, field, tetra)
        } else {
            field.tensor(p)
        }
    }

    fn internal_edge_metric<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &MetricField<S>,
        tetra: &Tetra,
        p1: PointId,
        p2: PointId,
        s: f64,
    ) -> Result<SymTensor, MeshMetricError> {
        let m1 = self.vertex_metric(mesh, field, tetra, p1)?;
        let m2 = self.vertex_metric(mesh, field, tetra, p2)?;
        let mr = blend_pair(&m1, &m2, s)?;
        if mr.zz().abs() < self.options.degenerate_tolerance {
            log::warn!(
                "degenerate interpolated metric on edge {p1}-{p2}: m1 {:?} m2 {:?} result {:?}",
                m1.coefficients(),
                m2.coefficients(),
                mr.coefficients()
            );
            return Err(MeshMetricError::invalid_metric(format!(
                "interpolated metric on edge {p1}-{p2} has |zz| = {:e}",
                mr.zz().abs()
            )));
        }
        Ok(mr)
    }
}

/// Picks the rule for `edge` of `tetra`. Ridge edges need the new point's
/// boundary normal.
fn classify_edge(
    mesh: &TetMesh,
    tetra: &Tetra,
    edge: usize,
    ip: PointId,
) -> Result<EdgeClass, MeshMetricError> {
    check_edge(edge)?;
    let Some(xt) = mesh.xtetra_of(tetra)? else {
        return Ok(EdgeClass::Internal);
    };
    let tag = xt.edge_tag(edge)?;
    if tag.is_ridge() {
        let Some(xp) = mesh.xpoint_of(ip)? else {
            log::error!("ridge interpolation at point {ip} without boundary normal");
            return Err(MeshMetricError::MissingBoundaryNormal(ip));
        };
        Ok(EdgeClass::Ridge { normal: xp.n1 })
    } else if tag.is_boundary() {
        Ok(EdgeClass::BoundaryRegular { xt: *xt })
    } else {
        Ok(EdgeClass::Internal)
    }
}

fn blend_pair(m1: &SymTensor, m2: &SymTensor, s: f64) -> Result<SymTensor, MeshMetricError> {
    SymTensor::inverse_lerp(m1, m2, s).inspect_err(|e| log::warn!("edge interpolation: {e}"))
}

fn blend_barycentric(metrics: &[SymTensor; 4], cb: &[f64; 4]) -> Result<SymTensor, MeshMetricError> {
    let mut sum = SymTensor::ZERO;
    for (m, &w) in metrics.iter().zip(cb) {
        let inv = m
            .try_inverse()
            .inspect_err(|e| log::warn!("barycentric interpolation: {e}"))?;
        sum += inv * w;
    }
    sum.try_inverse()
        .inspect_err(|e| log::warn!("barycentric interpolation: {e}"))
}
