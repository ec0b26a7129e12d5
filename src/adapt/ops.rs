//! Boundary-aware metric primitives used by the interpolation engine.
//!
//! Ridge and surface edges need knowledge of the surface (normals, ridge
//! storage layout) that the volume engine does not have. The engine hands
//! those cases to a [`BoundaryMetricOps`] implementation supplied by the
//! remeshing driver.

use crate::data::metric_field::MetricField;
use crate::data::storage::Storage;
use crate::geometry::tensor::SymTensor;
use crate::mesh_error::MeshMetricError;
use crate::topology::mesh::{BoundaryTriangle, TetMesh};
use crate::topology::point::PointId;
use crate::topology::tetra::Tetra;

/// Surface-aware interpolation primitives.
///
/// Implementations return the interpolated tensor; the engine writes it to
/// the new point's slot.
pub trait BoundaryMetricOps {
    /// Metric at parameter `s` along the ridge edge `p1 → p2`, for a new
    /// point whose first boundary normal is `normal`.
    fn ridge_metric<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &MetricField<S>,
        p1: PointId,
        p2: PointId,
        s: f64,
        normal: &[f64; 3],
    ) -> Result<SymTensor, MeshMetricError>;

    /// Metric at parameter `s` along the non-ridge surface edge `edge` of
    /// `tria`. `s` runs from the first to the second endpoint returned by
    /// [`BoundaryTriangle::edge_endpoints`].
    fn regular_boundary_metric<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &MetricField<S>,
        tria: &BoundaryTriangle,
        edge: usize,
        s: f64,
    ) -> Result<SymTensor, MeshMetricError>;

    /// Representative tensor for a ridge vertex of `tetra`, seen from that
    /// tetra.
    fn mean_metric<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &MetricField<S>,
        tetra: &Tetra,
    ) -> Result<SymTensor, MeshMetricError>;
}

/// [`BoundaryMetricOps`] for fields that store one plain tensor per point.
///
/// Surface edges use the same inverse blend as volume edges; the mean metric
/// of a tetra is the inverse-averaged tensor of its non-ridge vertices.
#[derive(Clone, Copy, Debug, Default)]
pub struct StoredTensorOps;

impl BoundaryMetricOps for StoredTensorOps {
    fn ridge_metric<S: Storage<f64>>(
        &self,
        _mesh: &TetMesh,
        field: &MetricField<S>,
        p1: PointId,
        p2: PointId,
        s: f64,
        _normal: &[f64; 3],
    ) -> Result<SymTensor, MeshMetricError> {
        SymTensor::inverse_lerp(&field.tensor(p1)?, &field.tensor(p2)?, s)
    }

    fn regular_boundary_metric<S: Storage<f64>>(
        &self,
        _mesh: &TetMesh,
        field: &MetricField<S>,
        tria: &BoundaryTriangle,
        edge: usize,
        s: f64,
    ) -> Result<SymTensor, MeshMetricError> {
        let (p1, p2) = tria.edge_endpoints(edge)?;
        SymTensor::inverse_lerp(&field.tensor(p1)?, &field.tensor(p2)?, s)
    }

    fn mean_metric<S: Storage<f64>>(
        &self,
        mesh: &TetMesh,
        field: &MetricField<S>,
        tetra: &Tetra,
    ) -> Result<SymTensor, MeshMetricError> {
        let mut sum = SymTensor::ZERO;
        let mut n = 0usize;
        for &v in &tetra.vertices {
            let tag = mesh.point(v)?.tag;
            if tag.is_ridge() && !(tag.is_singular() || tag.is_non_manifold()) {
                continue;
            }
            sum += field.tensor(v)?.try_inverse()?;
            n += 1;
        }
        if n == 0 {
            return Err(MeshMetricError::invalid_metric(
                "no non-ridge vertex to average in tetra",
            ));
        }
        (sum * (1.0 / n as f64)).try_inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tags::Tag;
    use crate::topology::tetra::XTetra;

    fn mesh_with_tags(tags: [Tag; 4]) -> (TetMesh, Tetra) {
        let mut mesh = TetMesh::new();
        let coords = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let mut ids = Vec::new();
        for (c, t) in coords.iter().zip(tags) {
            ids.push(mesh.add_point(*c, t).unwrap());
        }
        let tetra = Tetra::new([ids[0], ids[1], ids[2], ids[3]], 0);
        mesh.add_tetra(tetra).unwrap();
        (mesh, tetra)
    }

    #[test]
    fn mean_metric_skips_plain_ridge_points() {
        let (mesh, tetra) = mesh_with_tags([Tag::GEO, Tag::NONE, Tag::GEO | Tag::CRN, Tag::GEO]);
        let mut field = MetricField::anisotropic(4);
        field.set_tensor(tetra.vertices[0], &SymTensor::from_size(100.0)).unwrap();
        field.set_tensor(tetra.vertices[1], &SymTensor::from_size(1.0)).unwrap();
        field.set_tensor(tetra.vertices[2], &SymTensor::from_size(1.0)).unwrap();
        field.set_tensor(tetra.vertices[3], &SymTensor::ZERO).unwrap();

        let mean = StoredTensorOps.mean_metric(&mesh, &field, &tetra).unwrap();
        assert!(mean.approx_eq(&SymTensor::IDENTITY, 1e-12));
    }

    #[test]
    fn mean_metric_fails_on_all_ridge_tetra() {
        let (mesh, tetra) = mesh_with_tags([Tag::GEO; 4]);
        let field = MetricField::anisotropic(4);
        assert!(matches!(
            StoredTensorOps.mean_metric(&mesh, &field, &tetra),
            Err(MeshMetricError::InvalidMetric { .. })
        ));
    }

    #[test]
    fn regular_metric_follows_triangle_edge_orientation() {
        let (mut mesh, tetra) = mesh_with_tags([Tag::BDY; 4]);
        let mut xt = XTetra::default();
        xt.face_tags[0] = Tag::BDY;
        mesh.attach_xtetra(0, xt).unwrap();
        let tria = mesh.boundary_triangle(0, 0).unwrap();

        let mut field = MetricField::anisotropic(4);
        for (i, v) in tetra.vertices.iter().enumerate() {
            field
                .set_tensor(*v, &SymTensor::from_size(1.0 + i as f64))
                .unwrap();
        }
        let (first, _) = tria.edge_endpoints(1).unwrap();
        let m = StoredTensorOps
            .regular_boundary_metric(&mesh, &field, &tria, 1, 0.0)
            .unwrap();
        assert!(m.approx_eq(&field.tensor(first).unwrap(), 1e-12));
    }
}
