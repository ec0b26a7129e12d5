//! In-memory tetrahedral mesh: points, tetras and their boundary records.
//!
//! The interpolation engine only reads this structure. Connectivity is built
//! and mutated by the remeshing driver, which must serialize point insertion
//! so that no two interpolations touching the same data run concurrently.

use crate::mesh_error::MeshMetricError;
use crate::topology::point::PointId;
use crate::topology::tags::Tag;
use crate::topology::tetra::{FACE_EDGES, FACE_VERTICES, Tetra, XTetra, check_face};

/// A mesh vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshPoint {
    pub coords: [f64; 3],
    pub tag: Tag,
    /// Index of the boundary-normal record, for surface points.
    pub xp: Option<usize>,
}

/// Boundary-normal record of a surface point.
///
/// Ridge points carry one normal per adjacent surface patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct XPoint {
    pub n1: [f64; 3],
    pub n2: [f64; 3],
}

/// Surface triangle reconstructed from a boundary face of a tetra.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryTriangle {
    pub vertices: [PointId; 3],
    /// Tag of triangle edge `j` (opposite vertex `j`).
    pub edge_tags: [Tag; 3],
    pub reference: i32,
    /// Tetra the face was taken from.
    pub tetra: usize,
    /// Local face index in that tetra.
    pub face: usize,
}

impl BoundaryTriangle {
    /// Endpoints of triangle-local edge `edge` (opposite vertex `edge`).
    pub fn edge_endpoints(&self, edge: usize) -> Result<(PointId, PointId), MeshMetricError> {
        if edge >= 3 {
            return Err(MeshMetricError::LocalIndexOutOfRange {
                what: "triangle edge",
                index: edge,
            });
        }
        Ok((
            self.vertices[(edge + 1) % 3],
            self.vertices[(edge + 2) % 3],
        ))
    }
}

/// Tetrahedral mesh with optional boundary records.
#[derive(Clone, Debug, Default)]
pub struct TetMesh {
    points: Vec<MeshPoint>,
    xpoints: Vec<XPoint>,
    tetras: Vec<Tetra>,
    xtetras: Vec<XTetra>,
}

impl TetMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_tetras(&self) -> usize {
        self.tetras.len()
    }

    /// Appends a point and returns its id.
    pub fn add_point(&mut self, coords: [f64; 3], tag: Tag) -> Result<PointId, MeshMetricError> {
        let id = PointId::from_index(self.points.len())?;
        self.points.push(MeshPoint {
            coords,
            tag,
            xp: None,
        });
        Ok(id)
    }

    /// Attaches a boundary-normal record to `point`, returning its index.
    pub fn attach_xpoint(&mut self, point: PointId, xp: XPoint) -> Result<usize, MeshMetricError> {
        let idx = self.xpoints.len();
        self.point_mut(point)?.xp = Some(idx);
        self.xpoints.push(xp);
        Ok(idx)
    }

    /// Appends a tetra and returns its index. Vertices must already exist.
    pub fn add_tetra(&mut self, tetra: Tetra) -> Result<usize, MeshMetricError> {
        for v in tetra.vertices {
            self.point(v)?;
        }
        if let Some(xt) = tetra.xt {
            if xt >= self.xtetras.len() {
                return Err(MeshMetricError::MissingExtendedRecord {
                    what: "xtetra",
                    index: xt,
                });
            }
        }
        self.tetras.push(tetra);
        Ok(self.tetras.len() - 1)
    }

    /// Attaches a boundary record to tetra `k`, returning its index.
    pub fn attach_xtetra(&mut self, k: usize, xt: XTetra) -> Result<usize, MeshMetricError> {
        let idx = self.xtetras.len();
        self.tetras
            .get_mut(k)
            .ok_or(MeshMetricError::TetraOutOfRange(k))?
            .xt = Some(idx);
        self.xtetras.push(xt);
        Ok(idx)
    }

    pub fn point(&self, p: PointId) -> Result<&MeshPoint, MeshMetricError> {
        self.points
            .get(p.index())
            .ok_or(MeshMetricError::PointOutOfRange(p))
    }

    pub fn point_mut(&mut self, p: PointId) -> Result<&mut MeshPoint, MeshMetricError> {
        self.points
            .get_mut(p.index())
            .ok_or(MeshMetricError::PointOutOfRange(p))
    }

    pub fn tetra(&self, k: usize) -> Result<&Tetra, MeshMetricError> {
        self.tetras.get(k).ok_or(MeshMetricError::TetraOutOfRange(k))
    }

    /// Boundary record of `tetra`, if it has one.
    pub fn xtetra_of(&self, tetra: &Tetra) -> Result<Option<&XTetra>, MeshMetricError> {
        tetra
            .xt
            .map(|idx| {
                self.xtetras
                    .get(idx)
                    .ok_or(MeshMetricError::MissingExtendedRecord {
                        what: "xtetra",
                        index: idx,
                    })
            })
            .transpose()
    }

    /// Boundary-normal record of `p`, if it has one.
    pub fn xpoint_of(&self, p: PointId) -> Result<Option<&XPoint>, MeshMetricError> {
        self.point(p)?
            .xp
            .map(|idx| {
                self.xpoints
                    .get(idx)
                    .ok_or(MeshMetricError::MissingExtendedRecord {
                        what: "xpoint",
                        index: idx,
                    })
            })
            .transpose()
    }

    /// Rebuilds the surface triangle lying on face `face` of tetra `k`.
    ///
    /// Tetra `k` must carry a boundary record.
    pub fn boundary_triangle(
        &self,
        k: usize,
        face: usize,
    ) -> Result<BoundaryTriangle, MeshMetricError> {
        check_face(face)?;
        let tetra = self.tetra(k)?;
        let xt = self
            .xtetra_of(tetra)?
            .ok_or(MeshMetricError::MissingExtendedRecord {
                what: "xtetra",
                index: k,
            })?;
        let [a, b, c] = FACE_VERTICES[face];
        let [e0, e1, e2] = FACE_EDGES[face];
        Ok(BoundaryTriangle {
            vertices: [tetra.vertices[a], tetra.vertices[b], tetra.vertices[c]],
            edge_tags: [xt.edge_tags[e0], xt.edge_tags[e1], xt.edge_tags[e2]],
            reference: xt.face_refs[face],
            tetra: k,
            face,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::tetra::{EDGE_VERTICES, FACE_EDGE_LOCAL};

    fn unit_tet() -> (TetMesh, usize) {
        let mut mesh = TetMesh::new();
        let coords = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let ids: Vec<_> = coords
            .iter()
            .map(|c| mesh.add_point(*c, Tag::NONE).unwrap())
            .collect();
        let k = mesh
            .add_tetra(Tetra::new([ids[0], ids[1], ids[2], ids[3]], 1))
            .unwrap();
        (mesh, k)
    }

    #[test]
    fn points_are_numbered_from_one() {
        let (mesh, k) = unit_tet();
        let t = mesh.tetra(k).unwrap();
        assert_eq!(t.vertices[0].get(), 1);
        assert_eq!(t.vertices[3].get(), 4);
        assert_eq!(mesh.num_points(), 4);
    }

    #[test]
    fn tetra_with_unknown_vertex_is_rejected() {
        let (mut mesh, _) = unit_tet();
        let ghost = PointId::new(99).unwrap();
        let t = Tetra::new([ghost, ghost, ghost, ghost], 0);
        assert_eq!(
            mesh.add_tetra(t),
            Err(MeshMetricError::PointOutOfRange(ghost))
        );
    }

    #[test]
    fn boundary_triangle_matches_face_tables() {
        let (mut mesh, k) = unit_tet();
        let mut xt = XTetra::default();
        xt.face_tags[1] = Tag::BDY;
        xt.face_refs[1] = 7;
        xt.edge_tags[2] = Tag::BDY | Tag::REF;
        mesh.attach_xtetra(k, xt).unwrap();

        let tria = mesh.boundary_triangle(k, 1).unwrap();
        assert_eq!(tria.reference, 7);
        assert_eq!((tria.tetra, tria.face), (k, 1));
        let ids: Vec<u64> = tria.vertices.iter().map(|p| p.get()).collect();
        assert_eq!(ids, vec![1, 4, 3]);

        // tetra edge 2 (0-3) sits at triangle-local index 2 of face 1
        let local = FACE_EDGE_LOCAL[1][2].unwrap();
        assert_eq!(tria.edge_tags[local], Tag::BDY | Tag::REF);
        let (a, b) = tria.edge_endpoints(local).unwrap();
        let t = mesh.tetra(k).unwrap();
        let [va, vb] = EDGE_VERTICES[2];
        let expected = [t.vertices[va], t.vertices[vb]];
        assert!(expected.contains(&a) && expected.contains(&b));
    }

    #[test]
    fn boundary_triangle_needs_xtetra() {
        let (mesh, k) = unit_tet();
        assert!(mesh.boundary_triangle(k, 0).is_err());
    }

    #[test]
    fn xpoint_lookup() {
        let (mut mesh, _) = unit_tet();
        let p = PointId::new(2).unwrap();
        assert_eq!(mesh.xpoint_of(p).unwrap(), None);
        let xp = XPoint {
            n1: [0.0, 0.0, 1.0],
            n2: [0.0, 1.0, 0.0],
        };
        mesh.attach_xpoint(p, xp).unwrap();
        assert_eq!(mesh.xpoint_of(p).unwrap(), Some(&xp));
    }
}
