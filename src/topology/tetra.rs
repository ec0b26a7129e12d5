//! Tetrahedra, their extended boundary records and local numbering tables.
//!
//! Local numbering:
//! - vertices `0..4`;
//! - face `f` is the face opposite vertex `f`;
//! - edges `0..6` are `[0-1, 0-2, 0-3, 1-2, 1-3, 2-3]`.

use crate::mesh_error::MeshMetricError;
use crate::topology::point::PointId;
use crate::topology::tags::Tag;

/// Local vertices of each edge.
pub const EDGE_VERTICES: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// The two faces sharing each edge.
pub const EDGE_FACES: [[usize; 2]; 6] = [[2, 3], [1, 3], [1, 2], [0, 3], [0, 2], [0, 1]];

/// Local vertices of each face, ordered so the normal points outward.
pub const FACE_VERTICES: [[usize; 3]; 4] = [[1, 2, 3], [0, 3, 2], [0, 1, 3], [0, 2, 1]];

/// Tetra edges of each face; entry `j` is the edge opposite face vertex `j`.
pub const FACE_EDGES: [[usize; 3]; 4] = [[5, 4, 3], [5, 1, 2], [4, 2, 0], [3, 0, 1]];

/// Inverse of [`FACE_EDGES`]: triangle-local index of tetra edge `e` in face
/// `f`, or `None` when the edge is not on the face.
pub const FACE_EDGE_LOCAL: [[Option<usize>; 6]; 4] = [
    [None, None, None, Some(2), Some(1), Some(0)],
    [None, Some(1), Some(2), None, None, Some(0)],
    [Some(2), None, Some(1), None, Some(0), None],
    [Some(1), Some(2), None, Some(0), None, None],
];

/// Checks a local edge index.
pub fn check_edge(edge: usize) -> Result<(), MeshMetricError> {
    if edge < 6 {
        Ok(())
    } else {
        Err(MeshMetricError::LocalIndexOutOfRange {
            what: "edge",
            index: edge,
        })
    }
}

/// Checks a local face index.
pub fn check_face(face: usize) -> Result<(), MeshMetricError> {
    if face < 4 {
        Ok(())
    } else {
        Err(MeshMetricError::LocalIndexOutOfRange {
            what: "face",
            index: face,
        })
    }
}

/// A tetrahedron: four vertex ids, a domain reference and an optional link
/// to its boundary record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Tetra {
    pub vertices: [PointId; 4],
    /// Domain reference (material) of the element.
    pub reference: i32,
    /// Index into the mesh's extended records, when the tetra touches the boundary.
    pub xt: Option<usize>,
}

impl Tetra {
    pub fn new(vertices: [PointId; 4], reference: i32) -> Self {
        Self {
            vertices,
            reference,
            xt: None,
        }
    }

    /// Global endpoints of local edge `edge`.
    pub fn edge_endpoints(&self, edge: usize) -> Result<(PointId, PointId), MeshMetricError> {
        check_edge(edge)?;
        let [a, b] = EDGE_VERTICES[edge];
        Ok((self.vertices[a], self.vertices[b]))
    }
}

/// Boundary tags of a tetra touching the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct XTetra {
    pub face_tags: [Tag; 4],
    pub edge_tags: [Tag; 6],
    /// Surface reference of each face.
    pub face_refs: [i32; 4],
}

impl XTetra {
    /// Tag of local edge `edge`.
    pub fn edge_tag(&self, edge: usize) -> Result<Tag, MeshMetricError> {
        check_edge(edge)?;
        Ok(self.edge_tags[edge])
    }

    /// First face incident to `edge` that is tagged boundary, if any.
    pub fn boundary_face_of_edge(&self, edge: usize) -> Result<Option<usize>, MeshMetricError> {
        check_edge(edge)?;
        Ok(EDGE_FACES[edge]
            .into_iter()
            .find(|&face| self.face_tags[face].is_boundary()))
    }
}
