//! Top-level module for tetrahedral mesh topology.
//!
//! This module provides the types the interpolation engine reads:
//! - point identifiers and geometric tags
//! - tetra connectivity with its local index tables
//! - boundary records (`XTetra`, `XPoint`) and the mesh that owns them

pub mod mesh;
pub mod point;
pub mod tags;
pub mod tetra;

pub use mesh::{BoundaryTriangle, MeshPoint, TetMesh, XPoint};
pub use point::PointId;
pub use tags::Tag;
pub use tetra::{Tetra, XTetra};
