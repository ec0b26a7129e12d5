//! # mesh-metric
//!
//! mesh-metric provides the size-map and material bookkeeping an anisotropic
//! tetrahedral remesher needs when it inserts points and discretizes a level
//! set across several material domains.
//!
//! ## Features
//! - Isotropic and anisotropic metric fields over mesh points, backed by a
//!   pluggable [`Storage`](crate::data::Storage)
//! - Metric interpolation at edge-split and interior points, aware of
//!   corners, ridges, non-manifold points and surface edges
//! - A constant-time lookup table answering which material references may be
//!   split by a level set and which ones are the result of a split
//!
//! ## Errors
//!
//! Every fallible operation returns [`MeshMetricError`](crate::mesh_error::MeshMetricError).
//! A boundary edge seen from a tetra without a boundary face through it is
//! not an error: the engine reports
//! [`InterpolationOutcome::TopologicalMismatch`](crate::adapt::InterpolationOutcome)
//! and the caller retries from another tetra of the edge shell.
//!
//! ## Invariant checks
//!
//! Types implementing [`DebugInvariants`] validate their internal state in
//! debug builds, or always when the `strict-invariants` or
//! `check-invariants` feature is enabled.

pub mod adapt;
pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod material;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::adapt::{
        BoundaryMetricOps, InterpolationOptions, InterpolationOutcome, MetricInterpolator,
        RidgeMetricStorage, StoredTensorOps,
    };
    pub use crate::data::metric_field::{MetricField, MetricKind};
    pub use crate::data::storage::{Storage, VecStorage};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::tensor::SymTensor;
    pub use crate::material::{DomainMaterial, MaterialRegistry, MaterialSlot, Polarity, SplitRule};
    pub use crate::mesh_error::MeshMetricError;
    pub use crate::topology::mesh::{BoundaryTriangle, MeshPoint, TetMesh, XPoint};
    pub use crate::topology::point::PointId;
    pub use crate::topology::tags::Tag;
    pub use crate::topology::tetra::{Tetra, XTetra};
}
