//! Size-map interpolation for anisotropic tetrahedral remeshing.
//!
//! When the remesher inserts a point on an edge or inside a tetra, the new
//! point needs a size (isotropic field) or a metric tensor (anisotropic
//! field) before the next quality or length evaluation. [`MetricInterpolator`]
//! computes it from the neighbouring vertices, delegating ridge and surface
//! edges to a [`BoundaryMetricOps`] implementation.

pub mod interpolate;
pub mod ops;
pub mod options;

pub use interpolate::{InterpolationOutcome, MetricInterpolator};
pub use ops::{BoundaryMetricOps, StoredTensorOps};
pub use options::{InterpolationOptions, RidgeMetricStorage};
