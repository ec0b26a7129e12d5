//! Geometry utilities for mesh-metric.
//!
//! Currently only the symmetric tensor type used for sizing metrics.

pub mod tensor;
