//! Data module: per-point storage and the metric field built on it.

pub mod metric_field;
pub mod storage;

pub use metric_field::{MetricField, MetricKind};
pub use storage::{Storage, VecStorage};
