//! Configuration of the metric interpolation engine.

use serde::{Deserialize, Serialize};

/// How the metric field stores tensors at ridge points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RidgeMetricStorage {
    /// Ridge points hold direction-dependent data (after the size map has
    /// been defined); interpolation resolves each vertex by its point type.
    #[default]
    Directional,
    /// Every point holds a plain tensor (before the size map has been
    /// defined); interpolation reads stored tensors directly.
    Raw,
}

/// Options for [`MetricInterpolator`](crate::adapt::MetricInterpolator).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationOptions {
    /// An internal-edge result whose `zz` coefficient is smaller in
    /// magnitude than this is rejected as degenerate.
    pub degenerate_tolerance: f64,
    /// Selects the point-type-aware or the raw anisotropic routines.
    pub ridge_storage: RidgeMetricStorage,
}

impl Default for InterpolationOptions {
    fn default() -> Self {
        Self {
            degenerate_tolerance: 1e-6,
            ridge_storage: RidgeMetricStorage::Directional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let opts: InterpolationOptions = serde_json::from_str(r#"{"ridge_storage": "Raw"}"#).unwrap();
        assert_eq!(opts.ridge_storage, RidgeMetricStorage::Raw);
        assert_eq!(opts.degenerate_tolerance, 1e-6);
    }

    #[test]
    fn json_roundtrip() {
        let opts = InterpolationOptions {
            degenerate_tolerance: 1e-9,
            ridge_storage: RidgeMetricStorage::Directional,
        };
        let text = serde_json::to_string(&opts).unwrap();
        let back: InterpolationOptions = serde_json::from_str(&text).unwrap();
        assert_eq!(back, opts);
    }
}
