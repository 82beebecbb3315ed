//! Parameters of a monthly water-area query.

use serde::{Deserialize, Serialize};
use water_common::{BoundingBox, PIXEL_SCALE_M};

/// Dynamic World, near-real-time 10 m land cover probabilities.
pub const DYNAMIC_WORLD_COLLECTION: &str = "GOOGLE/DYNAMICWORLD/V1";

/// Which raster is reduced and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Image collection identifier.
    #[serde(default = "default_collection_id")]
    pub collection_id: String,

    /// Probability band averaged per month.
    #[serde(default = "default_band")]
    pub band: String,

    /// Nominal reduction scale in meters.
    #[serde(default = "default_scale_m")]
    pub scale_m: f64,

    /// Pixel ceiling passed to the reduction.
    #[serde(default = "default_max_pixels")]
    pub max_pixels: f64,

    /// Let the service coarsen the scale instead of failing on too many pixels.
    #[serde(default = "default_best_effort")]
    pub best_effort: bool,
}

fn default_collection_id() -> String {
    DYNAMIC_WORLD_COLLECTION.to_string()
}

fn default_band() -> String {
    "water".to_string()
}

fn default_scale_m() -> f64 {
    PIXEL_SCALE_M
}

fn default_max_pixels() -> f64 {
    1e12
}

fn default_best_effort() -> bool {
    true
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            collection_id: default_collection_id(),
            band: default_band(),
            scale_m: default_scale_m(),
            max_pixels: default_max_pixels(),
            best_effort: default_best_effort(),
        }
    }
}

/// One run's query: where, at what probability threshold, against which dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterQuery {
    pub bbox: BoundingBox,
    pub threshold: f64,
    pub dataset: DatasetConfig,
}

impl WaterQuery {
    /// Query against the default Dynamic World dataset.
    pub fn new(bbox: BoundingBox, threshold: f64) -> Self {
        Self {
            bbox,
            threshold,
            dataset: DatasetConfig::default(),
        }
    }

    pub fn with_dataset(mut self, dataset: DatasetConfig) -> Self {
        self.dataset = dataset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_defaults() {
        let dataset = DatasetConfig::default();
        assert_eq!(dataset.collection_id, "GOOGLE/DYNAMICWORLD/V1");
        assert_eq!(dataset.band, "water");
        assert_eq!(dataset.scale_m, 10.0);
        assert!(dataset.best_effort);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dataset: DatasetConfig = serde_yaml::from_str("band: flooded_vegetation").unwrap();
        assert_eq!(dataset.band, "flooded_vegetation");
        assert_eq!(dataset.collection_id, DYNAMIC_WORLD_COLLECTION);
        assert_eq!(dataset.max_pixels, 1e12);
    }
}
