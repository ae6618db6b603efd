use serde::{Deserialize, Serialize};

/// Configuration for the FAST + steered-BRIEF detector.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FeatureParams {
    /// Upper bound on the number of returned features; the strongest
    /// responses survive when the cap is hit.
    pub max_features: usize,
    /// FAST segment-test intensity threshold.
    pub fast_threshold: u8,
    /// Pyramid levels (level 0 is the input resolution).
    pub n_levels: u8,
    /// Downscale factor between consecutive pyramid levels.
    pub scale_factor: f32,
    /// Grid cell size (pixels) for non-maximum suppression.
    pub nms_radius: f32,
    /// Patch radius for the intensity-centroid orientation.
    pub orientation_radius: i32,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            max_features: 4000,
            fast_threshold: 20,
            n_levels: 4,
            scale_factor: 1.2,
            nms_radius: 5.0,
            orientation_radius: 15,
        }
    }
}

/// Configuration for the brute-force Hamming matcher.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MatchParams {
    /// Lowe ratio: accept a match only if `best < ratio * second_best`.
    pub ratio: f32,
    /// Optional absolute cap on the accepted Hamming distance.
    pub max_distance: Option<u32>,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            ratio: 0.75,
            max_distance: None,
        }
    }
}
