use photoalign_core::RansacParams;
use photoalign_features::{FeatureParams, MatchParams};
use serde::{Deserialize, Serialize};

/// Configuration for the alignment pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlignParams {
    /// Detector configuration (including the `max_features` cap).
    pub features: FeatureParams,
    /// Matcher configuration (Lowe ratio, optional distance cap).
    pub matching: MatchParams,
    /// Robust similarity estimation configuration, seed included.
    pub ransac: RansacParams,
    /// Erosion radius (pixels) applied to the combined overlap mask as a
    /// safety margin against interpolation artefacts at mask borders.
    pub erode: usize,
    /// An image with fewer detected features than this fails detection.
    pub min_features: usize,
    /// Fewer surviving correspondences than this fails matching.
    pub min_matches: usize,
    /// Skip-and-continue: drop a non-reference image whose detection,
    /// matching, or estimation fails instead of aborting the batch.
    /// Reference failures and an empty overlap still abort.
    pub skip_failed: bool,
    /// Retain the uncropped warped images in the output for inspection.
    pub keep_uncropped: bool,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            features: FeatureParams::default(),
            matching: MatchParams::default(),
            ransac: RansacParams::default(),
            erode: 4,
            min_features: 8,
            min_matches: 8,
            skip_failed: false,
            keep_uncropped: false,
        }
    }
}
