use photoalign_core::{Correspondence, FeatureSet, GrayImage};
use photoalign_features::{HammingMatcher, OrbDetector};

/// Detector capability: keypoints + descriptors for a single image.
///
/// Implementations must be deterministic for a fixed input and
/// configuration, and should rank by response internally so that any cap on
/// the feature count keeps the most distinctive features.
pub trait FeatureExtractor: Sync {
    fn extract(&self, image: &GrayImage) -> FeatureSet;
}

/// Matcher capability: candidate-to-reference correspondences.
///
/// An empty result is a valid outcome, not an error; the pipeline decides
/// whether the count is sufficient for estimation.
pub trait DescriptorMatcher: Sync {
    fn match_sets(&self, reference: &FeatureSet, candidate: &FeatureSet) -> Vec<Correspondence>;
}

impl FeatureExtractor for OrbDetector {
    fn extract(&self, image: &GrayImage) -> FeatureSet {
        self.detect(image)
    }
}

impl DescriptorMatcher for HammingMatcher {
    fn match_sets(&self, reference: &FeatureSet, candidate: &FeatureSet) -> Vec<Correspondence> {
        HammingMatcher::match_sets(self, reference, candidate)
    }
}
