use photoalign_core::{Correspondence, Descriptor, FeatureSet};
use rayon::prelude::*;

use crate::params::MatchParams;

#[inline]
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}

/// Brute-force Hamming matcher with Lowe ratio filtering.
///
/// For every candidate descriptor the two nearest reference neighbours are
/// found; the match is kept only when the best distance is clearly below the
/// second best. Several candidates may map to the same reference feature;
/// resolving that is left to robust estimation downstream.
pub struct HammingMatcher {
    params: MatchParams,
}

impl Default for HammingMatcher {
    fn default() -> Self {
        Self::new(MatchParams::default())
    }
}

impl HammingMatcher {
    pub fn new(params: MatchParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &MatchParams {
        &self.params
    }

    /// Match `candidate` descriptors against `reference`.
    ///
    /// Returns an empty set (not an error) when nothing passes the filter.
    /// A candidate without a second neighbour to compare against is treated
    /// as unverifiable and rejected.
    pub fn match_sets(&self, reference: &FeatureSet, candidate: &FeatureSet) -> Vec<Correspondence> {
        if reference.len() < 2 || candidate.is_empty() {
            return Vec::new();
        }

        candidate
            .descriptors
            .par_iter()
            .enumerate()
            .filter_map(|(ci, cd)| {
                let mut best = u32::MAX;
                let mut second = u32::MAX;
                let mut best_ref = 0usize;
                for (ri, rd) in reference.descriptors.iter().enumerate() {
                    let d = hamming_distance(cd, rd);
                    if d < best {
                        second = best;
                        best = d;
                        best_ref = ri;
                    } else if d < second {
                        second = d;
                    }
                }

                if second == u32::MAX {
                    return None;
                }
                if let Some(cap) = self.params.max_distance {
                    if best > cap {
                        return None;
                    }
                }
                if (best as f32) < self.params.ratio * second as f32 {
                    Some(Correspondence {
                        reference: best_ref,
                        candidate: ci,
                        distance: best,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;
    use photoalign_core::{Keypoint, DESCRIPTOR_SIZE};

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint {
            position: Point2::new(x, y),
            angle: 0.0,
            response: 1.0,
            octave: 0,
            scale: 1.0,
        }
    }

    fn descriptor(fill: u8) -> Descriptor {
        [fill; DESCRIPTOR_SIZE]
    }

    fn feature_set(descs: &[Descriptor]) -> FeatureSet {
        FeatureSet {
            keypoints: descs.iter().enumerate().map(|(i, _)| kp(i as f32, 0.0)).collect(),
            descriptors: descs.to_vec(),
        }
    }

    #[test]
    fn distinct_descriptors_match_their_twin() {
        let reference = feature_set(&[descriptor(0b0000_0000), descriptor(0b1111_1111)]);
        let candidate = feature_set(&[descriptor(0b1111_1111)]);
        let matches = HammingMatcher::default().match_sets(&reference, &candidate);
        assert_eq!(
            matches,
            vec![Correspondence {
                reference: 1,
                candidate: 0,
                distance: 0,
            }]
        );
    }

    #[test]
    fn ambiguous_matches_fail_the_ratio_test() {
        // Two identical reference descriptors: best == second, no decision.
        let reference = feature_set(&[descriptor(0xAA), descriptor(0xAA)]);
        let candidate = feature_set(&[descriptor(0xAA)]);
        assert!(HammingMatcher::default()
            .match_sets(&reference, &candidate)
            .is_empty());
    }

    #[test]
    fn lone_reference_descriptor_is_unverifiable() {
        let reference = feature_set(&[descriptor(0x0F)]);
        let candidate = feature_set(&[descriptor(0x0F)]);
        assert!(HammingMatcher::default()
            .match_sets(&reference, &candidate)
            .is_empty());
    }

    #[test]
    fn absolute_cap_rejects_distant_matches() {
        let reference = feature_set(&[descriptor(0x00), descriptor(0xFF)]);
        let candidate = feature_set(&[descriptor(0x03)]);
        // Passes the ratio test (64 vs 192)...
        let lax = HammingMatcher::new(MatchParams {
            ratio: 0.75,
            max_distance: None,
        });
        assert_eq!(lax.match_sets(&reference, &candidate).len(), 1);
        // ...but not an absolute distance cap.
        let strict = HammingMatcher::new(MatchParams {
            ratio: 0.75,
            max_distance: Some(16),
        });
        assert!(strict.match_sets(&reference, &candidate).is_empty());
    }

    #[test]
    fn many_candidates_may_share_a_reference() {
        let reference = feature_set(&[descriptor(0x00), descriptor(0xFF)]);
        let candidate = feature_set(&[descriptor(0x01), descriptor(0x02)]);
        let matches = HammingMatcher::default().match_sets(&reference, &candidate);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.reference == 0));
    }
}
