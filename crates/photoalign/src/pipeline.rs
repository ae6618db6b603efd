use std::collections::BTreeSet;

use nalgebra::Point2;
use photoalign_core::{
    bounding_box, erode, fit_similarity_ransac, intersect_masks, largest_component, rgb_to_gray,
    warp_rgb, CropRect, FeatureSet, Keypoint, RgbImage, Similarity, SimilarityFitError,
    ValidityMask,
};
use photoalign_features::{HammingMatcher, OrbDetector};
use rayon::prelude::*;

use crate::error::AlignError;
use crate::overlay::render_keypoint_overlay;
use crate::params::AlignParams;
use crate::traits::{DescriptorMatcher, FeatureExtractor};

/// Result of a pipeline run.
#[derive(Clone, Debug)]
pub struct Alignment {
    /// Final outputs: every retained input warped into the reference frame
    /// and cropped to `crop`, in input order. All have identical dimensions.
    pub images: Vec<RgbImage>,
    /// The common overlap window in the reference frame.
    pub crop: CropRect,
    /// One transform per retained input (identity first), mapping that
    /// image's coordinates into the reference frame.
    pub transforms: Vec<Similarity>,
    /// Reference keypoints that participated in at least one match, for the
    /// diagnostic overlay.
    pub ref_keypoints: Vec<Keypoint>,
    /// Rendered keypoint overlay on the reference image.
    pub overlay: RgbImage,
    /// Uncropped warped images, retained only with
    /// [`AlignParams::keep_uncropped`]; empty otherwise.
    pub warped: Vec<RgbImage>,
    /// Input indices dropped in skip mode; empty when `skip_failed` is off.
    pub skipped: Vec<usize>,
}

/// Batch alignment pipeline.
///
/// Image 0 is the reference frame; every other image is matched against it,
/// warped into its coordinates, and all of them are cropped to the mutual
/// overlap. Any stage failure aborts the whole batch unless
/// [`AlignParams::skip_failed`] is set.
pub struct Aligner<E = OrbDetector, M = HammingMatcher> {
    params: AlignParams,
    extractor: E,
    matcher: M,
}

impl Aligner {
    /// Pipeline with the built-in FAST + steered-BRIEF detector and Hamming
    /// matcher configured from `params`.
    pub fn new(params: AlignParams) -> Self {
        let extractor = OrbDetector::new(params.features);
        let matcher = HammingMatcher::new(params.matching);
        Self {
            params,
            extractor,
            matcher,
        }
    }
}

impl<E: FeatureExtractor, M: DescriptorMatcher> Aligner<E, M> {
    /// Pipeline with caller-provided detector and matcher capabilities.
    pub fn with_capabilities(params: AlignParams, extractor: E, matcher: M) -> Self {
        Self {
            params,
            extractor,
            matcher,
        }
    }

    #[inline]
    pub fn params(&self) -> &AlignParams {
        &self.params
    }

    /// Run the batch pipeline over `images`.
    pub fn align(&self, images: &[RgbImage]) -> Result<Alignment, AlignError> {
        let reference = images.first().ok_or(AlignError::NoImages)?;
        let (canvas_w, canvas_h) = (reference.width, reference.height);

        // Per-image feature extraction, fanned out across images.
        let feature_sets: Vec<FeatureSet> = images
            .par_iter()
            .map(|img| self.extractor.extract(&rgb_to_gray(img)))
            .collect();

        let ref_set = &feature_sets[0];
        if ref_set.len() < self.params.min_features {
            return Err(AlignError::DetectionFailure {
                index: 0,
                found: ref_set.len(),
                needed: self.params.min_features,
            });
        }
        log::info!("reference image: {} keypoints", ref_set.len());

        // Match + estimate per non-reference image.
        let estimates: Vec<Result<(Similarity, Vec<usize>), AlignError>> = (1..images.len())
            .into_par_iter()
            .map(|index| self.estimate_against_reference(index, &feature_sets))
            .collect();

        let mut transforms = vec![Similarity::identity()];
        let mut retained = vec![0usize];
        let mut skipped = Vec::new();
        let mut matched_refs = BTreeSet::new();
        for (offset, estimate) in estimates.into_iter().enumerate() {
            let index = offset + 1;
            match estimate {
                Ok((transform, refs)) => {
                    transforms.push(transform);
                    retained.push(index);
                    matched_refs.extend(refs);
                }
                Err(err) if self.params.skip_failed => {
                    log::warn!("skipping image {index}: {err}");
                    skipped.push(index);
                }
                Err(err) => return Err(err),
            }
        }

        // Warp everything (reference included) onto the reference canvas.
        let warped: Vec<(RgbImage, ValidityMask)> = retained
            .par_iter()
            .zip(transforms.par_iter())
            .map(|(&index, transform)| {
                warp_rgb(&images[index], transform, canvas_w, canvas_h).ok_or(
                    AlignError::DegenerateTransform {
                        index,
                        source: SimilarityFitError::Degenerate,
                    },
                )
            })
            .collect::<Result<_, _>>()?;

        // Fan-in: one crop window valid in every mask.
        let masks: Vec<ValidityMask> = warped.iter().map(|(_, m)| m.clone()).collect();
        let crop = self.resolve_overlap(&masks)?;
        log::info!(
            "common overlap: x={} y={} w={} h={}",
            crop.x,
            crop.y,
            crop.width,
            crop.height
        );

        let warped_images: Vec<RgbImage> = warped.into_iter().map(|(img, _)| img).collect();
        let outputs: Vec<RgbImage> = warped_images
            .par_iter()
            .map(|img| img.crop(crop.x, crop.y, crop.width, crop.height))
            .collect();

        // Diagnostic overlay: matched reference keypoints, or every detected
        // one when the reference is the only image.
        let ref_keypoints: Vec<Keypoint> = if retained.len() == 1 {
            ref_set.keypoints.clone()
        } else {
            matched_refs
                .iter()
                .map(|&i| ref_set.keypoints[i])
                .collect()
        };
        let overlay = render_keypoint_overlay(reference, &ref_keypoints);

        Ok(Alignment {
            images: outputs,
            crop,
            transforms,
            ref_keypoints,
            overlay,
            warped: if self.params.keep_uncropped {
                warped_images
            } else {
                Vec::new()
            },
            skipped,
        })
    }

    /// Match image `index` against the reference and robustly estimate the
    /// transform into reference coordinates.
    ///
    /// Also reports which reference keypoints participated in a match, for
    /// the cumulative overlay.
    fn estimate_against_reference(
        &self,
        index: usize,
        feature_sets: &[FeatureSet],
    ) -> Result<(Similarity, Vec<usize>), AlignError> {
        let candidate = &feature_sets[index];
        if candidate.len() < self.params.min_features {
            return Err(AlignError::DetectionFailure {
                index,
                found: candidate.len(),
                needed: self.params.min_features,
            });
        }

        let reference = &feature_sets[0];
        let matches = self.matcher.match_sets(reference, candidate);
        log::debug!(
            "image {index}: {} keypoints, {} matches to reference",
            candidate.len(),
            matches.len()
        );

        let needed = self.params.min_matches.max(2);
        if matches.len() < needed {
            return Err(AlignError::InsufficientCorrespondences {
                index,
                found: matches.len(),
                needed,
            });
        }

        let pairs: Vec<(Point2<f32>, Point2<f32>)> = matches
            .iter()
            .map(|m| {
                (
                    candidate.keypoints[m.candidate].position,
                    reference.keypoints[m.reference].position,
                )
            })
            .collect();

        let fit = fit_similarity_ransac(&pairs, &self.params.ransac).map_err(|err| match err {
            SimilarityFitError::TooFewPairs { needed, got } => {
                AlignError::InsufficientCorrespondences {
                    index,
                    found: got,
                    needed,
                }
            }
            other => AlignError::DegenerateTransform {
                index,
                source: other,
            },
        })?;
        log::info!(
            "image {index}: similarity inliers {}/{}",
            fit.num_inliers,
            pairs.len()
        );

        let refs = matches.iter().map(|m| m.reference).collect();
        Ok((fit.transform, refs))
    }

    fn resolve_overlap(&self, masks: &[ValidityMask]) -> Result<CropRect, AlignError> {
        let empty = AlignError::EmptyOverlap {
            erode: self.params.erode,
        };
        let common = intersect_masks(masks).ok_or(empty)?;
        let eroded = erode(&common, self.params.erode);
        let main = largest_component(&eroded);
        bounding_box(&main).ok_or(AlignError::EmptyOverlap {
            erode: self.params.erode,
        })
    }
}
