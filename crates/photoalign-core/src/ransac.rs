//! RANSAC wrapper for outlier-robust similarity estimation.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::similarity::{fit_similarity_least_squares, Similarity};

/// Scale factors outside `[MIN_SCALE, 1/MIN_SCALE]` are treated as collapsed
/// or numerically unstable fits.
const MIN_SCALE: f64 = 1e-3;

/// Tuning knobs for [`fit_similarity_ransac`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RansacParams {
    /// Hard cap on hypothesis iterations.
    pub max_iters: usize,
    /// Reprojection error (pixels) below which a pair counts as an inlier.
    pub inlier_threshold: f64,
    /// Desired probability of having sampled at least one all-inlier subset;
    /// shrinks the iteration count adaptively as better models are found.
    pub confidence: f64,
    /// Minimal inlier support needed to accept a model.
    pub min_inliers: usize,
    /// RNG seed, fixed so fits are reproducible.
    pub seed: u64,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            max_iters: 2000,
            inlier_threshold: 3.0,
            confidence: 0.995,
            min_inliers: 8,
            seed: 7,
        }
    }
}

/// A robust fit: the model plus its inlier support.
#[derive(Clone, Debug)]
pub struct RansacFit {
    pub transform: Similarity,
    /// Per-pair inlier flags, same order as the input pairs.
    pub inliers: Vec<bool>,
    pub num_inliers: usize,
}

/// Errors from robust similarity estimation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityFitError {
    #[error("too few point pairs for a similarity fit (need {needed}, got {got})")]
    TooFewPairs { needed: usize, got: usize },
    #[error("too few inliers to accept a fit (need {needed}, found {found})")]
    InsufficientInliers { needed: usize, found: usize },
    #[error("robust fit did not converge to a usable transform")]
    Degenerate,
}

#[inline]
fn scale_is_sane(t: &Similarity) -> bool {
    let s = t.scale();
    s.is_finite() && s >= MIN_SCALE && s <= 1.0 / MIN_SCALE
}

fn count_inliers(
    pairs: &[(Point2<f32>, Point2<f32>)],
    t: &Similarity,
    threshold: f64,
) -> (Vec<bool>, usize) {
    let mut mask = vec![false; pairs.len()];
    let mut count = 0usize;
    for (i, (p, q)) in pairs.iter().enumerate() {
        let m = t.apply(*p);
        let dx = (m.x - q.x) as f64;
        let dy = (m.y - q.y) as f64;
        if (dx * dx + dy * dy).sqrt() < threshold {
            mask[i] = true;
            count += 1;
        }
    }
    (mask, count)
}

/// Fit a similarity transform robustly using RANSAC.
///
/// Samples 2-pair minimal subsets, hypothesises a transform via the
/// closed-form fit, scores inliers by reprojection error, and keeps the
/// hypothesis with the most inliers. The final model is re-fit to all
/// inliers and its support recounted.
pub fn fit_similarity_ransac(
    pairs: &[(Point2<f32>, Point2<f32>)],
    params: &RansacParams,
) -> Result<RansacFit, SimilarityFitError> {
    use rand::prelude::*;

    let n = pairs.len();
    if n < 2 {
        return Err(SimilarityFitError::TooFewPairs { needed: 2, got: n });
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut best_count = 0usize;
    let mut best_model: Option<Similarity> = None;
    let mut best_mask: Vec<bool> = vec![false; n];
    let mut iter_budget = params.max_iters;

    let mut iter = 0usize;
    while iter < iter_budget {
        iter += 1;

        let sample = sample_indices(&mut rng, n, 2);
        let s0 = pairs[sample[0]];
        let s1 = pairs[sample[1]];

        // Skip degenerate samples: coincident source points pin down nothing.
        let dx = (s0.0.x - s1.0.x) as f64;
        let dy = (s0.0.y - s1.0.y) as f64;
        if (dx * dx + dy * dy).sqrt() < MIN_SCALE {
            continue;
        }

        let Some(model) = fit_similarity_least_squares(&[s0, s1]) else {
            continue;
        };
        if !scale_is_sane(&model) {
            continue;
        }

        let (mask, count) = count_inliers(pairs, &model, params.inlier_threshold);
        if count > best_count {
            best_count = count;
            best_model = Some(model);
            best_mask = mask;

            // Early exit once almost everything agrees.
            if best_count * 10 > n * 9 {
                break;
            }

            // Shrink the iteration budget from the observed inlier ratio.
            let w = best_count as f64 / n as f64;
            let denom = (1.0 - w * w).max(f64::EPSILON).ln();
            let needed = ((1.0 - params.confidence).ln() / denom).ceil();
            if needed.is_finite() && needed >= 0.0 {
                iter_budget = iter_budget.min(needed as usize + 1);
            }
        }
    }

    let Some(best_model) = best_model else {
        return Err(SimilarityFitError::Degenerate);
    };
    if best_count < params.min_inliers {
        return Err(SimilarityFitError::InsufficientInliers {
            needed: params.min_inliers,
            found: best_count,
        });
    }

    // Re-fit to all inliers of the best hypothesis.
    let inlier_pairs: Vec<_> = best_mask
        .iter()
        .zip(pairs.iter())
        .filter(|(&m, _)| m)
        .map(|(_, &p)| p)
        .collect();
    let refined = fit_similarity_least_squares(&inlier_pairs).unwrap_or(best_model);
    if !scale_is_sane(&refined) {
        return Err(SimilarityFitError::Degenerate);
    }

    let (inliers, num_inliers) = count_inliers(pairs, &refined, params.inlier_threshold);
    if num_inliers < params.min_inliers {
        return Err(SimilarityFitError::InsufficientInliers {
            needed: params.min_inliers,
            found: num_inliers,
        });
    }

    Ok(RansacFit {
        transform: refined,
        inliers,
        num_inliers,
    })
}

/// Sample `k` distinct indices from `0..n` using a Fisher-Yates partial shuffle.
fn sample_indices(rng: &mut impl rand::Rng, n: usize, k: usize) -> Vec<usize> {
    debug_assert!(k <= n);
    let mut indices: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = rng.gen_range(i..n);
        indices.swap(i, j);
    }
    indices.truncate(k);
    indices
}
