use photoalign_core::SimilarityFitError;

/// Errors returned by the alignment pipeline.
///
/// Every per-image variant names the offending input by position so the
/// failure is actionable (retake that photo, lower `erode`, ...).
#[derive(thiserror::Error, Debug)]
pub enum AlignError {
    #[error("no input images")]
    NoImages,

    #[error("image {index}: feature detection found only {found} keypoints (need {needed})")]
    DetectionFailure {
        index: usize,
        found: usize,
        needed: usize,
    },

    #[error(
        "image {index}: only {found} usable correspondences to the reference (need {needed})"
    )]
    InsufficientCorrespondences {
        index: usize,
        found: usize,
        needed: usize,
    },

    #[error("image {index}: robust similarity estimation failed")]
    DegenerateTransform {
        index: usize,
        #[source]
        source: SimilarityFitError,
    },

    #[error("no common overlap left after erosion (erode={erode})")]
    EmptyOverlap { erode: usize },
}
