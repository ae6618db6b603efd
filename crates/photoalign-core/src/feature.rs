use nalgebra::Point2;

/// Number of bytes in a binary descriptor (256 bits).
pub const DESCRIPTOR_SIZE: usize = 32;

/// Fixed-length binary feature vector compared by Hamming distance.
pub type Descriptor = [u8; DESCRIPTOR_SIZE];

/// A detected interest point with sub-pixel position in level-0 coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Keypoint {
    pub position: Point2<f32>,
    /// Dominant orientation in radians.
    pub angle: f32,
    /// Detector response; higher is more distinctive.
    pub response: f32,
    /// Pyramid level the point was detected on.
    pub octave: u8,
    /// Level-0 pixels per detection-level pixel.
    pub scale: f32,
}

/// Keypoints and their descriptors for one image, in detection order.
///
/// The two vectors are parallel; index `i` of each refers to the same
/// feature. Order carries no meaning beyond indexing.
#[derive(Clone, Debug, Default)]
pub struct FeatureSet {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Vec<Descriptor>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

/// A hypothesised match between a reference feature and a candidate feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Correspondence {
    /// Index into the reference image's feature set.
    pub reference: usize,
    /// Index into the candidate image's feature set.
    pub candidate: usize,
    /// Descriptor distance of the accepted match.
    pub distance: u32,
}
