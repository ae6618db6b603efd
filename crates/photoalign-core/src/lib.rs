//! Core geometry and raster primitives for photo alignment.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete feature detector, on `rayon`, or on an image codec
//! crate; it operates on plain row-major byte buffers.

mod feature;
mod image;
mod logger;
mod mask;
mod ransac;
mod similarity;
mod warp;

pub use feature::{Correspondence, Descriptor, FeatureSet, Keypoint, DESCRIPTOR_SIZE};
pub use image::{
    resize_bilinear, rgb_to_gray, sample_bilinear, sample_bilinear_rgb, sample_bilinear_u8,
    GrayImage, GrayImageView, RgbImage,
};
pub use logger::init_with_level;
pub use mask::{bounding_box, erode, intersect_masks, largest_component, CropRect, ValidityMask};
pub use ransac::{fit_similarity_ransac, RansacFit, RansacParams, SimilarityFitError};
pub use similarity::{fit_similarity_least_squares, Similarity};
pub use warp::warp_rgb;
