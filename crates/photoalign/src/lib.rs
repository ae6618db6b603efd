//! High-level facade crate for the `photoalign-*` workspace.
//!
//! This crate provides:
//! - the batch alignment pipeline ([`Aligner`]) that takes an ordered set of
//!   photos, aligns every image to the first one with a robustly estimated
//!   similarity transform, and crops all of them to their common overlap
//! - pluggable capability traits for the feature detector and descriptor
//!   matcher, with the built-in FAST + steered-BRIEF implementations from
//!   `photoalign-features` as defaults
//! - (feature-gated) `image`-crate adapters for loading and saving, and a
//!   small CLI binary
//!
//! ## Quickstart
//!
//! ```no_run
//! use photoalign::{AlignParams, Aligner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frames = vec![
//!     photoalign::io::load_rgb("shot_1.jpg")?,
//!     photoalign::io::load_rgb("shot_2.jpg")?,
//! ];
//! let result = Aligner::new(AlignParams::default()).align(&frames)?;
//! println!("common crop: {:?}", result.crop);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `photoalign::core`: geometry, masks, warping, robust fitting.
//! - `photoalign::features`: the built-in detector and matcher.
//! - `photoalign::io` (feature `image`): file loading/saving adapters.

pub use photoalign_core as core;
pub use photoalign_features as features;

mod error;
mod overlay;
mod params;
mod pipeline;
mod traits;

#[cfg(feature = "image")]
pub mod io;

pub use error::AlignError;
pub use overlay::render_keypoint_overlay;
pub use params::AlignParams;
pub use pipeline::{Aligner, Alignment};
pub use traits::{DescriptorMatcher, FeatureExtractor};

pub use photoalign_core::{CropRect, RgbImage, Similarity};
