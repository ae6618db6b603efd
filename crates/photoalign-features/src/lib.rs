//! Built-in feature capability for photo alignment: FAST corner detection
//! over a small image pyramid, steered 256-bit binary descriptors, and a
//! brute-force Hamming matcher with Lowe ratio filtering.
//!
//! Detection is fully deterministic for a fixed input and configuration, so
//! pipelines built on it are reproducible end to end.

mod brief;
mod detect;
mod matcher;
mod params;

pub use brief::steered_brief;
pub use detect::OrbDetector;
pub use matcher::{hamming_distance, HammingMatcher};
pub use params::{FeatureParams, MatchParams};
