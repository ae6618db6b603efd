use std::cmp::Ordering;
use std::collections::HashSet;

use nalgebra::Point2;
use photoalign_core::{resize_bilinear, Descriptor, FeatureSet, GrayImage, Keypoint};
use rayon::prelude::*;

use crate::brief::steered_brief;
use crate::params::FeatureParams;

/// Bresenham circle of radius 3 used by the FAST segment test.
const FAST_OFFSETS: [(i32, i32); 16] = [
    (0, -3), (1, -3), (2, -2), (3, -1),
    (3, 0), (3, 1), (2, 2), (1, 3),
    (0, 3), (-1, 3), (-2, 2), (-3, 1),
    (-3, 0), (-3, -1), (-2, -2), (-1, -3),
];

/// Levels smaller than this on either side are not worth detecting on.
const MIN_LEVEL_SIDE: usize = 32;

/// FAST corners + intensity-centroid orientation + steered binary
/// descriptors, over a small image pyramid.
pub struct OrbDetector {
    params: FeatureParams,
}

impl Default for OrbDetector {
    fn default() -> Self {
        Self::new(FeatureParams::default())
    }
}

impl OrbDetector {
    pub fn new(params: FeatureParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &FeatureParams {
        &self.params
    }

    /// Detect keypoints and compute their descriptors.
    ///
    /// The result is capped at `max_features`, strongest responses first,
    /// and is deterministic for a fixed input and configuration.
    pub fn detect(&self, image: &GrayImage) -> FeatureSet {
        let mut features: Vec<(Keypoint, Descriptor)> = Vec::new();

        for (octave, (level, scale)) in self.build_pyramid(image).iter().enumerate() {
            let corners = detect_fast_corners(level, self.params.fast_threshold);
            let kept = suppress_non_maxima(corners, self.params.nms_radius);

            let view = level.as_view();
            let radius = self.params.orientation_radius;
            let level_features: Vec<(Keypoint, Descriptor)> = kept
                .par_iter()
                .map(|kp| {
                    let angle = intensity_centroid_angle(level, kp.position, radius);
                    let desc = steered_brief(&view, kp.position.x, kp.position.y, angle);
                    let kp = Keypoint {
                        position: Point2::new(kp.position.x * scale, kp.position.y * scale),
                        angle,
                        response: kp.response,
                        octave: octave as u8,
                        scale: *scale,
                    };
                    (kp, desc)
                })
                .collect();
            features.extend(level_features);
        }

        log::debug!(
            "{} candidate features before the cap of {}",
            features.len(),
            self.params.max_features
        );

        // Response-ranked cap across all levels.
        features.sort_by(|a, b| {
            b.0.response
                .partial_cmp(&a.0.response)
                .unwrap_or(Ordering::Equal)
        });
        features.truncate(self.params.max_features);

        let mut set = FeatureSet::default();
        for (kp, desc) in features {
            set.keypoints.push(kp);
            set.descriptors.push(desc);
        }
        set
    }

    fn build_pyramid(&self, image: &GrayImage) -> Vec<(GrayImage, f32)> {
        let mut levels = vec![(image.clone(), 1.0f32)];
        for _ in 1..self.params.n_levels.max(1) {
            let Some((prev, prev_scale)) = levels.last() else {
                break;
            };
            let w = (prev.width as f32 / self.params.scale_factor) as usize;
            let h = (prev.height as f32 / self.params.scale_factor) as usize;
            if w < MIN_LEVEL_SIDE || h < MIN_LEVEL_SIDE {
                break;
            }
            let scale = prev_scale * self.params.scale_factor;
            let scaled = resize_bilinear(&prev.as_view(), w, h);
            levels.push((scaled, scale));
        }
        levels
    }
}

/// FAST-9: a pixel is a corner when at least 9 contiguous circle pixels are
/// all brighter or all darker than the centre by the threshold.
fn detect_fast_corners(img: &GrayImage, threshold: u8) -> Vec<Keypoint> {
    let (w, h) = (img.width, img.height);
    if w < 8 || h < 8 {
        return Vec::new();
    }

    let rows: Vec<Vec<Keypoint>> = (3..h - 3)
        .into_par_iter()
        .map(|y| {
            let mut row = Vec::new();
            for x in 3..w - 3 {
                let center = img.data[y * w + x];
                if !cardinal_precheck(img, x, y, center, threshold) {
                    continue;
                }
                if !segment_test(img, x, y, center, threshold) {
                    continue;
                }
                row.push(Keypoint {
                    position: Point2::new(x as f32, y as f32),
                    angle: 0.0,
                    response: patch_contrast(img, x, y),
                    octave: 0,
                    scale: 1.0,
                });
            }
            row
        })
        .collect();

    rows.into_iter().flatten().collect()
}

/// Cheap rejection: any 9-contiguous arc of the circle covers at least two
/// of the four cardinal pixels, so fewer than two on the same side of the
/// threshold means the full test cannot pass.
#[inline]
fn cardinal_precheck(img: &GrayImage, x: usize, y: usize, center: u8, threshold: u8) -> bool {
    let w = img.width;
    let bright = center.saturating_add(threshold);
    let dark = center.saturating_sub(threshold);
    let px = [
        img.data[(y - 3) * w + x],
        img.data[y * w + (x + 3)],
        img.data[(y + 3) * w + x],
        img.data[y * w + (x - 3)],
    ];
    let brighter = px.iter().filter(|&&p| p > bright).count();
    let darker = px.iter().filter(|&&p| p < dark).count();
    brighter >= 2 || darker >= 2
}

#[inline]
fn segment_test(img: &GrayImage, x: usize, y: usize, center: u8, threshold: u8) -> bool {
    let w = img.width;
    let bright = center.saturating_add(threshold);
    let dark = center.saturating_sub(threshold);

    let mut run_bright = 0u32;
    let mut run_dark = 0u32;
    let mut best_bright = 0u32;
    let mut best_dark = 0u32;

    // Walk the circle twice to handle runs that wrap around.
    for i in 0..FAST_OFFSETS.len() * 2 {
        let (dx, dy) = FAST_OFFSETS[i % FAST_OFFSETS.len()];
        let p = img.data[(y as i32 + dy) as usize * w + (x as i32 + dx) as usize];
        if p > bright {
            run_bright += 1;
            run_dark = 0;
            best_bright = best_bright.max(run_bright);
        } else if p < dark {
            run_dark += 1;
            run_bright = 0;
            best_dark = best_dark.max(run_dark);
        } else {
            run_bright = 0;
            run_dark = 0;
        }
    }
    best_bright >= 9 || best_dark >= 9
}

/// Local 5x5 intensity standard deviation, used as the corner response.
fn patch_contrast(img: &GrayImage, x: usize, y: usize) -> f32 {
    let (w, h) = (img.width, img.height);
    let mut sum = 0.0f32;
    let mut sum_sq = 0.0f32;
    let mut count = 0u32;
    for dy in -2i32..=2 {
        for dx in -2i32..=2 {
            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                continue;
            }
            let v = img.data[ny as usize * w + nx as usize] as f32;
            sum += v;
            sum_sq += v * v;
            count += 1;
        }
    }
    let mean = sum / count as f32;
    (sum_sq / count as f32 - mean * mean).max(0.0).sqrt()
}

/// Grid-based non-maximum suppression: strongest corners claim their cell
/// and its 8 neighbours.
fn suppress_non_maxima(mut corners: Vec<Keypoint>, radius: f32) -> Vec<Keypoint> {
    if corners.is_empty() {
        return corners;
    }
    corners.sort_by(|a, b| {
        b.response
            .partial_cmp(&a.response)
            .unwrap_or(Ordering::Equal)
    });

    let mut claimed: HashSet<(i32, i32)> = HashSet::new();
    let mut kept = Vec::new();
    for kp in corners {
        let gx = (kp.position.x / radius) as i32;
        let gy = (kp.position.y / radius) as i32;
        let free = (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| (gx + dx, gy + dy)))
            .all(|cell| !claimed.contains(&cell));
        if free {
            claimed.insert((gx, gy));
            kept.push(kp);
        }
    }
    kept
}

/// Intensity-centroid orientation over a circular patch.
fn intensity_centroid_angle(img: &GrayImage, pos: Point2<f32>, radius: i32) -> f32 {
    let (w, h) = (img.width as i32, img.height as i32);
    let cx = pos.x.round() as i32;
    let cy = pos.y.round() as i32;
    let mut m01 = 0.0f32;
    let mut m10 = 0.0f32;

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let x = cx + dx;
            let y = cy + dy;
            if x < 0 || y < 0 || x >= w || y >= h {
                continue;
            }
            let v = img.data[y as usize * w as usize + x as usize] as f32;
            m10 += v * dx as f32;
            m01 += v * dy as f32;
        }
    }
    m01.atan2(m10)
}
