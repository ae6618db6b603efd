use photoalign_core::{Keypoint, RgbImage};

const OVERLAY_COLOR: [u8; 3] = [255, 0, 0];

/// Patch radius drawn for a level-0 keypoint; scaled by the keypoint's
/// pyramid scale like rich-keypoint renderings do.
const BASE_RADIUS: f32 = 8.0;

#[inline]
fn plot(img: &mut RgbImage, x: i32, y: i32) {
    if x >= 0 && y >= 0 && (x as usize) < img.width && (y as usize) < img.height {
        img.put_pixel(x as usize, y as usize, OVERLAY_COLOR);
    }
}

/// Render the diagnostic keypoint overlay: a copy of `image` with a circle
/// and an orientation ray for every keypoint.
pub fn render_keypoint_overlay(image: &RgbImage, keypoints: &[Keypoint]) -> RgbImage {
    let mut out = image.clone();
    for kp in keypoints {
        let radius = BASE_RADIUS * kp.scale;
        draw_circle(&mut out, kp.position.x, kp.position.y, radius);
        draw_ray(&mut out, kp.position.x, kp.position.y, kp.angle, radius);
    }
    out
}

fn draw_circle(img: &mut RgbImage, cx: f32, cy: f32, radius: f32) {
    // Enough samples that adjacent plotted pixels touch.
    let steps = (radius * std::f32::consts::TAU).ceil().max(8.0) as usize;
    for i in 0..steps {
        let t = i as f32 / steps as f32 * std::f32::consts::TAU;
        let x = (cx + radius * t.cos()).round() as i32;
        let y = (cy + radius * t.sin()).round() as i32;
        plot(img, x, y);
    }
}

fn draw_ray(img: &mut RgbImage, cx: f32, cy: f32, angle: f32, length: f32) {
    let (s, c) = angle.sin_cos();
    let steps = length.ceil().max(1.0) as usize;
    for i in 0..=steps {
        let r = i as f32 / steps as f32 * length;
        plot(img, (cx + r * c).round() as i32, (cy + r * s).round() as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn overlay_marks_the_keypoint_circle() {
        let image = RgbImage::new(40, 40);
        let kp = Keypoint {
            position: Point2::new(20.0, 20.0),
            angle: 0.0,
            response: 1.0,
            octave: 0,
            scale: 1.0,
        };
        let out = render_keypoint_overlay(&image, &[kp]);
        // A point on the circle and one on the orientation ray are painted.
        assert_eq!(out.pixel(28, 20), OVERLAY_COLOR);
        assert_eq!(out.pixel(24, 20), OVERLAY_COLOR);
        // The centre's far surroundings are untouched.
        assert_eq!(out.pixel(2, 2), [0, 0, 0]);
    }

    #[test]
    fn keypoints_near_the_border_are_clipped_safely() {
        let image = RgbImage::new(16, 16);
        let kp = Keypoint {
            position: Point2::new(0.0, 0.0),
            angle: 2.5,
            response: 1.0,
            octave: 1,
            scale: 1.2,
        };
        let out = render_keypoint_overlay(&image, &[kp]);
        assert_eq!(out.width, 16);
        assert_eq!(out.height, 16);
    }

    #[test]
    fn source_image_is_untouched() {
        let image = RgbImage::new(24, 24);
        let before = image.clone();
        let _ = render_keypoint_overlay(&image, &[]);
        assert_eq!(image, before);
    }
}
