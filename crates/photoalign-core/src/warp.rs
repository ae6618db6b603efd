use nalgebra::Point2;

use crate::image::{sample_bilinear_rgb, RgbImage};
use crate::mask::ValidityMask;
use crate::similarity::Similarity;

/// Resample `src` into an `out_w x out_h` canvas under `transform`, which
/// maps source coordinates into canvas coordinates.
///
/// Inverse mapping: each output pixel centre is pulled back through the
/// inverse transform and bilinearly sampled. The validity mask marks output
/// pixels whose source coordinate lies inside the fully interpolatable region
/// `[0, w-1] x [0, h-1]`; everything else is black filler.
///
/// Returns `None` when the transform is not invertible. The source image is
/// untouched.
pub fn warp_rgb(
    src: &RgbImage,
    transform: &Similarity,
    out_w: usize,
    out_h: usize,
) -> Option<(RgbImage, ValidityMask)> {
    let inv = transform.inverse()?;

    let mut out = RgbImage::new(out_w, out_h);
    let mut mask = ValidityMask::new(out_w, out_h);
    let max_x = src.width as f32 - 1.0;
    let max_y = src.height as f32 - 1.0;

    for y in 0..out_h {
        for x in 0..out_w {
            let s = inv.apply(Point2::new(x as f32, y as f32));
            if s.x >= 0.0 && s.y >= 0.0 && s.x <= max_x && s.y <= max_y {
                out.put_pixel(x, y, sample_bilinear_rgb(src, s.x, s.y));
                mask.set(x, y, true);
            }
        }
    }
    Some((out, mask))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(w: usize, h: usize) -> RgbImage {
        let mut img = RgbImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.put_pixel(x, y, [(x * 7 % 256) as u8, (y * 11 % 256) as u8, 128]);
            }
        }
        img
    }

    #[test]
    fn identity_warp_reproduces_the_source() {
        let src = gradient_image(12, 9);
        let (out, mask) = warp_rgb(&src, &Similarity::identity(), 12, 9).expect("warp");
        assert_eq!(out, src);
        assert_eq!(mask.valid_count(), 12 * 9);
    }

    #[test]
    fn integer_translation_shifts_pixels_and_mask() {
        let src = gradient_image(16, 12);
        // Source (x, y) lands on canvas (x+3, y+2).
        let t = Similarity::new(1.0, 0.0, 3.0, 2.0);
        let (out, mask) = warp_rgb(&src, &t, 16, 12).expect("warp");

        assert_eq!(out.pixel(3, 2), src.pixel(0, 0));
        assert_eq!(out.pixel(10, 7), src.pixel(7, 5));
        // The band uncovered by the shift is filler.
        assert!(!mask.get(2, 5));
        assert!(!mask.get(8, 1));
        assert!(mask.get(3, 2));
        assert_eq!(out.pixel(0, 0), [0, 0, 0]);
        assert_eq!(mask.valid_count(), (16 - 3) * (12 - 2));
    }

    #[test]
    fn canvas_larger_than_source_marks_outside_invalid() {
        let src = gradient_image(5, 5);
        let (_, mask) = warp_rgb(&src, &Similarity::identity(), 8, 8).expect("warp");
        assert_eq!(mask.valid_count(), 5 * 5);
        assert!(!mask.get(5, 0));
        assert!(!mask.get(0, 5));
    }

    #[test]
    fn collapsed_transform_is_rejected() {
        let src = gradient_image(4, 4);
        assert!(warp_rgb(&src, &Similarity::new(0.0, 0.0, 1.0, 1.0), 4, 4).is_none());
    }
}
