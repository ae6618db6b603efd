#![allow(dead_code)]

use photoalign_core::RgbImage;

/// Deterministic 64-bit LCG, good enough for reproducible fixtures.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }
}

/// A textured master pattern: a mid-grey background covered with random
/// solid rectangles, giving plenty of corners for feature detection.
pub fn master_pattern(width: usize, height: usize) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    img.data.fill(96);

    let mut rng = Lcg::new(0x2438_6A88);
    for _ in 0..160 {
        let rw = 4 + (rng.next_u32() % 14) as usize;
        let rh = 4 + (rng.next_u32() % 14) as usize;
        let x0 = rng.next_u32() as usize % (width - rw);
        let y0 = rng.next_u32() as usize % (height - rh);
        let color = [
            (40 + rng.next_u32() % 180) as u8,
            (40 + rng.next_u32() % 180) as u8,
            (40 + rng.next_u32() % 180) as u8,
        ];
        for y in y0..y0 + rh {
            for x in x0..x0 + rw {
                img.put_pixel(x, y, color);
            }
        }
    }
    img
}

/// Per-pixel random noise; two different seeds share no visual content.
pub fn noise_image(width: usize, height: usize, seed: u64) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    let mut rng = Lcg::new(seed);
    for px in img.data.iter_mut() {
        *px = rng.next_u32() as u8;
    }
    img
}

/// Cut a window out of the master pattern; windows at different offsets are
/// exact translations of shared content.
pub fn window(master: &RgbImage, x: usize, y: usize, width: usize, height: usize) -> RgbImage {
    master.crop(x, y, width, height)
}
