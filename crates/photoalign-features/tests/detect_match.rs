use photoalign_core::GrayImage;
use photoalign_features::{FeatureParams, HammingMatcher, MatchParams, OrbDetector};

struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1)
    }

    fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }
}

fn textured_master(width: usize, height: usize) -> GrayImage {
    let mut img = GrayImage::new(width, height);
    img.data.fill(96);
    let mut rng = Lcg::new(0xA5A5);
    for _ in 0..120 {
        let rw = 4 + (rng.next_u32() % 12) as usize;
        let rh = 4 + (rng.next_u32() % 12) as usize;
        let x0 = rng.next_u32() as usize % (width - rw);
        let y0 = rng.next_u32() as usize % (height - rh);
        let shade = (40 + rng.next_u32() % 180) as u8;
        for y in y0..y0 + rh {
            for x in x0..x0 + rw {
                img.data[y * width + x] = shade;
            }
        }
    }
    img
}

fn gray_window(src: &GrayImage, x0: usize, y0: usize, w: usize, h: usize) -> GrayImage {
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        let src_off = (y0 + y) * src.width + x0;
        out.data[y * w..(y + 1) * w].copy_from_slice(&src.data[src_off..src_off + w]);
    }
    out
}

#[test]
fn matches_link_translated_copies() {
    let master = textured_master(260, 200);
    // Candidate window is shifted by (+8, +6) relative to the reference, so
    // matched reference positions sit (+8, +6) from their candidate twin.
    let reference_img = gray_window(&master, 20, 20, 180, 130);
    let candidate_img = gray_window(&master, 28, 26, 180, 130);

    let detector = OrbDetector::new(FeatureParams::default());
    let reference = detector.detect(&reference_img);
    let candidate = detector.detect(&candidate_img);
    assert!(reference.len() > 30, "reference features: {}", reference.len());
    assert!(candidate.len() > 30, "candidate features: {}", candidate.len());

    let matches = HammingMatcher::new(MatchParams::default()).match_sets(&reference, &candidate);
    assert!(matches.len() >= 10, "matches: {}", matches.len());

    let consistent = matches
        .iter()
        .filter(|m| {
            let r = reference.keypoints[m.reference].position;
            let c = candidate.keypoints[m.candidate].position;
            (r.x - c.x - 8.0).abs() <= 1.5 && (r.y - c.y - 6.0).abs() <= 1.5
        })
        .count();
    assert!(
        consistent * 10 >= matches.len() * 6,
        "only {consistent}/{} matches agree with the true offset",
        matches.len()
    );
}

#[test]
fn unrelated_content_matches_poorly() {
    let master = textured_master(260, 200);
    let reference_img = gray_window(&master, 20, 20, 100, 80);

    let mut rng = Lcg::new(77);
    let mut noise = GrayImage::new(100, 80);
    for px in noise.data.iter_mut() {
        *px = rng.next_u32() as u8;
    }

    let detector = OrbDetector::new(FeatureParams::default());
    let reference = detector.detect(&reference_img);
    let candidate = detector.detect(&noise);

    let matches = HammingMatcher::new(MatchParams::default()).match_sets(&reference, &candidate);
    // The ratio test prunes nearly everything between unrelated images.
    assert!(
        matches.len() * 5 < candidate.len().max(1),
        "{} matches from {} noise features",
        matches.len(),
        candidate.len()
    );
}
