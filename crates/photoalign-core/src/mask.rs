//! Binary validity masks and the overlap algebra built on them.
//!
//! A mask marks which pixels of a warped image came from real source data
//! (`true`) as opposed to border filler introduced by the warp (`false`).

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidityMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<bool>, // row-major, len = w*h
}

impl ValidityMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    pub fn full(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![true; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: bool) {
        self.data[y * self.width + x] = v;
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }
}

/// Axis-aligned integer crop window in the reference frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CropRect {
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Pixel-wise AND over equally sized masks.
///
/// Returns `None` for an empty collection or mismatched dimensions.
pub fn intersect_masks(masks: &[ValidityMask]) -> Option<ValidityMask> {
    let first = masks.first()?;
    let mut common = first.clone();
    for m in &masks[1..] {
        if m.width != common.width || m.height != common.height {
            return None;
        }
        for (c, &v) in common.data.iter_mut().zip(m.data.iter()) {
            *c = *c && v;
        }
    }
    Some(common)
}

/// Iterative morphological erosion.
///
/// One round removes every valid pixel with an invalid 8-neighbour; the round
/// is repeated `radius` times. Neighbours outside the image do not erode the
/// border, so a fully valid mask is a fixed point regardless of `radius`.
pub fn erode(mask: &ValidityMask, radius: usize) -> ValidityMask {
    let mut current = mask.clone();
    let (w, h) = (mask.width, mask.height);

    for _ in 0..radius {
        let mut next = current.clone();
        let mut changed = false;
        for y in 0..h {
            for x in 0..w {
                if !current.get(x, y) {
                    continue;
                }
                let mut survives = true;
                'scan: for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                            continue;
                        }
                        if !current.get(nx as usize, ny as usize) {
                            survives = false;
                            break 'scan;
                        }
                    }
                }
                if !survives {
                    next.set(x, y, false);
                    changed = true;
                }
            }
        }
        current = next;
        if !changed {
            break;
        }
    }
    current
}

/// Keep only the largest 8-connected valid component, dropping speck
/// artefacts before the bounding box is taken.
pub fn largest_component(mask: &ValidityMask) -> ValidityMask {
    let (w, h) = (mask.width, mask.height);
    let mut labels = vec![0u32; w * h]; // 0 = unlabelled / invalid
    let mut next_label = 0u32;
    let mut best_label = 0u32;
    let mut best_count = 0usize;
    let mut stack = Vec::new();

    for start in 0..w * h {
        if !mask.data[start] || labels[start] != 0 {
            continue;
        }
        next_label += 1;
        let mut count = 0usize;
        stack.push(start);
        labels[start] = next_label;
        while let Some(idx) = stack.pop() {
            count += 1;
            let x = (idx % w) as i64;
            let y = (idx / w) as i64;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                        continue;
                    }
                    let nidx = ny as usize * w + nx as usize;
                    if mask.data[nidx] && labels[nidx] == 0 {
                        labels[nidx] = next_label;
                        stack.push(nidx);
                    }
                }
            }
        }
        if count > best_count {
            best_count = count;
            best_label = next_label;
        }
    }

    let mut out = ValidityMask::new(w, h);
    if best_label != 0 {
        for (o, &l) in out.data.iter_mut().zip(labels.iter()) {
            *o = l == best_label;
        }
    }
    out
}

/// Tightest axis-aligned box containing every valid pixel, `None` when the
/// mask is empty.
pub fn bounding_box(mask: &ValidityMask) -> Option<CropRect> {
    let mut min_x = usize::MAX;
    let mut min_y = usize::MAX;
    let mut max_x = 0usize;
    let mut max_y = 0usize;
    let mut any = false;

    for y in 0..mask.height {
        for x in 0..mask.width {
            if mask.get(x, y) {
                any = true;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
            }
        }
    }

    any.then(|| CropRect {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}
