use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

#[cfg(test)]
#[path = "color_removal_test.rs"]
mod color_removal_test;

/// Color-keying parameters.
///
/// A pixel qualifies when each of its R, G, B channels is at least the
/// matching `threshold` channel, or, with `overflow` set, when it lies
/// outside the item's bounding box. Qualifying pixels get every `Some`
/// channel of `replace` written; `None` channels are left alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskParams {
    pub threshold: [u8; 3],
    pub replace: [Option<u8>; 4],
    #[serde(default)]
    pub overflow: bool,
}

impl MaskParams {
    /// Pure white becomes fully transparent; color channels are kept.
    pub fn white_to_transparent() -> Self {
        Self {
            threshold: [255, 255, 255],
            replace: [None, None, None, Some(0)],
            overflow: false,
        }
    }
}

impl Default for MaskParams {
    fn default() -> Self {
        Self::white_to_transparent()
    }
}

/// Rewrite qualifying pixels of `pixels` in place and return how many were
/// rewritten.
///
/// `bounds` is the item's bounding box in surface pixels and only matters
/// with `overflow`. Pixels within `edge_guard` of the box's right and bottom
/// edges count as outside, which swallows the antialiased seam there.
///
/// Every pixel is visited exactly once: rows are split across the rayon
/// pool and each row is scanned left to right.
pub fn mask_pixels(pixels: &mut RgbaImage, params: &MaskParams, bounds: Rect, edge_guard: u32) -> usize {
    let w = pixels.width() as usize;
    if w == 0 || pixels.height() == 0 {
        return 0;
    }

    let guard = edge_guard as f64;
    let keep_x0 = bounds.x;
    let keep_y0 = bounds.y;
    let keep_x1 = bounds.right() - guard;
    let keep_y1 = bounds.bottom() - guard;
    let [tr, tg, tb] = params.threshold;
    let replace = params.replace;
    let overflow = params.overflow;

    let raw: &mut [u8] = pixels.as_mut();
    raw.par_chunks_mut(w * 4)
        .enumerate()
        .map(|(y, row)| {
            let fy = y as f64;
            let row_outside = fy < keep_y0 || fy >= keep_y1;
            let mut hits = 0usize;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let fx = x as f64;
                let outside = overflow && (row_outside || fx < keep_x0 || fx >= keep_x1);
                let matches = px[0] >= tr && px[1] >= tg && px[2] >= tb;
                if !(outside || matches) {
                    continue;
                }
                for (channel, value) in replace.iter().enumerate() {
                    if let Some(v) = value {
                        px[channel] = *v;
                    }
                }
                hits += 1;
            }
            hits
        })
        .sum()
}
