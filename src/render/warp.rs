//! Triangle-confined affine warping.
//!
//! Moves the content of one target triangle into the shape of its source
//! triangle. Only pixels covered by the destination mask are written.

use image::{Rgb, Rgb32FImage};

use crate::math::affine::Affine2;
use crate::math::vec2::Vec2;
use crate::render::mask::Mask;

/// How sample coordinates outside the image are mapped back inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Out-of-image samples read as zero.
    ///
    /// Example: ...d c b a | 0 0 0 0...
    Constant,

    /// Repeats the outermost row or column.
    ///
    /// Example: ...d c b a | a a a a...
    Replicate,

    /// Mirrors at the boundary, excluding the edge pixel itself.
    ///
    /// Example: ...d c b a | b c d e...
    #[default]
    Reflect101,
}

impl BorderMode {
    #[inline]
    fn reflect101(i: i64, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as i64;
        let mut i = i;
        while i < 0 || i >= len {
            if i < 0 {
                i = -i;
            } else {
                i = 2 * len - i - 2;
            }
        }
        i as usize
    }

    /// Maps index `i` into `[0, len)`, or `None` for [`BorderMode::Constant`]
    /// when `i` is outside.
    #[inline]
    pub fn map_index(&self, i: i64, len: usize) -> Option<usize> {
        if (0..len as i64).contains(&i) {
            return Some(i as usize);
        }
        match self {
            BorderMode::Constant => None,
            BorderMode::Replicate => Some(i.clamp(0, len as i64 - 1) as usize),
            BorderMode::Reflect101 => Some(Self::reflect101(i, len)),
        }
    }
}

/// The target triangle's content, i.e. the target image seen through its mask.
pub struct MaskedImage<'a> {
    pub image: &'a Rgb32FImage,
    pub mask: &'a Mask,
}

impl MaskedImage<'_> {
    /// Bilinear sample at `p` using only taps that lie inside the mask,
    /// renormalized by their total weight.
    ///
    /// Returns `None` if no tap with nonzero weight is inside the mask.
    fn sample_bilinear(&self, p: Vec2, border: BorderMode) -> Option<[f32; 3]> {
        let (width, height) = self.image.dimensions();
        let x0 = p.x.floor();
        let y0 = p.y.floor();
        let fx = p.x - x0;
        let fy = p.y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let taps = [
            (x0, y0, (1.0 - fx) * (1.0 - fy)),
            (x0 + 1, y0, fx * (1.0 - fy)),
            (x0, y0 + 1, (1.0 - fx) * fy),
            (x0 + 1, y0 + 1, fx * fy),
        ];

        let mut acc = [0.0f64; 3];
        let mut total = 0.0f64;
        for (tx, ty, weight) in taps {
            if weight <= 0.0 {
                continue;
            }
            let (Some(x), Some(y)) = (
                border.map_index(tx, width as usize),
                border.map_index(ty, height as usize),
            ) else {
                continue;
            };
            if !self.mask.contains(x as i64, y as i64) {
                continue;
            }
            let Rgb(px) = self.image.get_pixel(x as u32, y as u32);
            for (a, v) in acc.iter_mut().zip(px) {
                *a += weight * *v as f64;
            }
            total += weight;
        }

        if total <= 0.0 {
            return None;
        }
        Some(acc.map(|a| (a / total) as f32))
    }

    /// Nearest pixel of the unmasked image, border-mapped.
    fn sample_nearest(&self, p: Vec2, border: BorderMode) -> [f32; 3] {
        let (width, height) = self.image.dimensions();
        match (
            border.map_index(p.x.round() as i64, width as usize),
            border.map_index(p.y.round() as i64, height as usize),
        ) {
            (Some(x), Some(y)) => self.image.get_pixel(x as u32, y as u32).0,
            _ => [0.0; 3],
        }
    }
}

/// Warps `content` into the pixels of `dest_mask`.
///
/// `dest_to_content` maps destination pixel coordinates into the content's
/// frame (the inverse of the content-to-destination transform). For each
/// covered destination pixel `blend(pixel, warped)` is stored, where `warped`
/// is a bilinear sample of the masked content. Where the sample footprint falls
/// entirely outside the content mask, the nearest content-image pixel is used
/// instead, so triangle borders never darken.
pub fn warp_triangle<F>(
    content: &MaskedImage,
    dest_mask: &Mask,
    dest_to_content: &Affine2,
    border: BorderMode,
    dest: &mut Rgb32FImage,
    mut blend: F,
) where
    F: FnMut(&mut Rgb<f32>, [f32; 3]),
{
    for (x, y) in dest_mask.covered() {
        let p = dest_to_content.transform_point(Vec2::new(x as f64, y as f64));
        let warped = content
            .sample_bilinear(p, border)
            .unwrap_or_else(|| content.sample_nearest(p, border));
        blend(dest.get_pixel_mut(x, y), warped);
    }
}
