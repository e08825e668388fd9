//! Scanline-based triangle rasterization.
//!
//! Processes a triangle one horizontal row at a time:
//!
//! 1. **Sort vertices** by Y coordinate (top to bottom in image space)
//! 2. **Split** at the middle vertex into an upper and a lower half
//! 3. **Fill** each row of each half between its left and right edge crossings
//!
//! ```text
//!        v0                   v0
//!        /\                   /\
//!       /  \                 /  \
//!      /    \       =>      /----\<- split at v1.y
//!     /      \             v1   split
//!    /________\             \    /
//!   v1        v2             \  /
//!                             \/
//!                             v2
//! ```
//!
//! Rows are half-open in Y (`ceil(y_top) .. ceil(y_bottom)`) and spans are
//! half-open in X (`ceil(x_left) .. ceil(x_right)`), which is the top-left rule
//! described in the parent module.

use super::Rasterizer;
use crate::math::vec2::Vec2;
use crate::render::mask::MaskBuffer;
use crate::triangle::Triangle;

/// Scanline-based triangle rasterizer.
///
/// Vertex order of the input triangle does not matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanlineRasterizer;

impl ScanlineRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Sorts three vertices by Y coordinate (ascending: top to bottom).
    ///
    /// After sorting: `v0.y <= v1.y <= v2.y`
    fn sort_vertices(v0: &mut Vec2, v1: &mut Vec2, v2: &mut Vec2) {
        if v1.y < v0.y {
            std::mem::swap(v0, v1);
        }
        if v2.y < v1.y {
            std::mem::swap(v1, v2);
        }
        if v1.y < v0.y {
            std::mem::swap(v0, v1);
        }
    }

    /// X coordinate where edge `(a, b)` crosses row `y`.
    ///
    /// Endpoints are put in a canonical order first so that two triangles
    /// sharing this edge compute bit-identical crossings.
    #[inline]
    fn edge_x(a: Vec2, b: Vec2, y: f64) -> f64 {
        let (p, q) = if (a.y, a.x) <= (b.y, b.x) { (a, b) } else { (b, a) };
        p.x + (q.x - p.x) * (y - p.y) / (q.y - p.y)
    }

    /// Fills rows `ceil(y_top) .. ceil(y_bottom)` between the `long` edge and
    /// the `short` edge.
    fn fill_half(
        long: (Vec2, Vec2),
        short: (Vec2, Vec2),
        y_top: f64,
        y_bottom: f64,
        buffer: &mut MaskBuffer,
    ) {
        if y_bottom - y_top <= 0.0 {
            return;
        }

        let y_start = (y_top.ceil() as i64).max(0);
        let y_end = (y_bottom.ceil() as i64).min(buffer.height() as i64);

        for y in y_start..y_end {
            let yf = y as f64;
            let x1 = Self::edge_x(long.0, long.1, yf);
            let x2 = Self::edge_x(short.0, short.1, yf);

            let x_left = x1.min(x2).ceil() as i64;
            let x_right = x1.max(x2).ceil() as i64;

            buffer.fill_scanline(y, x_left, x_right);
        }
    }
}

impl Rasterizer for ScanlineRasterizer {
    fn fill_triangle(&self, triangle: &Triangle, buffer: &mut MaskBuffer) {
        let [mut v0, mut v1, mut v2] = triangle.points;
        Self::sort_vertices(&mut v0, &mut v1, &mut v2);

        // Zero height: nothing to fill
        if v2.y - v0.y <= 0.0 {
            return;
        }

        // Upper half: long edge v0->v2 against v0->v1
        Self::fill_half((v0, v2), (v0, v1), v0.y, v1.y, buffer);
        // Lower half: long edge v0->v2 against v1->v2
        Self::fill_half((v0, v2), (v1, v2), v1.y, v2.y, buffer);
    }
}
