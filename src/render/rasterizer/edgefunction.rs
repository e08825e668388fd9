//! Edge function-based triangle rasterization.
//!
//! For an edge from point A to point B, the edge function at point P is:
//!
//! ```text
//! E(P) = (B.x - A.x) * (P.y - A.y) - (B.y - A.y) * (P.x - A.x)
//! ```
//!
//! Its sign tells on which side of the edge P lies and zero means P is on the
//! edge. After normalizing the winding so that interior points are positive,
//! a pixel is covered when all three edge functions are positive, or zero on
//! an edge that is a left edge or a horizontal top edge.
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)

use super::Rasterizer;
use crate::math::vec2::Vec2;
use crate::render::mask::MaskBuffer;
use crate::triangle::Triangle;

/// Triangle rasterizer using the edge function algorithm.
///
/// Iterates over all pixels in the triangle's bounding box. Wasteful for thin
/// diagonal triangles, but each pixel test is independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeFunctionRasterizer;

/// One oriented edge of a triangle.
struct Edge {
    a: Vec2,
    b: Vec2,
    /// -1.0 when `a`/`b` were swapped into canonical order.
    sign: f64,
    /// Whether points exactly on the edge are covered.
    inclusive: bool,
}

impl Edge {
    /// Builds the edge `from -> to` of a triangle whose interior lies on the
    /// positive side.
    fn new(from: Vec2, to: Vec2) -> Self {
        // Interior normal of the edge is (-(to.y - from.y), to.x - from.x).
        let nx = -(to.y - from.y);
        let ny = to.x - from.x;
        let inclusive = nx > 0.0 || (nx == 0.0 && ny > 0.0);

        // Evaluate with canonically ordered endpoints so a shared edge gives
        // the same magnitude in both triangles.
        let (a, b, sign) = if (from.y, from.x) <= (to.y, to.x) {
            (from, to, 1.0)
        } else {
            (to, from, -1.0)
        };

        Self {
            a,
            b,
            sign,
            inclusive,
        }
    }

    #[inline]
    fn covers(&self, p: Vec2) -> bool {
        let w = self.sign * EdgeFunctionRasterizer::edge_function(self.a, self.b, p);
        w > 0.0 || (w == 0.0 && self.inclusive)
    }
}

impl EdgeFunctionRasterizer {
    pub fn new() -> Self {
        EdgeFunctionRasterizer {}
    }

    /// Computes the edge function value for point P relative to edge (A -> B).
    ///
    /// This is the 2D cross product (B - A) x (P - A).
    #[inline]
    fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f64 {
        (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
    }
}

impl Rasterizer for EdgeFunctionRasterizer {
    fn fill_triangle(&self, triangle: &Triangle, buffer: &mut MaskBuffer) {
        let [mut v0, v1, mut v2] = triangle.points;

        let area = Self::edge_function(v0, v1, v2);
        if area == 0.0 {
            return; // Degenerate triangle
        }
        if area < 0.0 {
            std::mem::swap(&mut v0, &mut v2);
        }

        let edges = [Edge::new(v0, v1), Edge::new(v1, v2), Edge::new(v2, v0)];

        // Bounding box, clipped to the buffer
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i64).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i64).min(buffer.width() as i64 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i64).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i64).min(buffer.height() as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec2::new(x as f64, y as f64);
                if edges.iter().all(|edge| edge.covers(p)) {
                    buffer.set_pixel(x, y);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mask::Mask;

    #[test]
    fn test_edge_function_sign() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(EdgeFunctionRasterizer::edge_function(a, b, Vec2::new(5.0, 5.0)) > 0.0);
        assert!(EdgeFunctionRasterizer::edge_function(a, b, Vec2::new(5.0, -5.0)) < 0.0);
        assert_eq!(
            EdgeFunctionRasterizer::edge_function(a, b, Vec2::new(5.0, 0.0)),
            0.0
        );
    }

    #[test]
    fn test_winding_independent() {
        let cw = Triangle::new([
            Vec2::new(1.0, 1.0),
            Vec2::new(14.0, 3.0),
            Vec2::new(6.0, 12.0),
        ]);
        let ccw = Triangle::new([cw.points[0], cw.points[2], cw.points[1]]);

        let mut a = Mask::new(16, 16);
        let mut b = Mask::new(16, 16);
        let rasterizer = EdgeFunctionRasterizer::new();
        rasterizer.fill_triangle(&cw, &mut a.as_buffer());
        rasterizer.fill_triangle(&ccw, &mut b.as_buffer());
        assert_eq!(a, b);
        assert!(a.count() > 0);
    }
}
