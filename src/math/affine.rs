//! 2x3 affine transformation matrix.
//!
//! # Convention
//! - Points are **column vectors** on the right: `Affine2 * p`
//! - Translation is stored in the **last column**
//! - Transforms chain **right-to-left**: `A * B * p` applies B first, then A
//!
//! The implicit third row is always `[0, 0, 1]`.

use std::ops::Mul;

use super::vec2::Vec2;

/// Determinants below this magnitude are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// 2x3 matrix stored as `data[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    data: [[f64; 3]; 2],
}

impl Affine2 {
    pub fn new(data: [[f64; 3]; 2]) -> Self {
        Affine2 { data }
    }

    pub fn identity() -> Self {
        Affine2::new([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
    }

    pub fn translation(x: f64, y: f64) -> Self {
        Affine2::new([[1.0, 0.0, x], [0.0, 1.0, y]])
    }

    /// Returns the unique affine map sending `from[i]` onto `to[i]` for all three
    /// vertices, or `None` when `from` is degenerate (collinear).
    pub fn from_triangles(from: [Vec2; 3], to: [Vec2; 3]) -> Option<Affine2> {
        let d1 = from[1] - from[0];
        let d2 = from[2] - from[0];
        let e1 = to[1] - to[0];
        let e2 = to[2] - to[0];

        let det = d1.cross(d2);
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        // Linear part: [e1 e2] * [d1 d2]^-1
        let a = (e1.x * d2.y - e2.x * d1.y) * inv_det;
        let b = (e2.x * d1.x - e1.x * d2.x) * inv_det;
        let d = (e1.y * d2.y - e2.y * d1.y) * inv_det;
        let e = (e2.y * d1.x - e1.y * d2.x) * inv_det;

        let c = to[0].x - a * from[0].x - b * from[0].y;
        let f = to[0].y - d * from[0].x - e * from[0].y;

        Some(Affine2::new([[a, b, c], [d, e, f]]))
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.data;
        m[0][0] * m[1][1] - m[0][1] * m[1][0]
    }

    /// Returns the inverse transform, or `None` if the linear part is singular.
    pub fn inverse(&self) -> Option<Affine2> {
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let [[a, b, c], [d, e, f]] = self.data;

        let new_a = e * inv_det;
        let new_b = -b * inv_det;
        let new_d = -d * inv_det;
        let new_e = a * inv_det;
        let new_c = -(new_a * c + new_b * f);
        let new_f = -(new_d * c + new_e * f);

        Some(Affine2::new([[new_a, new_b, new_c], [new_d, new_e, new_f]]))
    }

    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let m = &self.data;
        Vec2::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2],
        )
    }

    pub fn data(&self) -> &[[f64; 3]; 2] {
        &self.data
    }
}

/// Compose two transforms: `self * rhs` applies `rhs` first.
impl Mul<Affine2> for Affine2 {
    type Output = Affine2;

    fn mul(self, rhs: Affine2) -> Self::Output {
        let l = &self.data;
        let r = &rhs.data;
        let mut result = [[0.0f64; 3]; 2];

        for row in 0..2 {
            for col in 0..3 {
                result[row][col] = l[row][0] * r[0][col] + l[row][1] * r[1][col];
            }
            result[row][2] += l[row][2];
        }

        Affine2::new(result)
    }
}

impl Mul<Vec2> for Affine2 {
    type Output = Vec2;

    fn mul(self, p: Vec2) -> Self::Output {
        self.transform_point(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_vec_eq(a: Vec2, b: Vec2) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
    }

    #[test]
    fn test_from_triangles_maps_vertices() {
        let from = [
            Vec2::new(10.0, 10.0),
            Vec2::new(200.0, 40.0),
            Vec2::new(50.0, 300.0),
        ];
        let to = [
            Vec2::new(0.0, 0.0),
            Vec2::new(512.0, 0.0),
            Vec2::new(100.0, 480.0),
        ];
        let m = Affine2::from_triangles(from, to).unwrap();
        for i in 0..3 {
            assert_vec_eq(m * from[i], to[i]);
        }
    }

    #[test]
    fn test_from_triangles_identity() {
        let tri = [
            Vec2::new(0.0, 0.0),
            Vec2::new(512.0, 512.0),
            Vec2::new(512.0, 0.0),
        ];
        let m = Affine2::from_triangles(tri, tri).unwrap();
        let id = Affine2::identity();
        for (row, id_row) in m.data().iter().zip(id.data().iter()) {
            for (v, e) in row.iter().zip(id_row.iter()) {
                assert_relative_eq!(*v, *e, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_from_collinear_is_none() {
        let from = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, 2.0),
        ];
        assert!(Affine2::from_triangles(from, from).is_none());
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = Affine2::new([[2.0, 0.5, 3.0], [-1.0, 1.5, 7.0]]);
        let inv = m.inverse().unwrap();
        let p = Vec2::new(13.0, -4.0);
        assert_vec_eq(inv * (m * p), p);
        assert_vec_eq((inv * m) * p, p);
    }

    #[test]
    fn test_translation_composes_right_to_left() {
        let scale = Affine2::new([[2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]);
        let shift = Affine2::translation(1.0, 0.0);
        // shift first, then scale
        assert_vec_eq((scale * shift) * Vec2::ZERO, Vec2::new(2.0, 0.0));
    }
}
