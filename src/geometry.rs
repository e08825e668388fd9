//! Geometric predicates over 2D triangles.
//!
//! Pure functions with no state: orientation, point containment,
//! circumcircles and circle containment. These drive triangle lookup and the
//! local Delaunay legalization in [`crate::mesh`].

use crate::math::vec2::Vec2;
use crate::triangle::Triangle;

/// Denominator threshold below which a triangle is considered collinear.
pub const DEFAULT_DEGENERATE_THRESHOLD: f64 = 0.001;

/// Slack added to the squared radius when testing circle containment.
pub const DEFAULT_CIRCLE_SLACK: f64 = 1.0;

/// Signed area proxy of the triangle `(a, b, c)`.
///
/// Equals twice the signed area. In image coordinates (y down) a positive value
/// means `a -> b -> c` turns clockwise on screen.
#[inline]
pub fn orientation_sign(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (a.x - c.x) * (b.y - c.y) - (b.x - c.x) * (a.y - c.y)
}

/// Returns true if `p` lies inside `triangle` or on its boundary.
///
/// Works for either winding: the point is inside when the three edge signs do
/// not disagree. A zero sign never disqualifies a point, so vertices and points
/// on edges are contained by every triangle touching them.
pub fn point_in_triangle(p: Vec2, triangle: &Triangle) -> bool {
    let [v1, v2, v3] = triangle.points;
    let d1 = orientation_sign(p, v1, v2);
    let d2 = orientation_sign(p, v2, v3);
    let d3 = orientation_sign(p, v3, v1);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}

/// Unsigned area of a triangle.
pub fn triangle_area(triangle: &Triangle) -> f64 {
    let [a, b, c] = triangle.points;
    orientation_sign(a, b, c).abs() * 0.5
}

/// A circle in pixel space. A negative radius marks a degenerate circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
}

impl Circle {
    /// Sentinel for collinear triangles; contains nothing.
    pub const DEGENERATE: Circle = Circle {
        center: Vec2::ZERO,
        radius: -1.0,
    };

    pub fn is_degenerate(&self) -> bool {
        self.radius < 0.0
    }
}

/// Circumcircle of `triangle` using the default degeneracy threshold.
pub fn circumcircle(triangle: &Triangle) -> Circle {
    circumcircle_with_threshold(triangle, DEFAULT_DEGENERATE_THRESHOLD)
}

/// Circumcircle of `triangle`.
///
/// The radius comes from the side lengths, `R = abc / sqrt((a+b+c)(-a+b+c)(a-b+c)(a+b-c))`.
/// When that denominator (16 * area^2) is below `threshold` the triangle is
/// collinear and [`Circle::DEGENERATE`] is returned.
pub fn circumcircle_with_threshold(triangle: &Triangle, threshold: f64) -> Circle {
    let [p0, p1, p2] = triangle.points;

    let a = p0.distance(p1);
    let b = p1.distance(p2);
    let c = p2.distance(p0);

    let bot = (a + b + c) * (-a + b + c) * (a - b + c) * (a + b - c);
    if bot < threshold {
        return Circle::DEGENERATE;
    }
    let radius = a * b * c / bot.sqrt();

    let d1 = p1 - p0;
    let d2 = p2 - p0;
    let f1 = d1.x * d1.x + d1.y * d1.y;
    let f2 = d2.x * d2.x + d2.y * d2.y;

    let det = d2.y * d1.x - d1.y * d2.x;
    let top_x = d2.y * f1 - d1.y * f2;
    let top_y = -d2.x * f1 + d1.x * f2;

    let center = Vec2::new(p0.x + 0.5 * top_x / det, p0.y + 0.5 * top_y / det);

    Circle { center, radius }
}

/// Returns true if every vertex of `triangle` lies within `circle`, allowing
/// `slack` on the squared radius. Degenerate circles contain nothing.
pub fn in_circle(circle: &Circle, triangle: &Triangle, slack: f64) -> bool {
    if circle.is_degenerate() {
        return false;
    }
    let limit = circle.radius * circle.radius + slack;
    triangle
        .points
        .iter()
        .all(|p| p.distance_squared(circle.center) <= limit)
}
