use crate::math::vec2::Vec2;

// This struct represents a triangle defined by three vertices
// The members a, b, and c are indices into one side's vertex table.
// Equality is order-sensitive: (a, b, c) and (b, c, a) are different faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Face {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl Face {
    pub const fn new(a: usize, b: usize, c: usize) -> Self {
        Self { a, b, c }
    }

    pub fn indices(&self) -> [usize; 3] {
        [self.a, self.b, self.c]
    }

    /// Vertex index at position `i` (mod 3).
    pub fn vertex(&self, i: usize) -> usize {
        self.indices()[i % 3]
    }
}

impl From<[usize; 3]> for Face {
    fn from([a, b, c]: [usize; 3]) -> Self {
        Self { a, b, c }
    }
}

// This struct represents a triangle defined by three points
// The points are 2D coordinates in pixel space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub points: [Vec2; 3],
}

impl Triangle {
    pub const fn new(points: [Vec2; 3]) -> Self {
        Self { points }
    }

    /// The same triangle shifted horizontally by `dx`.
    pub fn offset_x(&self, dx: f64) -> Self {
        let [a, b, c] = self.points;
        Self::new([a.offset_x(dx), b.offset_x(dx), c.offset_x(dx)])
    }

    /// The three directed edges `(v_i, v_{i+1})`.
    pub fn edges(&self) -> [(Vec2, Vec2); 3] {
        let [a, b, c] = self.points;
        [(a, b), (b, c), (c, a)]
    }
}
