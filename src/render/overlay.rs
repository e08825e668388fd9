//! Mesh wireframe overlay.
//!
//! Places the source and target images side by side on a `2S x S` canvas (the
//! same layout the mesh's coordinates use) and draws both triangulations on top.

use image::{imageops, Rgb, RgbImage};

use crate::error::MorphError;
use crate::math::vec2::Vec2;
use crate::mesh::{CorrespondenceMesh, Side};
use crate::triangle::Triangle;

/// Half the side of the square drawn at each mesh vertex.
const VERTEX_RADIUS: i32 = 1;

pub const DEFAULT_WIRE_COLOR: Rgb<u8> = Rgb([255, 32, 32]);

/// Draws into an [`RgbImage`], silently clipping anything off-canvas.
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb<u8>) {
        if x >= 0 && x < self.image.width() as i32 && y >= 0 && y < self.image.height() as i32 {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgb<u8>) {
        for j in y..y + height {
            for i in x..x + width {
                self.set_pixel(i, j, color);
            }
        }
    }

    /// Bresenham line between two pixel positions, both endpoints included.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let x_step = if x0 < x1 { 1 } else { -1 };
        let y_step = if y0 < y1 { 1 } else { -1 };

        // Positive error favors x movement, negative favors y.
        let mut err = dx - dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += x_step;
            }
            if e2 < dx {
                err += dx;
                y += y_step;
            }
        }
    }

    pub fn draw_triangle_wireframe(&mut self, triangle: &Triangle, color: Rgb<u8>) {
        for (a, b) in triangle.edges() {
            let (x0, y0) = to_pixel(a);
            let (x1, y1) = to_pixel(b);
            self.draw_line(x0, y0, x1, y1, color);
        }
    }

    pub fn draw_vertex(&mut self, p: Vec2, color: Rgb<u8>) {
        let (x, y) = to_pixel(p);
        let side = 2 * VERTEX_RADIUS + 1;
        self.draw_rect(x - VERTEX_RADIUS, y - VERTEX_RADIUS, side, side, color);
    }
}

#[inline]
fn to_pixel(p: Vec2) -> (i32, i32) {
    (p.x.round() as i32, p.y.round() as i32)
}

/// Renders `before | after` with both triangulations of `mesh` drawn over them.
///
/// Vertices on the right edge of the canvas (x = 2S) are clipped like any other
/// off-canvas pixel.
pub fn draw_mesh(
    mesh: &CorrespondenceMesh,
    before: &RgbImage,
    after: &RgbImage,
    color: Rgb<u8>,
) -> Result<RgbImage, MorphError> {
    let size = mesh.config().size;
    for (role, image) in [("before", before), ("after", after)] {
        if image.dimensions() != (size, size) {
            return Err(MorphError::ImageSizeMismatch {
                role,
                expected: (size, size),
                actual: image.dimensions(),
            });
        }
    }

    let mut image = RgbImage::new(2 * size, size);
    imageops::replace(&mut image, before, 0, 0);
    imageops::replace(&mut image, after, size as i64, 0);

    let mut canvas = Canvas::new(image);
    for (source, target) in mesh.pairs() {
        canvas.draw_triangle_wireframe(&source, color);
        canvas.draw_triangle_wireframe(&target, color);
    }
    for &v in mesh
        .vertices(Side::Source)
        .iter()
        .chain(mesh.vertices(Side::Target))
    {
        canvas.draw_vertex(v, color);
    }

    Ok(canvas.into_image())
}
