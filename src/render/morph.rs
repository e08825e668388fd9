//! Per-triangle warp-and-blend frame synthesis.
//!
//! A frame at parameter τ starts as a copy of the source image. For every
//! triangle pair of the mesh, the pixels under the source triangle are
//! replaced by `τ * warped_target + (1 - τ) * source`, where `warped_target` is
//! the target triangle's content pulled through the affine map between the two
//! triangles. The source triangles' masks partition the working region, so each
//! pixel is rewritten by exactly one pair and iteration order does not matter.

use std::time::Instant;

use image::{Rgb, Rgb32FImage, RgbImage};
use log::trace;

use crate::error::MorphError;
use crate::math::affine::Affine2;
use crate::mesh::CorrespondenceMesh;
use crate::render::mask::Mask;
use crate::render::rasterizer::{Rasterizer, RasterizerDispatcher, RasterizerType};
use crate::render::warp::{warp_triangle, BorderMode, MaskedImage};
use crate::triangle::Triangle;

/// Renders morph frames from a [`CorrespondenceMesh`] and two images.
///
/// The renderer never mutates the mesh and keeps no per-frame state; masks are
/// rebuilt on every call.
#[derive(Debug, Clone, Default)]
pub struct MorphRenderer {
    rasterizer: RasterizerDispatcher,
    border: BorderMode,
}

/// The source and target masks of one triangle pair, both in the source frame.
#[derive(Debug, Clone)]
pub struct PairMasks {
    pub source: Mask,
    pub target: Mask,
}

impl MorphRenderer {
    pub fn new(rasterizer_type: RasterizerType) -> Self {
        Self {
            rasterizer: RasterizerDispatcher::new(rasterizer_type),
            border: BorderMode::default(),
        }
    }

    pub fn set_rasterizer(&mut self, rasterizer_type: RasterizerType) {
        self.rasterizer.set_type(rasterizer_type);
    }

    pub fn rasterizer(&self) -> RasterizerType {
        self.rasterizer.active_type()
    }

    pub fn set_border_mode(&mut self, border: BorderMode) {
        self.border = border;
    }

    pub fn border_mode(&self) -> BorderMode {
        self.border
    }

    /// Rasterizes `triangle` into a fresh `size x size` mask.
    pub fn rasterize(&self, triangle: &Triangle, size: u32) -> Mask {
        let mut mask = Mask::new(size, size);
        self.rasterizer.fill_triangle(triangle, &mut mask.as_buffer());
        mask
    }

    /// Masks for every pair of `mesh`, in mesh order. Target triangles are moved
    /// into the source frame first.
    pub fn pair_masks(&self, mesh: &CorrespondenceMesh) -> Vec<PairMasks> {
        let size = mesh.config().size;
        let offset = mesh.config().extent();
        mesh.pairs()
            .map(|(source, target)| PairMasks {
                source: self.rasterize(&source, size),
                target: self.rasterize(&target.offset_x(-offset), size),
            })
            .collect()
    }

    /// Renders the frame at `tau` (0 = source, 1 = target shapes and colors).
    ///
    /// # Errors
    /// Returns [`MorphError::ImageSizeMismatch`] if either image is not
    /// `size x size` for the mesh's working region.
    pub fn render_frame(
        &self,
        mesh: &CorrespondenceMesh,
        source: &RgbImage,
        target: &RgbImage,
        tau: f64,
    ) -> Result<RgbImage, MorphError> {
        let size = mesh.config().size;
        check_size("source", source, size)?;
        check_size("target", target, size)?;

        let start = Instant::now();
        let mut frame = to_float(source);
        let target = to_float(target);
        self.render_into(mesh, &mut frame, &target, tau);
        trace!(
            "rendered tau={:.4} over {} pairs in {:?}",
            tau,
            mesh.len(),
            start.elapsed()
        );

        Ok(to_u8(&frame))
    }

    /// Composites every triangle pair into `frame`, which must hold the source
    /// image on entry.
    fn render_into(
        &self,
        mesh: &CorrespondenceMesh,
        frame: &mut Rgb32FImage,
        target: &Rgb32FImage,
        tau: f64,
    ) {
        let size = mesh.config().size;
        let offset = mesh.config().extent();
        let tau = tau as f32;

        for (source_tri, target_tri) in mesh.pairs() {
            let local_target = target_tri.offset_x(-offset);
            let source_mask = self.rasterize(&source_tri, size);
            if source_mask.count() == 0 {
                continue;
            }
            let target_mask = self.rasterize(&local_target, size);

            // Source -> target, so each source pixel can look up its position in
            // the target. Only a collinear source triangle has no such map, and
            // its mask is empty. A collinear target is fine: its mask is empty
            // and the warp falls back to the nearest target pixel.
            let Some(source_to_target) =
                Affine2::from_triangles(source_tri.points, local_target.points)
            else {
                trace!("degenerate source triangle {:?}, keeping source", source_tri);
                continue;
            };

            let content = MaskedImage {
                image: target,
                mask: &target_mask,
            };
            warp_triangle(
                &content,
                &source_mask,
                &source_to_target,
                self.border,
                frame,
                |pixel, warped| {
                    // The pixel still holds the source content of this triangle.
                    for (channel, w) in pixel.0.iter_mut().zip(warped) {
                        *channel = tau * w + (1.0 - tau) * *channel;
                    }
                },
            );
        }
    }
}

fn check_size(role: &'static str, image: &RgbImage, size: u32) -> Result<(), MorphError> {
    let actual = image.dimensions();
    if actual != (size, size) {
        return Err(MorphError::ImageSizeMismatch {
            role,
            expected: (size, size),
            actual,
        });
    }
    Ok(())
}

fn to_float(image: &RgbImage) -> Rgb32FImage {
    Rgb32FImage::from_fn(image.width(), image.height(), |x, y| {
        Rgb(image.get_pixel(x, y).0.map(f32::from))
    })
}

fn to_u8(image: &Rgb32FImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        Rgb(image
            .get_pixel(x, y)
            .0
            .map(|v| v.round().clamp(0.0, 255.0) as u8))
    })
}
