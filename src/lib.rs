//! Feature-guided image morphing on the CPU.
//!
//! Two images are put in correspondence by a pair of triangulations that share
//! one topology. Each clicked point pair splits the containing triangle on both
//! sides and is followed by a local Delaunay edge flip. Frames of the morph are
//! rendered by warping every target triangle onto its source triangle and
//! blending the two by τ.
//!
//! # Quick Start
//!
//! ```ignore
//! use trimorph::prelude::*;
//!
//! let mut mesh = CorrespondenceMesh::new(MorphConfig::default());
//! mesh.insert_point(Vec2::new(120.0, 200.0), Vec2::new(512.0 + 130.0, 190.0));
//!
//! let renderer = MorphRenderer::default();
//! let frame = renderer.render_frame(&mesh, &before, &after, 0.5)?;
//! ```

// Public API - exposed to library consumers
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod math;
pub mod mesh;
pub mod render;
pub mod triangle;

// Re-export commonly needed types at crate root for convenience
pub use config::{FrameCount, MorphConfig};
pub use error::MorphError;
pub use mesh::{CorrespondenceMesh, InsertOutcome, PointPair, Side};
pub use render::{AnimationWorker, BorderMode, Frame, MorphRenderer, RasterizerType};

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use trimorph::prelude::*;
/// ```
pub mod prelude {
    // Configuration
    pub use crate::config::{FrameCount, MorphConfig};
    pub use crate::error::MorphError;

    // Mesh
    pub use crate::mesh::{CorrespondenceMesh, InsertOutcome, PointPair, Side};
    pub use crate::triangle::{Face, Triangle};

    // Math
    pub use crate::math::affine::Affine2;
    pub use crate::math::vec2::Vec2;

    // Rendering
    pub use crate::render::overlay::draw_mesh;
    pub use crate::render::{
        AnimationWorker, BorderMode, Frame, MorphRenderer, RasterizerType,
    };
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{
        EdgeFunctionRasterizer, Mask, MaskBuffer, Rasterizer, ScanlineRasterizer,
    };
    pub use crate::triangle::Triangle;
}
