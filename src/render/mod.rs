//! Frame synthesis: triangle masks, rasterization, warping and blending.

pub mod mask;
pub mod morph;
pub mod overlay;
pub mod rasterizer;
pub mod sequence;
pub mod warp;

pub use mask::{Mask, MaskBuffer};
pub use morph::{MorphRenderer, PairMasks};
pub use overlay::draw_mesh;
pub use rasterizer::{
    EdgeFunctionRasterizer, Rasterizer, RasterizerDispatcher, RasterizerType, ScanlineRasterizer,
};
pub use sequence::{AnimationWorker, Frame, FrameSequence};
pub use warp::BorderMode;
