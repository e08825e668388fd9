//! Small fixed-size math types used by the mesh and the renderer.

pub mod affine;
pub mod vec2;
