//! Error type for the morphing core.

/// Errors surfaced to callers.
///
/// Input-rate conditions such as a mis-clicked point pair are not errors; see
/// [`crate::mesh::InsertOutcome`].
#[derive(thiserror::Error, Debug)]
pub enum MorphError {
    /// An input image does not match the working region.
    #[error("{role} image is {}x{}, expected {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    ImageSizeMismatch {
        role: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Frame counts must be a power of two within the supported range.
    #[error("frame count {0} is not a power of two in [{min}, {max}]", min = crate::config::FrameCount::MIN, max = crate::config::FrameCount::MAX)]
    InvalidFrameCount(u32),

    /// The working region must be non-empty and at most `MAX_SIZE` pixels wide.
    #[error("invalid working region size {0}, expected 1..={max}", max = crate::config::MAX_SIZE)]
    InvalidSize(u32),

    /// Error raised by the image codec layer.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}
