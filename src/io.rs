//! Image file helpers for the working region.

use std::path::Path;

use image::{imageops, RgbImage};
use log::info;

use crate::error::MorphError;

/// Reads an image of any supported format as 8-bit RGB, resized to
/// `size x size` if it is not already that size.
///
/// # Arguments
///
/// * `file_path` - The path to the image.
/// * `size` - Side of the working region.
pub fn read_image_rgb8(file_path: impl AsRef<Path>, size: u32) -> Result<RgbImage, MorphError> {
    let file_path = file_path.as_ref();
    let image = image::open(file_path)?.to_rgb8();
    if image.dimensions() == (size, size) {
        return Ok(image);
    }

    info!(
        "resizing {} from {}x{} to {size}x{size}",
        file_path.display(),
        image.width(),
        image.height()
    );
    Ok(imageops::resize(
        &image,
        size,
        size,
        imageops::FilterType::Triangle,
    ))
}

/// Writes `image` to `file_path`, the format chosen from the extension.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &RgbImage) -> Result<(), MorphError> {
    image.save(file_path)?;
    Ok(())
}
