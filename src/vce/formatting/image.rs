//! Inline image helpers and the crop capability used by drag-and-drop areas.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::ImageFormat;
use log::trace;

use crate::vce::types::error::{Result, VceError};

/// Crops a rectangle out of an encoded bitmap and re-encodes it as PNG.
///
/// Implementations receive the raw image bytes exactly as stored in the
/// container and the rectangle in pixel coordinates.
pub trait ImageCropper {
    fn crop_png(&self, image: &[u8], x: i32, y: i32, width: i32, height: i32) -> Result<Vec<u8>>;
}

/// Default [`ImageCropper`] backed by the `image` crate.
///
/// The source format is sniffed from the bytes, so JPEG, PNG, GIF and BMP
/// base images are all accepted.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngCropper;

impl ImageCropper for PngCropper {
    fn crop_png(&self, image: &[u8], x: i32, y: i32, width: i32, height: i32) -> Result<Vec<u8>> {
        let source = image::load_from_memory(image)
            .map_err(|e| VceError::ImageError(format!("Failed to decode base image: {}", e)))?;

        let to_u32 = |value: i32, what: &str| {
            u32::try_from(value)
                .map_err(|_| VceError::ImageError(format!("Negative crop {}: {}", what, value)))
        };
        let (x, y) = (to_u32(x, "x")?, to_u32(y, "y")?);
        let (width, height) = (to_u32(width, "width")?, to_u32(height, "height")?);

        let fits = width > 0
            && height > 0
            && x.checked_add(width).is_some_and(|end| end <= source.width())
            && y.checked_add(height).is_some_and(|end| end <= source.height());
        if !fits {
            return Err(VceError::ImageError(format!(
                "Crop rectangle {}x{} at ({}, {}) is outside the {}x{} image",
                width,
                height,
                x,
                y,
                source.width(),
                source.height()
            )));
        }

        let cropped = source.crop_imm(x, y, width, height);
        let mut encoded = Cursor::new(Vec::new());
        cropped
            .write_to(&mut encoded, ImageFormat::Png)
            .map_err(|e| VceError::ImageError(format!("Failed to encode PNG: {}", e)))?;

        trace!(
            "Cropped {}x{} at ({}, {}) into {} PNG bytes",
            width,
            height,
            x,
            y,
            encoded.get_ref().len()
        );
        Ok(encoded.into_inner())
    }
}

/// Wraps image bytes into an `<img>` tag with a base64 data URI.
pub fn image_tag(data: &[u8]) -> String {
    image_tag_with_attributes(data, &[])
}

/// [`image_tag`] with extra pre-rendered attributes such as `width="120"`.
pub fn image_tag_with_attributes(data: &[u8], attributes: &[String]) -> String {
    let mut tag = format!("<img src=\"data:image;base64,{}\"", STANDARD.encode(data));
    for attribute in attributes {
        tag.push(' ');
        tag.push_str(attribute);
    }
    tag.push_str(" >");
    tag
}
