//! Image file decode/encode.
//!
//! Load accepts the common raster formats the `image` crate understands
//! (PNG and JPEG at minimum), always decoding to RGBA. Save always
//! emits PNG, losslessly, at the buffer's native channel count.

use crate::buffer::ImageBuffer;
use crate::error::{Error, Result};
use std::path::Path;

/// Decode the file at `path` into an RGBA [`ImageBuffer`].
pub fn load_rgba(path: &Path) -> Result<ImageBuffer> {
    let decoded = image::open(path)?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::debug!(path = %path.display(), width, height, "image decoded");
    Ok(ImageBuffer::from_raw(
        width as i32,
        height as i32,
        rgba.into_raw(),
    ))
}

/// Encode `img` to a PNG file at `path`.
pub fn save_png(img: &ImageBuffer, path: &Path) -> Result<()> {
    if !img.is_loaded() {
        return Err(Error::NoImage);
    }
    image::save_buffer_with_format(
        path,
        img.as_slice(),
        img.width() as u32,
        img.height() as u32,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )?;
    tracing::debug!(path = %path.display(), "image saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_without_image_fails() {
        let img = ImageBuffer::new();
        let result = save_png(&img, Path::new("unused.png"));
        assert!(matches!(result, Err(Error::NoImage)));
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(load_rgba(Path::new("definitely/not/here.png")).is_err());
    }
}
