//! Boundary to the display surface.
//!
//! The windowing collaborator owns the actual graphics context; the
//! engine only needs to hand it RGBA pixel data and keep opaque handles
//! to the resulting textures (plugin icons, the image view). The trait
//! here is that seam.

use thiserror::Error;

/// Opaque handle to a texture owned by the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Errors reported by the display surface.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The surface rejected or failed the texture upload.
    #[error("texture upload failed: {0}")]
    Upload(String),
}

/// Uploads RGBA pixel data to the display surface.
pub trait TextureUploader {
    /// Upload `pixels` (tightly packed RGBA, `width * height * 4`
    /// bytes) and return a handle to the created texture.
    fn upload_rgba(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureHandle, SurfaceError>;

    /// Release a texture previously returned by
    /// [`upload_rgba`](Self::upload_rgba).
    fn release(&mut self, texture: TextureHandle);
}

/// A no-op uploader that always succeeds.
///
/// Useful for headless operation and tests; handles are sequential and
/// never backed by real textures.
#[derive(Debug, Default)]
pub struct NullUploader {
    next: u64,
    live: u64,
}

impl NullUploader {
    /// Create a new null uploader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of uploaded-and-not-released textures.
    pub fn live_textures(&self) -> u64 {
        self.live
    }
}

impl TextureUploader for NullUploader {
    fn upload_rgba(
        &mut self,
        _width: u32,
        _height: u32,
        _pixels: &[u8],
    ) -> Result<TextureHandle, SurfaceError> {
        let handle = TextureHandle(self.next);
        self.next += 1;
        self.live += 1;
        Ok(handle)
    }

    fn release(&mut self, _texture: TextureHandle) {
        self.live = self.live.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_uploader_hands_out_distinct_handles() {
        let mut uploader = NullUploader::new();
        let a = uploader.upload_rgba(1, 1, &[0; 4]).unwrap();
        let b = uploader.upload_rgba(1, 1, &[0; 4]).unwrap();
        assert_ne!(a, b);
        assert_eq!(uploader.live_textures(), 2);
        uploader.release(a);
        assert_eq!(uploader.live_textures(), 1);
    }
}
