//! Owned RGBA image buffer with bounds-guarded pixel access.

use crate::plugin::abi::Color;

/// Number of channels per pixel. The editor works in RGBA only.
pub const CHANNELS: i32 = 4;

/// An owned raster image: raw byte buffer plus dimensions.
///
/// The buffer is either empty (no image loaded) or holds exactly
/// `width * height * channels` bytes in row-major RGBA order. It is
/// exclusively owned by the editor session; plugins only ever see a
/// borrowed raw view for the duration of a call.
#[derive(Debug, Clone, Default)]
pub struct ImageBuffer {
    data: Vec<u8>,
    width: i32,
    height: i32,
    channels: i32,
}

impl ImageBuffer {
    /// Create an empty buffer (no image loaded).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer from raw RGBA bytes.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height * CHANNELS`.
    pub fn from_raw(width: i32, height: i32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            (width * height * CHANNELS) as usize,
            "buffer length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels: CHANNELS,
        }
    }

    /// Image width in pixels. Zero when nothing is loaded.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Image height in pixels. Zero when nothing is loaded.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Channels per pixel (always 4 while an image is loaded).
    pub fn channels(&self) -> i32 {
        self.channels
    }

    /// Whether an image is currently loaded.
    pub fn is_loaded(&self) -> bool {
        !self.data.is_empty()
    }

    /// Whether `(x, y)` lies inside the image bounds.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Byte offset of the pixel at `(x, y)`.
    ///
    /// Pure function of the buffer dimensions; callers must check
    /// [`in_bounds`](Self::in_bounds) first.
    pub fn pixel_index(&self, x: i32, y: i32) -> usize {
        ((y * self.width + x) * self.channels) as usize
    }

    /// Read the pixel at `(x, y)`, or `None` out of bounds.
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.is_loaded() || !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.pixel_index(x, y);
        Some(Color {
            r: self.data[idx],
            g: self.data[idx + 1],
            b: self.data[idx + 2],
            a: self.data[idx + 3],
        })
    }

    /// Write the pixel at `(x, y)`, preserving the destination alpha.
    ///
    /// Only RGB is taken from `color`; the pixel's existing opacity is
    /// kept. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, color: Color, x: i32, y: i32) {
        if !self.is_loaded() || !self.in_bounds(x, y) {
            return;
        }
        let idx = self.pixel_index(x, y);
        self.data[idx] = color.r;
        self.data[idx + 1] = color.g;
        self.data[idx + 2] = color.b;
    }

    /// Borrow the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable pointer to the raw bytes, for the plugin call boundary.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }

    /// Copy of the raw bytes, for order-independent filtering.
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.clone()
    }

    /// Replace the raw bytes in place.
    ///
    /// # Panics
    ///
    /// Panics if `data` does not match the current buffer length.
    pub fn replace_data(&mut self, data: Vec<u8>) {
        assert_eq!(data.len(), self.data.len());
        self.data = data;
    }

    /// Release the image. Idempotent.
    pub fn unload(&mut self) {
        self.data = Vec::new();
        self.width = 0;
        self.height = 0;
        self.channels = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: i32, height: i32, color: Color) -> ImageBuffer {
        let mut data = Vec::with_capacity((width * height * CHANNELS) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        ImageBuffer::from_raw(width, height, data)
    }

    #[test]
    fn test_empty_buffer() {
        let img = ImageBuffer::new();
        assert!(!img.is_loaded());
        assert_eq!(img.get_pixel(0, 0), None);
    }

    #[test]
    fn test_pixel_index_is_pure() {
        let img = solid(7, 5, Color::default());
        assert_eq!(img.pixel_index(3, 2), img.pixel_index(3, 2));
        assert_eq!(img.pixel_index(0, 0), 0);
        assert_eq!(img.pixel_index(1, 0), CHANNELS as usize);
        assert_eq!(img.pixel_index(0, 1), (7 * CHANNELS) as usize);
    }

    #[test]
    fn test_get_put_roundtrip_rgb() {
        let mut img = solid(4, 4, Color { r: 0, g: 0, b: 0, a: 200 });
        let ink = Color { r: 10, g: 20, b: 30, a: 40 };
        img.put_pixel(ink, 2, 3);
        let got = img.get_pixel(2, 3).unwrap();
        assert_eq!((got.r, got.g, got.b), (10, 20, 30));
    }

    #[test]
    fn test_put_pixel_preserves_alpha() {
        let mut img = solid(4, 4, Color { r: 0, g: 0, b: 0, a: 200 });
        img.put_pixel(Color { r: 1, g: 2, b: 3, a: 77 }, 1, 1);
        assert_eq!(img.get_pixel(1, 1).unwrap().a, 200);
    }

    #[test]
    fn test_out_of_bounds_access_is_guarded() {
        let mut img = solid(4, 4, Color::default());
        assert_eq!(img.get_pixel(4, 0), None);
        assert_eq!(img.get_pixel(0, -1), None);
        // Must not panic.
        img.put_pixel(Color { r: 9, g: 9, b: 9, a: 9 }, -1, 100);
    }

    #[test]
    fn test_unload_is_idempotent() {
        let mut img = solid(2, 2, Color::default());
        img.unload();
        assert!(!img.is_loaded());
        img.unload();
        assert!(!img.is_loaded());
        assert_eq!(img.width(), 0);
    }
}
