//! Window-to-image coordinate transform.
//!
//! The image is drawn centered in its viewport, offset by the pan and
//! scaled by the zoom. Pointer positions arrive in window space and
//! must be mapped into image-pixel space before any drawing happens; a
//! position outside the image's on-screen rectangle is not a valid
//! drawing position.

use crate::config::{IMAGE_MAX_SCALE, IMAGE_MIN_SCALE, IMAGE_ZOOM_RATE};
use crate::geom::Vec2;

/// Pan/zoom state of the image viewport.
#[derive(Debug, Clone, Copy)]
pub struct CanvasView {
    scale: f32,
    pan: Vec2<f32>,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan: Vec2::new(0.0, 0.0),
        }
    }
}

impl CanvasView {
    /// Create a view at 1:1 scale with no pan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current zoom scale.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Current pan offset.
    pub fn pan(&self) -> Vec2<f32> {
        self.pan
    }

    /// On-screen size of the image at the current scale.
    pub fn scaled_image_size(&self, image_size: Vec2<i32>) -> Vec2<f32> {
        image_size.as_f32() * self.scale
    }

    /// Top-left corner of the image within its viewport: centered
    /// placement shifted by half the pan.
    pub fn image_top_left(&self, window_size: Vec2<f32>, image_size: Vec2<i32>) -> Vec2<f32> {
        let scaled = self.scaled_image_size(image_size);
        Vec2::new(
            (window_size.x - scaled.x + self.pan.x) * 0.5,
            (window_size.y - scaled.y + self.pan.y) * 0.5,
        )
    }

    /// Map a window-space pointer position to image-pixel space.
    ///
    /// `cursor` is relative to the viewport origin. Returns `None` when
    /// the position falls outside the viewport or outside the image's
    /// on-screen rectangle.
    pub fn window_to_image(
        &self,
        cursor: Vec2<f32>,
        window_size: Vec2<f32>,
        image_size: Vec2<i32>,
    ) -> Option<Vec2<i32>> {
        if cursor.x <= 0.0
            || cursor.x >= window_size.x
            || cursor.y <= 0.0
            || cursor.y >= window_size.y
        {
            return None;
        }

        let top_left = self.image_top_left(window_size, image_size);
        let scaled = self.scaled_image_size(image_size);
        let inside = cursor.x > top_left.x
            && cursor.x < top_left.x + scaled.x
            && cursor.y > top_left.y
            && cursor.y < top_left.y + scaled.y;
        if !inside {
            return None;
        }

        Some(Vec2::new(
            ((cursor.x - top_left.x) / self.scale) as i32,
            ((cursor.y - top_left.y) / self.scale) as i32,
        ))
    }

    /// Step the zoom in or out by one notch.
    ///
    /// The scale snaps to exactly 1.0 when a step crosses it, and is
    /// clamped to the configured range. The pan is re-clamped against
    /// the new scale so zooming never strands the image off-screen.
    pub fn zoom(&mut self, zoom_in: bool, window_size: Vec2<f32>) {
        let prev = self.scale;
        self.scale = if zoom_in {
            self.scale * IMAGE_ZOOM_RATE
        } else {
            self.scale / IMAGE_ZOOM_RATE
        };

        if (prev < 1.0 && self.scale > 1.0) || (prev > 1.0 && self.scale < 1.0) {
            self.scale = 1.0;
        }
        self.scale = self.scale.clamp(IMAGE_MIN_SCALE, IMAGE_MAX_SCALE);

        self.clamp_pan(window_size);
    }

    /// Shift the pan by `delta`, clamped against the scaled viewport.
    pub fn pan_by(&mut self, delta: Vec2<f32>, window_size: Vec2<f32>) {
        self.pan = self.pan + delta;
        self.clamp_pan(window_size);
    }

    fn clamp_pan(&mut self, window_size: Vec2<f32>) {
        let limit_x = window_size.x * self.scale;
        let limit_y = window_size.y * self.scale;
        self.pan.x = self.pan.x.clamp(-limit_x, limit_x);
        self.pan.y = self.pan.y.clamp(-limit_y, limit_y);
    }
}
