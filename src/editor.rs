//! Editor session: image lifecycle, tool state, and drawing dispatch.
//!
//! The session owns the image buffer and the current tool state, and
//! routes pointer gestures through the drawing engine into either a
//! put-pixel plugin callback or the built-in brush. Collaborators hold
//! an explicit `&mut Editor`; there is no ambient global context.

use crate::buffer::ImageBuffer;
use crate::codec;
use crate::config;
use crate::draw::{self, StampGate, StrokeTracker};
use crate::error::{Error, Result};
use crate::filter;
use crate::geom::Vec2;
use crate::plugin::abi::{Color, EditorState, PixelPos};
use crate::plugin::{Plugin, PluginKind};
use std::path::Path;
use std::time::{Duration, Instant};

/// The color source for a drag gesture.
#[derive(Clone, Copy)]
pub enum Brush<'a> {
    /// Built-in circular brush painting the primary selected color.
    Builtin,
    /// A put-pixel plugin; invoked once per stamp position.
    Plugin(&'a Plugin),
}

/// An editing session over one image.
pub struct Editor {
    image: ImageBuffer,
    /// Current tool state; snapshotted by value into plugin calls.
    pub state: EditorState,
    stroke: StrokeTracker,
    gate: StampGate,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Create a session with no image loaded and default tool state.
    pub fn new() -> Self {
        Self {
            image: ImageBuffer::new(),
            state: EditorState {
                primary_selected_color: config::DEFAULT_PRIMARY_COLOR,
                opacity: config::DEFAULT_OPACITY,
                put_pixel_size: config::DEFAULT_BRUSH_SIZE,
            },
            stroke: StrokeTracker::new(),
            gate: StampGate::new(Duration::from_millis(config::PUT_PIXEL_DELAY_MS)),
        }
    }

    /// The current image buffer.
    pub fn image(&self) -> &ImageBuffer {
        &self.image
    }

    /// Load the image at `path` into the session.
    ///
    /// Any previously loaded image is released before the decode is
    /// attempted, so a failed load leaves the session with no image.
    pub fn load_image(&mut self, path: &Path) -> Result<()> {
        self.unload_image();
        match codec::load_rgba(path) {
            Ok(image) => {
                tracing::info!(
                    path = %path.display(),
                    width = image.width(),
                    height = image.height(),
                    "image loaded"
                );
                self.image = image;
                Ok(())
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "image load failed");
                Err(e)
            }
        }
    }

    /// Release the current image. Idempotent.
    pub fn unload_image(&mut self) {
        self.image.unload();
        self.stroke.reset();
    }

    /// Save the current image as PNG at `path`.
    pub fn save_image(&self, path: &Path) -> Result<()> {
        codec::save_png(&self.image, path)
    }

    /// Stamp a filled disk of the current brush size at `center`.
    pub fn draw_circle(&mut self, center: Vec2<i32>, color: Color) {
        let pixels = draw::surrounding_pixels(
            center,
            self.state.put_pixel_size,
            self.image.width(),
            self.image.height(),
        );
        for p in pixels {
            self.image.put_pixel(color, p.x, p.y);
        }
    }

    /// End the current drag gesture.
    ///
    /// Call when the button is released or the pointer leaves the
    /// image, so the next drag does not interpolate from a stale
    /// position.
    pub fn end_stroke(&mut self) {
        self.stroke.reset();
    }

    /// Continue a drag gesture at image position `pos`.
    ///
    /// Applies the stamp timing gate, interpolates from the previous
    /// drag position when one exists, and stamps a disk at every
    /// interpolated point. For a plugin brush the callback is invoked
    /// once per stamp position with a snapshot of the tool state.
    ///
    /// Returns whether the image was mutated (so the collaborator knows
    /// to regenerate its display texture).
    pub fn pointer_drag(&mut self, pos: Vec2<i32>, brush: Brush<'_>, now: Instant) -> bool {
        if !self.image.is_loaded() || !self.image.in_bounds(pos.x, pos.y) {
            return false;
        }
        if let Brush::Plugin(plugin) = brush {
            if plugin.kind() != PluginKind::PutPixel {
                tracing::warn!(name = %plugin.name(), "drag with a non-put-pixel plugin ignored");
                return false;
            }
        }
        if !self.gate.try_stamp(now) {
            return false;
        }

        let stamps = self.stroke.advance(pos, self.state.put_pixel_size);
        let state = self.state;
        for stamp in stamps {
            let color = match brush {
                Brush::Builtin => state.primary_selected_color,
                Brush::Plugin(plugin) => {
                    let pos = PixelPos {
                        x: stamp.x as u32,
                        y: stamp.y as u32,
                    };
                    match plugin.put_pixel(state, pos) {
                        Some(color) => color,
                        None => continue,
                    }
                }
            };
            self.draw_circle(stamp, color);
        }
        true
    }

    /// Run a replace-image plugin over the current image.
    pub fn apply_plugin_filter(&mut self, plugin: &mut Plugin) -> Result<()> {
        if !self.image.is_loaded() {
            return Err(Error::NoImage);
        }
        let state = self.state;
        if plugin.replace_image(state, &mut self.image) {
            tracing::debug!(name = %plugin.name(), "filter applied");
        } else {
            tracing::warn!(name = %plugin.name(), "plugin is not a filter, nothing applied");
        }
        Ok(())
    }

    /// Run the built-in box-average filter with kernel radius `radius`.
    pub fn apply_box_average(&mut self, radius: i32) -> Result<()> {
        if !self.image.is_loaded() {
            return Err(Error::NoImage);
        }
        filter::box_average(&mut self.image, radius);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::CHANNELS;

    fn editor_with_canvas(width: i32, height: i32) -> Editor {
        let mut editor = Editor::new();
        let data = vec![0u8; (width * height * CHANNELS) as usize];
        editor.image = ImageBuffer::from_raw(width, height, data);
        editor
    }

    #[test]
    fn test_drag_without_image_is_noop() {
        let mut editor = Editor::new();
        assert!(!editor.pointer_drag(Vec2::new(0, 0), Brush::Builtin, Instant::now()));
    }

    #[test]
    fn test_builtin_drag_paints_primary_color() {
        let mut editor = editor_with_canvas(20, 20);
        editor.state.primary_selected_color = Color { r: 200, g: 10, b: 30, a: 255 };
        editor.state.put_pixel_size = 2;
        assert!(editor.pointer_drag(Vec2::new(10, 10), Brush::Builtin, Instant::now()));
        let p = editor.image().get_pixel(10, 10).unwrap();
        assert_eq!((p.r, p.g, p.b), (200, 10, 30));
        // Alpha of the destination is untouched (was 0).
        assert_eq!(p.a, 0);
    }

    #[test]
    fn test_gate_limits_stamp_rate() {
        let mut editor = editor_with_canvas(20, 20);
        let t0 = Instant::now();
        assert!(editor.pointer_drag(Vec2::new(5, 5), Brush::Builtin, t0));
        // Within the delay window: rejected, stroke position kept.
        assert!(!editor.pointer_drag(
            Vec2::new(6, 5),
            Brush::Builtin,
            t0 + Duration::from_millis(1)
        ));
        assert!(editor.pointer_drag(
            Vec2::new(7, 5),
            Brush::Builtin,
            t0 + Duration::from_millis(config::PUT_PIXEL_DELAY_MS)
        ));
    }

    #[test]
    fn test_fast_drag_leaves_no_gap() {
        let mut editor = editor_with_canvas(120, 20);
        editor.state.put_pixel_size = 3;
        editor.state.primary_selected_color = Color { r: 255, g: 255, b: 255, a: 255 };
        let t0 = Instant::now();
        assert!(editor.pointer_drag(Vec2::new(5, 10), Brush::Builtin, t0));
        assert!(editor.pointer_drag(
            Vec2::new(110, 10),
            Brush::Builtin,
            t0 + Duration::from_millis(config::PUT_PIXEL_DELAY_MS)
        ));
        // Every pixel on the drag row between the endpoints is painted.
        for x in 5..=110 {
            let p = editor.image().get_pixel(x, 10).unwrap();
            assert_eq!(p.r, 255, "gap at x={x}");
        }
    }

    #[test]
    fn test_end_stroke_breaks_interpolation() {
        let mut editor = editor_with_canvas(120, 20);
        editor.state.put_pixel_size = 2;
        editor.state.primary_selected_color = Color { r: 9, g: 9, b: 9, a: 9 };
        let t0 = Instant::now();
        assert!(editor.pointer_drag(Vec2::new(5, 10), Brush::Builtin, t0));
        editor.end_stroke();
        assert!(editor.pointer_drag(
            Vec2::new(100, 10),
            Brush::Builtin,
            t0 + Duration::from_millis(config::PUT_PIXEL_DELAY_MS)
        ));
        // The midpoint was not interpolated across the broken stroke.
        let mid = editor.image().get_pixel(50, 10).unwrap();
        assert_eq!(mid.r, 0);
    }

    #[test]
    fn test_draw_circle_respects_radius() {
        let mut editor = editor_with_canvas(30, 30);
        editor.state.put_pixel_size = 3;
        editor.draw_circle(Vec2::new(15, 15), Color { r: 1, g: 1, b: 1, a: 1 });
        assert_eq!(editor.image().get_pixel(15, 15).unwrap().r, 1);
        assert_eq!(editor.image().get_pixel(18, 15).unwrap().r, 1);
        // Outside the disk.
        assert_eq!(editor.image().get_pixel(19, 15).unwrap().r, 0);
        assert_eq!(editor.image().get_pixel(18, 18).unwrap().r, 0);
    }

    #[test]
    fn test_filters_require_an_image() {
        let mut editor = Editor::new();
        assert!(matches!(editor.apply_box_average(1), Err(Error::NoImage)));
        assert!(matches!(
            editor.save_image(Path::new("unused.png")),
            Err(Error::NoImage)
        ));
    }

    #[test]
    fn test_box_average_radius_zero_identity() {
        let mut editor = editor_with_canvas(8, 8);
        editor.draw_circle(Vec2::new(4, 4), Color { r: 77, g: 66, b: 55, a: 44 });
        let before = editor.image().snapshot();
        editor.apply_box_average(0).unwrap();
        assert_eq!(editor.image().as_slice(), &before[..]);
    }

    #[test]
    fn test_failed_load_leaves_no_image() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("broken.png");
        std::fs::write(&bad, b"this is not a png").unwrap();

        let mut editor = editor_with_canvas(4, 4);
        assert!(editor.image().is_loaded());
        assert!(editor.load_image(&bad).is_err());
        assert!(!editor.image().is_loaded());
    }
}
