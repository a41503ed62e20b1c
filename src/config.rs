//! Compile-time configuration constants.

use crate::plugin::abi::Color;

/// Directory scanned for plugin shared libraries.
pub const PLUGINS_DIR: &str = "plugins";

/// Minimum elapsed time between successive stamp operations, in
/// milliseconds. Bounds plugin invocation frequency and display-texture
/// regeneration cost, independent of frame rate.
pub const PUT_PIXEL_DELAY_MS: u64 = 16;

/// Stamp spacing along an interpolated stroke, as a percentage of the
/// brush size. 95% guarantees gap-free strokes while bounding the stamp
/// count.
pub const STROKE_STEP_SPACING_PERCENT: f32 = 95.0;

/// Multiplicative zoom step per scroll notch.
pub const IMAGE_ZOOM_RATE: f32 = 1.1;

/// Lower bound for the canvas zoom scale.
pub const IMAGE_MIN_SCALE: f32 = 0.1;

/// Upper bound for the canvas zoom scale.
pub const IMAGE_MAX_SCALE: f32 = 10.0;

/// Pan distance per scroll notch, as a fraction of the image dimension.
pub const IMAGE_SCROLL_RATE: f32 = 0.05;

/// Fixed color used for opaque cells of plugin icons.
pub const ICON_COLOR: Color = Color {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};

/// Initial brush size (disk radius in pixels).
pub const DEFAULT_BRUSH_SIZE: i32 = 4;

/// Initial tool opacity.
pub const DEFAULT_OPACITY: u8 = 255;

/// Initial primary color.
pub const DEFAULT_PRIMARY_COLOR: Color = Color {
    r: 255,
    g: 255,
    b: 255,
    a: 255,
};
