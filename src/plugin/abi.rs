//! The binary contract a plugin module must implement.
//!
//! A plugin is a shared library loaded into the host process. It must
//! export, by fixed symbolic name, a zero-argument function returning a
//! pointer to a static [`PluginInfo`]:
//!
//! ```c
//! const PluginInfo *GET_PLUGIN_INFO(void);
//! ```
//!
//! Depending on the declared `plugin_type`, exactly one additional
//! export is required:
//!
//! ```c
//! Color PLUGIN_PUT_PIXEL(EditorState state, PixelPos pos);
//! void  PLUGIN_REPLACE_IMAGE(EditorState state, RawImage image, void *params);
//! ```
//!
//! All structs crossing this boundary are `#[repr(C)]`. String fields
//! are NUL-terminated and must stay valid for the lifetime of the
//! loaded module; the host reads them but never frees them. The
//! parameter buffer handed to `PLUGIN_REPLACE_IMAGE` is the
//! concatenation, in declaration order, of each declared variable's
//! value at its natural width (`f32` -> 4 bytes, `i32` -> 4 bytes,
//! `bool` -> 1 byte, no padding, native byte order).

use std::ffi::{CStr, c_char, c_int, c_void};

/// Side length of the mandatory plugin icon bitmap.
pub const ICON_SIZE: usize = 32;

/// Export name of the mandatory info accessor.
pub const INFO_SYMBOL: &[u8] = b"GET_PLUGIN_INFO\0";

/// Export name of the put-pixel callback.
pub const PUT_PIXEL_SYMBOL: &[u8] = b"PLUGIN_PUT_PIXEL\0";

/// Export name of the replace-image callback.
pub const REPLACE_IMAGE_SYMBOL: &[u8] = b"PLUGIN_REPLACE_IMAGE\0";

/// `plugin_type` value for per-pixel tools.
pub const PLUGIN_TYPE_PUT_PIXEL: c_int = 0;

/// `plugin_type` value for whole-image filters.
pub const PLUGIN_TYPE_REPLACE_IMAGE: c_int = 1;

/// `var_type` value for `f32` variables.
pub const VAR_TYPE_FLOAT: c_int = 0;

/// `var_type` value for `i32` variables.
pub const VAR_TYPE_INT: c_int = 1;

/// `var_type` value for `bool` variables.
pub const VAR_TYPE_BOOL: c_int = 2;

/// One RGBA pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// One pixel with wide channels, for accumulation without overflow.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LColor {
    /// Red accumulator.
    pub r: u32,
    /// Green accumulator.
    pub g: u32,
    /// Blue accumulator.
    pub b: u32,
    /// Alpha accumulator.
    pub a: u32,
}

/// An image-space pixel position handed to put-pixel callbacks.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPos {
    /// Column, `0 <= x < width`.
    pub x: u32,
    /// Row, `0 <= y < height`.
    pub y: u32,
}

/// Borrowed raw view of the image buffer for the duration of a
/// replace-image call. The plugin reads and writes through `data` but
/// must not retain the pointer past the call.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawImage {
    /// Row-major RGBA bytes, `width * height * channels` of them.
    pub data: *mut u8,
    /// Image width in pixels.
    pub width: i32,
    /// Image height in pixels.
    pub height: i32,
    /// Channels per pixel (always 4).
    pub channels: i32,
}

/// Snapshot of the host tool state, passed by value into plugin calls.
///
/// Plugins cannot mutate host state through it.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct EditorState {
    /// Currently selected primary color.
    pub primary_selected_color: Color,
    /// Tool opacity.
    pub opacity: u8,
    /// Brush disk radius in pixels.
    pub put_pixel_size: i32,
}

/// Value range for a numeric variable.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FloatRange {
    /// Minimum value.
    pub min: f32,
    /// Maximum value.
    pub max: f32,
    /// UI step increment.
    pub step: f32,
}

/// Default value of a variable; the active field is selected by the
/// owning [`VariableMeta::var_type`].
#[repr(C)]
#[derive(Clone, Copy)]
pub union VariableDefault {
    /// Active when `var_type` is [`VAR_TYPE_FLOAT`].
    pub as_float: f32,
    /// Active when `var_type` is [`VAR_TYPE_INT`].
    pub as_int: i32,
    /// Active when `var_type` is [`VAR_TYPE_BOOL`].
    pub as_bool: bool,
}

/// Describes one tunable parameter a replace-image plugin exposes to
/// the host UI.
#[repr(C)]
pub struct VariableMeta {
    /// NUL-terminated variable name.
    pub name: *const c_char,
    /// NUL-terminated description.
    pub description: *const c_char,
    /// One of the `VAR_TYPE_*` constants.
    pub var_type: c_int,
    /// Default value; the active union field matches `var_type`.
    pub default_value: VariableDefault,
    /// Range, meaningful for float and int variables only.
    pub range: FloatRange,
}

// SAFETY: VariableMeta only carries pointers to static plugin data and
// plain values, so sharing references across threads is sound.
unsafe impl Send for VariableMeta {}
unsafe impl Sync for VariableMeta {}

/// Static descriptor a plugin returns from `GET_PLUGIN_INFO`.
///
/// Must remain valid and unchanged for the lifetime of the loaded
/// module; the host reads it in place and never copies beyond that
/// lifetime.
#[repr(C)]
pub struct PluginInfo {
    /// NUL-terminated plugin name, shown in the editor.
    pub name: *const c_char,
    /// NUL-terminated short description, shown in the editor.
    pub description: *const c_char,
    /// One of the `PLUGIN_TYPE_*` constants.
    pub plugin_type: c_int,
    /// Declared variables; meaningful for replace-image plugins only.
    pub vars: *const VariableMeta,
    /// Number of entries behind `vars`.
    pub vars_len: u8,
    /// 32x32 grayscale icon; non-zero cells render opaque.
    pub icon: [[u8; ICON_SIZE]; ICON_SIZE],
}

// SAFETY: PluginInfo only carries pointers to static plugin data and
// plain values, so sharing references across threads is sound.
unsafe impl Send for PluginInfo {}
unsafe impl Sync for PluginInfo {}

impl PluginInfo {
    /// Plugin name as a Rust string.
    ///
    /// # Safety
    ///
    /// The `name` pointer must be valid and NUL-terminated.
    pub unsafe fn name_str(&self) -> &str {
        // SAFETY: Caller guarantees `name` is valid and NUL-terminated.
        unsafe { CStr::from_ptr(self.name).to_str().unwrap_or("unknown") }
    }

    /// Description as a Rust string.
    ///
    /// # Safety
    ///
    /// The `description` pointer must be valid and NUL-terminated.
    pub unsafe fn description_str(&self) -> &str {
        // SAFETY: Caller guarantees `description` is valid and NUL-terminated.
        unsafe { CStr::from_ptr(self.description).to_str().unwrap_or("") }
    }

    /// The declared variable slice.
    ///
    /// # Safety
    ///
    /// The `vars` pointer must be valid for `vars_len` entries (or null
    /// with `vars_len == 0`).
    pub unsafe fn vars_slice(&self) -> &[VariableMeta] {
        if self.vars.is_null() || self.vars_len == 0 {
            &[]
        } else {
            // SAFETY: Caller guarantees `vars` points to `vars_len` entries.
            unsafe { std::slice::from_raw_parts(self.vars, self.vars_len as usize) }
        }
    }
}

/// Type of the mandatory info accessor export.
pub type PluginInfoFn = unsafe extern "C" fn() -> *const PluginInfo;

/// Type of the put-pixel callback export.
pub type PutPixelFn = unsafe extern "C" fn(EditorState, PixelPos) -> Color;

/// Type of the replace-image callback export.
pub type ReplaceImageFn = unsafe extern "C" fn(EditorState, RawImage, *mut c_void);

/// Declare a plugin's static descriptor and exported entry points.
///
/// Intended for plugin crates built as `cdylib`. One invocation per
/// crate; the export names are fixed by the ABI, so a second invocation
/// would collide at link time.
///
/// # Example
///
/// ```ignore
/// use imkur::declare_plugin;
/// use imkur::plugin::abi::{Color, EditorState, PixelPos};
///
/// fn pencil(state: EditorState, _pos: PixelPos) -> Color {
///     state.primary_selected_color
/// }
///
/// declare_plugin! {
///     name: "Pencil",
///     description: "Plain round pencil",
///     icon: [[1; 32]; 32],
///     put_pixel: pencil,
/// }
/// ```
///
/// For a replace-image plugin, pass a static [`VariableMeta`] slice and
/// a `replace_image` callback instead:
///
/// ```ignore
/// declare_plugin! {
///     name: "Blur",
///     description: "Box blur filter",
///     icon: [[1; 32]; 32],
///     vars: &BLUR_VARS,
///     replace_image: blur,
/// }
/// ```
#[macro_export]
macro_rules! declare_plugin {
    (
        name: $name:literal,
        description: $desc:literal,
        icon: $icon:expr,
        put_pixel: $callback:expr $(,)?
    ) => {
        static PLUGIN_NAME: &[u8] = concat!($name, "\0").as_bytes();
        static PLUGIN_DESC: &[u8] = concat!($desc, "\0").as_bytes();

        static PLUGIN_INFO: $crate::plugin::abi::PluginInfo = $crate::plugin::abi::PluginInfo {
            name: PLUGIN_NAME.as_ptr() as *const ::std::ffi::c_char,
            description: PLUGIN_DESC.as_ptr() as *const ::std::ffi::c_char,
            plugin_type: $crate::plugin::abi::PLUGIN_TYPE_PUT_PIXEL,
            vars: ::std::ptr::null(),
            vars_len: 0,
            icon: $icon,
        };

        /// Plugin info accessor export.
        #[unsafe(no_mangle)]
        #[allow(non_snake_case)]
        pub extern "C" fn GET_PLUGIN_INFO() -> *const $crate::plugin::abi::PluginInfo {
            &PLUGIN_INFO
        }

        /// Put-pixel callback export.
        #[unsafe(no_mangle)]
        #[allow(non_snake_case)]
        pub extern "C" fn PLUGIN_PUT_PIXEL(
            state: $crate::plugin::abi::EditorState,
            pos: $crate::plugin::abi::PixelPos,
        ) -> $crate::plugin::abi::Color {
            let callback: fn(
                $crate::plugin::abi::EditorState,
                $crate::plugin::abi::PixelPos,
            ) -> $crate::plugin::abi::Color = $callback;
            callback(state, pos)
        }
    };
    (
        name: $name:literal,
        description: $desc:literal,
        icon: $icon:expr,
        vars: $vars:expr,
        replace_image: $callback:expr $(,)?
    ) => {
        static PLUGIN_NAME: &[u8] = concat!($name, "\0").as_bytes();
        static PLUGIN_DESC: &[u8] = concat!($desc, "\0").as_bytes();
        static PLUGIN_VARS: &[$crate::plugin::abi::VariableMeta] = $vars;

        static PLUGIN_INFO: $crate::plugin::abi::PluginInfo = $crate::plugin::abi::PluginInfo {
            name: PLUGIN_NAME.as_ptr() as *const ::std::ffi::c_char,
            description: PLUGIN_DESC.as_ptr() as *const ::std::ffi::c_char,
            plugin_type: $crate::plugin::abi::PLUGIN_TYPE_REPLACE_IMAGE,
            vars: PLUGIN_VARS.as_ptr(),
            vars_len: PLUGIN_VARS.len() as u8,
            icon: $icon,
        };

        /// Plugin info accessor export.
        #[unsafe(no_mangle)]
        #[allow(non_snake_case)]
        pub extern "C" fn GET_PLUGIN_INFO() -> *const $crate::plugin::abi::PluginInfo {
            &PLUGIN_INFO
        }

        /// Replace-image callback export.
        #[unsafe(no_mangle)]
        #[allow(non_snake_case)]
        pub extern "C" fn PLUGIN_REPLACE_IMAGE(
            state: $crate::plugin::abi::EditorState,
            image: $crate::plugin::abi::RawImage,
            params: *mut ::std::ffi::c_void,
        ) {
            let callback: fn(
                $crate::plugin::abi::EditorState,
                $crate::plugin::abi::RawImage,
                *mut ::std::ffi::c_void,
            ) = $callback;
            callback(state, image, params)
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    mod blur_fixture {
        use super::super::*;
        use std::ffi::c_void;

        fn blur(_state: EditorState, _image: RawImage, _params: *mut c_void) {}

        static VARS: [VariableMeta; 1] = [VariableMeta {
            name: c"Box size".as_ptr(),
            description: c"Radius of the box kernel".as_ptr(),
            var_type: VAR_TYPE_INT,
            default_value: VariableDefault { as_int: 1 },
            range: FloatRange {
                min: 1.0,
                max: 64.0,
                step: 1.0,
            },
        }];

        declare_plugin! {
            name: "Blur",
            description: "Box blur filter",
            icon: [[1; ICON_SIZE]; ICON_SIZE],
            vars: &VARS,
            replace_image: blur,
        }
    }

    #[test]
    fn test_declared_descriptor_roundtrips() {
        let info_ptr = blur_fixture::GET_PLUGIN_INFO();
        assert!(!info_ptr.is_null());
        // SAFETY: The fixture descriptor is a valid static.
        let info = unsafe { &*info_ptr };
        assert_eq!(unsafe { info.name_str() }, "Blur");
        assert_eq!(unsafe { info.description_str() }, "Box blur filter");
        assert_eq!(info.plugin_type, PLUGIN_TYPE_REPLACE_IMAGE);
        let vars = unsafe { info.vars_slice() };
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].var_type, VAR_TYPE_INT);
        assert_eq!(unsafe { vars[0].default_value.as_int }, 1);
    }

    #[test]
    fn test_empty_vars_slice() {
        let info = PluginInfo {
            name: c"x".as_ptr(),
            description: c"y".as_ptr(),
            plugin_type: PLUGIN_TYPE_PUT_PIXEL,
            vars: std::ptr::null(),
            vars_len: 0,
            icon: [[0; ICON_SIZE]; ICON_SIZE],
        };
        assert!(unsafe { info.vars_slice() }.is_empty());
    }

    #[test]
    fn test_abi_struct_sizes_are_stable() {
        assert_eq!(std::mem::size_of::<Color>(), 4);
        assert_eq!(std::mem::size_of::<LColor>(), 16);
        assert_eq!(std::mem::size_of::<PixelPos>(), 8);
    }
}
