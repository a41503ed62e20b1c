//! Dynamic plugin loading using libloading.

use crate::buffer::ImageBuffer;
use crate::config::ICON_COLOR;
use crate::plugin::abi::{
    self, Color, EditorState, ICON_SIZE, PixelPos, PluginInfo, PluginInfoFn, PutPixelFn, RawImage,
    ReplaceImageFn,
};
use crate::plugin::params::{ParamBuffer, VarKind, VarSpec, VarValue};
use crate::surface::{TextureHandle, TextureUploader};
use libloading::{Library, Symbol};
use std::ffi::{CStr, c_void};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading a plugin module.
///
/// All of these are recoverable: discovery skips the offending
/// candidate and moves on. The one unrecoverable condition, an
/// unrecognized variable type in a plugin's declared metadata, aborts
/// the process instead, since it signals a binary-incompatible module
/// that cannot be safely sized or invoked.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Failed to open the shared library.
    #[error("failed to load library: {0}")]
    LoadFailed(String),

    /// The module doesn't export the mandatory info accessor.
    #[error("missing plugin entry point: GET_PLUGIN_INFO")]
    MissingInfoSymbol,

    /// The info accessor returned a null descriptor.
    #[error("plugin returned null info")]
    NullInfo,

    /// The descriptor declared a plugin type this host doesn't know.
    #[error("unknown plugin type: {0}")]
    UnknownPluginType(i32),

    /// The type-specific callback export is missing.
    #[error("missing callback symbol: {0}")]
    MissingCallback(&'static str),

    /// The display surface refused the icon texture.
    #[error("icon upload failed: {0}")]
    IconUpload(String),
}

/// What a plugin does, resolved once at load time from its descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    /// Computes one color per position; used by per-pixel tools.
    PutPixel,
    /// Mutates the whole image in place; used by filters.
    ReplaceImage,
}

/// The resolved callback, discriminated by the plugin's declared type.
#[derive(Clone, Copy)]
pub enum PluginCallback {
    /// Per-pixel callback.
    PutPixel(PutPixelFn),
    /// Whole-image callback.
    ReplaceImage(ReplaceImageFn),
}

/// Safe, host-owned copy of a plugin's descriptor.
#[derive(Debug, Clone)]
pub struct PluginMeta {
    /// Plugin name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Plugin kind.
    pub kind: PluginKind,
    /// Declared variables (replace-image plugins only).
    pub vars: Vec<VarSpec>,
}

/// A loaded, validated plugin.
///
/// Holds the shared library open for its own lifetime. Host-owned
/// resources (the parameter buffer) are declared before the library
/// handle so they are freed before the module is closed on drop; the
/// icon texture lives in the display surface and is released by
/// [`PluginRegistry::teardown`](crate::plugin::PluginRegistry::teardown).
pub struct Plugin {
    meta: PluginMeta,
    callback: PluginCallback,
    params: Option<ParamBuffer>,
    icon: TextureHandle,
    /// Kept alive so the cached function pointers stay valid. Must be
    /// the last field: host-owned buffers above free first on drop.
    _library: Library,
}

impl Plugin {
    /// Plugin metadata.
    pub fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    /// Plugin name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Plugin kind.
    pub fn kind(&self) -> PluginKind {
        self.meta.kind
    }

    /// Icon texture handle.
    pub fn icon(&self) -> TextureHandle {
        self.icon
    }

    /// The parameter buffer, if this is a replace-image plugin.
    pub fn params(&self) -> Option<&ParamBuffer> {
        self.params.as_ref()
    }

    /// Mutable access to the parameter buffer, for UI editing.
    pub fn params_mut(&mut self) -> Option<&mut ParamBuffer> {
        self.params.as_mut()
    }

    /// Seed the parameter buffer with the declared defaults.
    pub fn apply_default_params(&mut self) {
        let Self { meta, params, .. } = self;
        if let Some(buf) = params.as_mut() {
            buf.apply_defaults(&meta.vars);
        }
    }

    /// Invoke the per-pixel callback.
    ///
    /// Returns `None` for replace-image plugins.
    pub fn put_pixel(&self, state: EditorState, pos: PixelPos) -> Option<Color> {
        match self.callback {
            // SAFETY: The callback was resolved and validated at load
            // time and the module stays loaded for self's lifetime.
            PluginCallback::PutPixel(callback) => Some(unsafe { callback(state, pos) }),
            PluginCallback::ReplaceImage(_) => None,
        }
    }

    /// Invoke the whole-image callback, lending the image buffer and
    /// the parameter buffer for the duration of the call.
    ///
    /// Returns `false` without calling anything for put-pixel plugins
    /// or when no image is loaded.
    pub fn replace_image(&mut self, state: EditorState, image: &mut ImageBuffer) -> bool {
        let PluginCallback::ReplaceImage(callback) = self.callback else {
            return false;
        };
        if !image.is_loaded() {
            return false;
        }
        let raw = RawImage {
            data: image.as_mut_ptr(),
            width: image.width(),
            height: image.height(),
            channels: image.channels(),
        };
        let params = self
            .params
            .as_mut()
            .map_or(std::ptr::null_mut(), |buf| buf.as_mut_ptr());
        // SAFETY: The callback was resolved and validated at load time;
        // `raw` and `params` point into live host-owned buffers that
        // outlive this synchronous call.
        unsafe { callback(state, raw, params as *mut c_void) };
        true
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.meta.name)
            .field("kind", &self.meta.kind)
            .field("vars", &self.meta.vars.len())
            .finish()
    }
}

/// Load and validate the plugin module at `path`.
///
/// Runs the full validation sequence: open the library, resolve
/// `GET_PLUGIN_INFO`, reject a null descriptor, resolve the
/// kind-specific callback, read the safe metadata, allocate the
/// zero-initialized parameter buffer (replace-image only), and upload
/// the icon. Any failure unwinds completely (the library closes when
/// the local handle drops), so no partial registration can escape.
///
/// # Safety
///
/// Loading a plugin executes arbitrary code from the shared library.
/// The module must be trusted and must implement the ABI in
/// [`crate::plugin::abi`]: a valid static descriptor, valid
/// NUL-terminated strings, and a callback matching the declared type.
pub unsafe fn load_from_path(
    path: &Path,
    uploader: &mut dyn TextureUploader,
) -> Result<Plugin, PluginError> {
    // SAFETY: Caller ensures the library is trusted.
    let library =
        unsafe { Library::new(path) }.map_err(|e| PluginError::LoadFailed(e.to_string()))?;

    // SAFETY: The library was just loaded; the symbol type matches the ABI.
    let info_fn: PluginInfoFn = unsafe {
        let symbol: Symbol<PluginInfoFn> = library
            .get(abi::INFO_SYMBOL)
            .map_err(|_| PluginError::MissingInfoSymbol)?;
        *symbol
    };

    // SAFETY: Calling the info accessor; caller guarantees the plugin is valid.
    let info_ptr = unsafe { info_fn() };
    if info_ptr.is_null() {
        return Err(PluginError::NullInfo);
    }
    // SAFETY: Non-null and, per the ABI, pointing at a static descriptor.
    let info = unsafe { &*info_ptr };

    let kind = match info.plugin_type {
        abi::PLUGIN_TYPE_PUT_PIXEL => PluginKind::PutPixel,
        abi::PLUGIN_TYPE_REPLACE_IMAGE => PluginKind::ReplaceImage,
        other => return Err(PluginError::UnknownPluginType(other)),
    };

    let callback = match kind {
        PluginKind::PutPixel => {
            // SAFETY: Symbol type matches the ABI callback signature.
            let symbol: Symbol<PutPixelFn> = unsafe {
                library
                    .get(abi::PUT_PIXEL_SYMBOL)
                    .map_err(|_| PluginError::MissingCallback("PLUGIN_PUT_PIXEL"))?
            };
            PluginCallback::PutPixel(*symbol)
        }
        PluginKind::ReplaceImage => {
            // SAFETY: Symbol type matches the ABI callback signature.
            let symbol: Symbol<ReplaceImageFn> = unsafe {
                library
                    .get(abi::REPLACE_IMAGE_SYMBOL)
                    .map_err(|_| PluginError::MissingCallback("PLUGIN_REPLACE_IMAGE"))?
            };
            PluginCallback::ReplaceImage(*symbol)
        }
    };

    // SAFETY: Caller guarantees descriptor strings and the vars array
    // are valid per the ABI.
    let meta = unsafe { read_meta(info, kind) };

    let params = match kind {
        PluginKind::ReplaceImage => Some(ParamBuffer::from_specs(&meta.vars)),
        PluginKind::PutPixel => None,
    };

    let rgba = expand_icon(&info.icon);
    let icon = uploader
        .upload_rgba(ICON_SIZE as u32, ICON_SIZE as u32, &rgba)
        .map_err(|e| PluginError::IconUpload(e.to_string()))?;

    tracing::debug!(name = %meta.name, kind = ?kind, "plugin validated");

    Ok(Plugin {
        meta,
        callback,
        params,
        icon,
        _library: library,
    })
}

/// Read the safe host-side metadata out of a raw descriptor.
///
/// Aborts the process on an unrecognized variable type: the buffer for
/// such a plugin cannot be sized, which means the binary is corrupt or
/// built against an incompatible ABI.
///
/// # Safety
///
/// `info` must be a valid descriptor with valid NUL-terminated strings
/// and a `vars` array matching `vars_len`.
unsafe fn read_meta(info: &PluginInfo, kind: PluginKind) -> PluginMeta {
    // SAFETY: Caller guarantees the descriptor strings are valid.
    let name = unsafe { info.name_str() }.to_string();
    // SAFETY: Caller guarantees the descriptor strings are valid.
    let description = unsafe { info.description_str() }.to_string();

    // Variables are only meaningful for replace-image plugins.
    let mut vars = Vec::new();
    if kind == PluginKind::ReplaceImage {
        // SAFETY: Caller guarantees the vars array matches vars_len.
        for meta in unsafe { info.vars_slice() } {
            let var_kind = match meta.var_type {
                abi::VAR_TYPE_FLOAT => VarKind::Float,
                abi::VAR_TYPE_INT => VarKind::Int,
                abi::VAR_TYPE_BOOL => VarKind::Bool,
                other => {
                    tracing::error!(
                        plugin = %name,
                        var_type = other,
                        "plugin declares an unrecognized variable type; aborting"
                    );
                    std::process::abort();
                }
            };
            // SAFETY: The active union field is selected by the tag we
            // just validated.
            let default = unsafe {
                match var_kind {
                    VarKind::Float => VarValue::Float(meta.default_value.as_float),
                    VarKind::Int => VarValue::Int(meta.default_value.as_int),
                    VarKind::Bool => VarValue::Bool(meta.default_value.as_bool),
                }
            };
            vars.push(VarSpec {
                // SAFETY: Caller guarantees the variable strings are valid.
                name: unsafe { cstr_or(meta.name, "unnamed") },
                // SAFETY: Caller guarantees the variable strings are valid.
                description: unsafe { cstr_or(meta.description, "") },
                kind: var_kind,
                default,
                range: meta.range,
            });
        }
    }

    PluginMeta {
        name,
        description,
        kind,
        vars,
    }
}

/// Read a possibly-null C string, falling back to `fallback`.
///
/// # Safety
///
/// `ptr` must be null or a valid NUL-terminated string.
unsafe fn cstr_or(ptr: *const std::ffi::c_char, fallback: &str) -> String {
    if ptr.is_null() {
        return fallback.to_string();
    }
    // SAFETY: Caller guarantees `ptr` is valid and NUL-terminated.
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .unwrap_or(fallback)
        .to_string()
}

/// Expand the 32x32 grayscale icon bitmap into RGBA pixels: non-zero
/// cells become the fixed icon color, zero cells fully transparent.
pub(crate) fn expand_icon(bitmap: &[[u8; ICON_SIZE]; ICON_SIZE]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(ICON_SIZE * ICON_SIZE * 4);
    for row in bitmap {
        for &cell in row {
            if cell != 0 {
                rgba.extend_from_slice(&[ICON_COLOR.r, ICON_COLOR.g, ICON_COLOR.b, ICON_COLOR.a]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    rgba
}
