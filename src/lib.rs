//! # Imkur
//!
//! Core engine for a plugin-extensible raster image editor.
//!
//! The crate owns everything below the window: the RGBA image buffer,
//! the native plugin ABI and its loader, the drawing engine (brush
//! rasterization, stroke interpolation, coordinate transforms), and the
//! editor session that ties them together. The GUI toolkit, event loop,
//! and file dialogs are external collaborators; they reach the engine
//! through [`editor::Editor`] and the [`surface::TextureUploader`]
//! boundary.
//!
//! ## Plugins
//!
//! A plugin is a shared library (`.so`/`.dylib`/`.dll`) exporting a
//! `GET_PLUGIN_INFO` entry point and, depending on the declared type,
//! either `PLUGIN_PUT_PIXEL` (per-pixel tools) or `PLUGIN_REPLACE_IMAGE`
//! (whole-image filters). See [`plugin::abi`] for the binary contract
//! and the [`declare_plugin!`] macro for authoring plugins in Rust.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use imkur::prelude::*;
//!
//! let mut uploader = /* display-surface texture uploader */;
//! let registry = unsafe { PluginRegistry::discover("plugins".as_ref(), &mut uploader) };
//!
//! let mut editor = Editor::new();
//! editor.load_image("input.png".as_ref())?;
//! editor.apply_box_average(2)?;
//! editor.save_image("output.png".as_ref())?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod buffer;
pub mod codec;
pub mod config;
pub mod draw;
pub mod editor;
pub mod error;
pub mod filter;
pub mod geom;
pub mod plugin;
pub mod surface;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::buffer::ImageBuffer;
    pub use crate::editor::{Brush, Editor};
    pub use crate::error::{Error, Result};
    pub use crate::geom::Vec2;
    pub use crate::plugin::{Plugin, PluginError, PluginKind, PluginRegistry};
    pub use crate::surface::{TextureHandle, TextureUploader};
}

pub use error::{Error, Result};
