//! Error types for the editor core.

use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for editor-session operations.
///
/// Plugin loading has its own containment boundary and error type
/// ([`crate::plugin::PluginError`]); loader failures are skipped and
/// logged during discovery and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// An operation needed a loaded image and none was present.
    #[error("no image loaded")]
    NoImage,

    /// Image decode or encode failure.
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
