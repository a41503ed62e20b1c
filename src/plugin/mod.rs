//! Plugin system: binary contract, loading, and registry.
//!
//! Plugins are native shared libraries discovered in a configured
//! directory, validated against the ABI in [`abi`], and held in an
//! ordered [`PluginRegistry`]. Two kinds exist: put-pixel plugins
//! compute one color per position (per-pixel tools), replace-image
//! plugins mutate the whole buffer in place (filters) and may expose
//! tunable parameters through the host-owned [`params::ParamBuffer`].
//!
//! All loading failures are contained here: a bad candidate is logged
//! and skipped, never escalated. See [`loader::PluginError`] for the
//! taxonomy.

pub mod abi;
pub mod loader;
pub mod params;
pub mod registry;

pub use loader::{Plugin, PluginCallback, PluginError, PluginKind, PluginMeta};
pub use params::{ParamBuffer, VarKind, VarSpec, VarValue};
pub use registry::{MODULE_EXTENSION, PluginRegistry};
