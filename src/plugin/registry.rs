//! Plugin discovery and registry.

use super::loader::{self, Plugin};
use crate::surface::TextureUploader;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Native dynamic-library extension for this platform.
#[cfg(target_os = "macos")]
pub const MODULE_EXTENSION: &str = "dylib";
/// Native dynamic-library extension for this platform.
#[cfg(target_os = "windows")]
pub const MODULE_EXTENSION: &str = "dll";
/// Native dynamic-library extension for this platform.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const MODULE_EXTENSION: &str = "so";

/// Ordered collection of loaded plugins.
///
/// Built once at session start and read-only afterwards. Order is
/// discovery order and carries no priority or override semantics.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<Plugin>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover and load every valid plugin module under `dir`.
    ///
    /// Candidates are regular files with the platform's native
    /// dynamic-library extension. A candidate that fails any validation
    /// step is fully unwound, logged, and skipped; one bad module
    /// never aborts the rest of discovery. A missing or unreadable
    /// directory yields an empty registry.
    ///
    /// # Safety
    ///
    /// Loading plugins executes code from shared libraries. Every
    /// module in `dir` must be trusted. See
    /// [`loader::load_from_path`] for the per-module requirements.
    pub unsafe fn discover(dir: &Path, uploader: &mut dyn TextureUploader) -> Self {
        let mut registry = Self::new();
        for path in module_candidates(dir) {
            tracing::debug!(path = %path.display(), "loading plugin candidate");
            // SAFETY: Caller guarantees modules in `dir` are trusted.
            match unsafe { loader::load_from_path(&path, uploader) } {
                Ok(plugin) => {
                    tracing::info!(name = %plugin.name(), path = %path.display(), "plugin loaded");
                    registry.plugins.push(plugin);
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "skipping plugin");
                }
            }
        }
        registry
    }

    /// All loaded plugins, in discovery order.
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Plugin at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Plugin> {
        self.plugins.get(index)
    }

    /// Mutable plugin at `index`, for parameter editing and filter
    /// invocation.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Plugin> {
        self.plugins.get_mut(index)
    }

    /// Number of loaded plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Release every plugin.
    ///
    /// Icon textures are released through the display surface first;
    /// each plugin then drops its host-owned parameter buffer before
    /// its module handle closes.
    pub fn teardown(self, uploader: &mut dyn TextureUploader) {
        for plugin in &self.plugins {
            tracing::debug!(name = %plugin.name(), "unloading plugin");
            uploader.release(plugin.icon());
        }
        drop(self.plugins);
    }
}

/// List candidate module files under `dir`: regular files whose
/// extension matches the platform dynamic-library extension.
fn module_candidates(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(dir = %dir.display(), error = %e, "no plugins directory");
            return Vec::new();
        }
    };

    let mut candidates = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && path.extension() == Some(OsStr::new(MODULE_EXTENSION)) {
            candidates.push(path);
        }
    }
    candidates
}
