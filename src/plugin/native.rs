//! Native plugin libraries.
//!
//! A package directory may ship a dynamic library named after the package
//! (`libi3_bar.so` for `i3-bar` on Linux). The library exports two symbols,
//! generated by [`export_plugin!`](crate::export_plugin):
//!
//! - `_configcore_plugin_api_version() -> u32`
//! - `_configcore_plugin_create() -> *mut dyn LoadablePlugin`
//!
//! The library must be built with the same compiler as the host.

#![allow(unsafe_code)]

use std::path::{Path, PathBuf};

use libloading::Library;

use super::host::{EditorFactory, LoadablePlugin};
use super::{PluginError, PluginResult, PLUGIN_API_VERSION};

/// Library file name for a package directory name.
pub fn library_file_name(package: &str) -> String {
    format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        package.replace('-', "_"),
        std::env::consts::DLL_SUFFIX
    )
}

/// The library path inside a package directory, if present.
pub fn find_library(dir: &Path) -> Option<PathBuf> {
    let name = dir.file_name()?.to_str()?;
    let path = dir.join(library_file_name(name));
    path.is_file().then_some(path)
}

/// Whether a file looks like a dynamic library.
pub fn is_library(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|ext| {
        std::env::consts::DLL_EXTENSION.eq_ignore_ascii_case(ext)
    })
}

/// A plugin instance created by a native library.
pub struct NativePlugin {
    // Field order matters: the instance must be dropped before its library.
    instance: Box<dyn LoadablePlugin>,
    _library: Library,
    path: PathBuf,
}

impl NativePlugin {
    /// Load a library and create its plugin instance.
    pub fn load(path: &Path) -> PluginResult<Self> {
        // SAFETY: loading runs the library's initializers. Libraries come
        // from the user's package store or working directory.
        let library = unsafe { Library::new(path) }
            .map_err(|e| PluginError::LoadError(format!("{}: {e}", path.display())))?;

        // SAFETY: the symbol signature is fixed by `export_plugin!`.
        let api_version_fn: libloading::Symbol<extern "C" fn() -> u32> =
            unsafe { library.get(b"_configcore_plugin_api_version") }
                .map_err(|e| PluginError::LoadError(format!("{}: {e}", path.display())))?;

        let found = api_version_fn();
        if found != PLUGIN_API_VERSION {
            return Err(PluginError::LoadError(format!(
                "{}: plugin API version {found}, expected {PLUGIN_API_VERSION}",
                path.display()
            )));
        }

        // SAFETY: as above.
        #[allow(improper_ctypes_definitions)]
        let create_fn: libloading::Symbol<extern "C" fn() -> *mut dyn LoadablePlugin> =
            unsafe { library.get(b"_configcore_plugin_create") }
                .map_err(|e| PluginError::LoadError(format!("{}: {e}", path.display())))?;

        let raw = create_fn();
        if raw.is_null() {
            return Err(PluginError::LoadError(format!(
                "{}: plugin constructor returned null",
                path.display()
            )));
        }

        // SAFETY: the pointer comes from `Box::into_raw` in `export_plugin!`.
        let instance = unsafe { Box::from_raw(raw) };

        tracing::debug!(path = %path.display(), plugin = instance.name(), "Native plugin loaded");
        Ok(Self { instance, _library: library, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LoadablePlugin for NativePlugin {
    fn name(&self) -> &str {
        self.instance.name()
    }

    fn editor_factory(&self) -> Option<&dyn EditorFactory> {
        self.instance.editor_factory()
    }
}

/// Export a plugin type from a native library.
///
/// The type must implement [`LoadablePlugin`] and `Default`.
#[macro_export]
macro_rules! export_plugin {
    ($plugin_type:ty) => {
        #[no_mangle]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn _configcore_plugin_create() -> *mut dyn $crate::plugin::LoadablePlugin {
            let plugin: Box<dyn $crate::plugin::LoadablePlugin> =
                Box::new(<$plugin_type>::default());
            Box::into_raw(plugin)
        }

        #[no_mangle]
        pub extern "C" fn _configcore_plugin_api_version() -> u32 {
            $crate::plugin::PLUGIN_API_VERSION
        }
    };
}
