//! Turns plugin roots into loaded plugin modules.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use super::host::LoadablePlugin;
use super::resolver::{PluginRoot, RootKind};
use super::widgets::{ModuleDocument, ScriptedPlugin};
use super::{PluginError, PluginResult};

/// Conventional editor entry file of a package directory.
pub const EDITOR_ENTRY_FILE: &str = "editor.json";

/// Loads plugin modules from directories and files.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicLoader;

impl DynamicLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a module from a root. Every failure, including a panic, is a
    /// [`PluginError::LoadError`].
    pub fn load(&self, root: &PluginRoot) -> PluginResult<Box<dyn LoadablePlugin>> {
        let result = catch_unwind(AssertUnwindSafe(|| match root.kind {
            RootKind::Directory => self.load_directory(&root.path),
            RootKind::File => self.load_file(&root.path),
        }));

        let result = match result {
            Ok(result) => result,
            Err(panic) => Err(PluginError::LoadError(format!(
                "{}: panicked while loading: {}",
                root.path.display(),
                panic_message(&panic)
            ))),
        };

        result.map_err(|e| {
            tracing::warn!(path = %root.path.display(), error = %e, "Failed to load plugin");
            match e {
                PluginError::LoadError(_) => e,
                other => PluginError::LoadError(format!("{}: {other}", root.path.display())),
            }
        })
    }

    fn load_directory(&self, dir: &Path) -> PluginResult<Box<dyn LoadablePlugin>> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PluginError::LoadError(format!("{}: no directory name", dir.display())))?;

        #[cfg(feature = "native-plugins")]
        if let Some(library) = super::native::find_library(dir) {
            match super::native::NativePlugin::load(&library) {
                Ok(plugin) => return Ok(Box::new(plugin)),
                Err(e) => {
                    tracing::debug!(path = %library.display(), error = %e, "Native import failed, trying entry files");
                }
            }
        }

        let entry = entry_candidates(dir, &name)
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| {
                PluginError::LoadError(format!("{}: no plugin entry point found", dir.display()))
            })?;

        load_module(&entry, &name)
    }

    fn load_file(&self, path: &Path) -> PluginResult<Box<dyn LoadablePlugin>> {
        #[cfg(feature = "native-plugins")]
        if super::native::is_library(path) {
            return Ok(Box::new(super::native::NativePlugin::load(path)?));
        }

        let name = path.file_stem().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        load_module(path, &name)
    }
}

/// Entry files tried for a package directory, in order.
pub fn entry_candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![
        dir.join(EDITOR_ENTRY_FILE),
        dir.join(format!("{name}_plugin.json")),
        dir.join("plugin.json"),
    ]
}

fn load_module(path: &Path, name: &str) -> PluginResult<Box<dyn LoadablePlugin>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PluginError::LoadError(format!("{}: {e}", path.display())))?;
    let module = ModuleDocument::from_json(&text)
        .map_err(|e| PluginError::LoadError(format!("{}: {e}", path.display())))?;

    tracing::debug!(path = %path.display(), "Module loaded");
    Ok(Box::new(ScriptedPlugin::new(name, module)))
}

pub(crate) fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::resolver::RootOrigin;
    use tempfile::TempDir;

    const MODULE: &str = r#"{"editor": {"widgets": [{"type": "label", "label": "hi"}]}}"#;

    fn dir_root(path: &Path) -> PluginRoot {
        PluginRoot { path: path.to_path_buf(), kind: RootKind::Directory, origin: RootOrigin::Store }
    }

    #[test]
    fn test_entry_file_order() {
        let temp_dir = TempDir::new().unwrap();
        let pkg = temp_dir.path().join("demo");
        std::fs::create_dir(&pkg).unwrap();
        std::fs::write(pkg.join("plugin.json"), r#"{"name": "from-manifest"}"#).unwrap();
        std::fs::write(pkg.join("demo_plugin.json"), r#"{"name": "from-named", "editor": {}}"#).unwrap();

        let plugin = DynamicLoader::new().load(&dir_root(&pkg)).unwrap();
        assert_eq!(plugin.name(), "from-named");
        assert!(plugin.editor_factory().is_some());

        std::fs::write(pkg.join("editor.json"), MODULE).unwrap();
        let plugin = DynamicLoader::new().load(&dir_root(&pkg)).unwrap();
        assert_eq!(plugin.name(), "demo");
    }

    #[test]
    fn test_manifest_without_editor_loads_without_capability() {
        let temp_dir = TempDir::new().unwrap();
        let pkg = temp_dir.path().join("meta-only");
        std::fs::create_dir(&pkg).unwrap();
        std::fs::write(pkg.join("plugin.json"), r#"{"name": "meta-only", "version": "1"}"#).unwrap();

        let plugin = DynamicLoader::new().load(&dir_root(&pkg)).unwrap();
        assert!(plugin.editor_factory().is_none());
    }

    #[test]
    fn test_empty_directory_is_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = DynamicLoader::new().load(&dir_root(temp_dir.path()));
        assert!(matches!(result, Err(PluginError::LoadError(_))));
    }

    #[test]
    fn test_invalid_module_is_load_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("bad_plugin.json");
        std::fs::write(&file, "{ nope").unwrap();

        let root = PluginRoot { path: file, kind: RootKind::File, origin: RootOrigin::WorkingDir };
        let result = DynamicLoader::new().load(&root);
        assert!(matches!(result, Err(PluginError::LoadError(_))));
    }

    #[test]
    fn test_file_root_uses_stem_as_name() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("gaps_plugin.json");
        std::fs::write(&file, MODULE).unwrap();

        let root = PluginRoot { path: file, kind: RootKind::File, origin: RootOrigin::WorkingDir };
        let plugin = DynamicLoader::new().load(&root).unwrap();
        assert_eq!(plugin.name(), "gaps_plugin");
    }

    #[test]
    fn test_panic_message() {
        let panic = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(&panic), "boom");
    }
}
