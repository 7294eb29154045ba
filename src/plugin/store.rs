//! Local package store.
//!
//! Every installed package is a directory directly under the store root. The
//! store keeps no registry file: the directory listing is the source of truth
//! and manifests are re-read on every enumeration.

use std::path::{Component, Path, PathBuf};

use super::compat::is_compatible;
use super::manifest::{read_local, Manifest};
use super::{PluginError, PluginResult};

/// An installed package, as seen on disk right now.
#[derive(Debug, Clone)]
pub struct InstalledPackage {
    /// Package name (directory name).
    pub name: String,
    /// Package directory.
    pub path: PathBuf,
    /// Manifest read from the package directory (empty if absent).
    pub manifest: Manifest,
    /// Whether the package passes the compatibility gate.
    pub compatible: bool,
}

/// Manages the package store directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store handle. The directory is not touched.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the store root if missing.
    pub fn ensure(&self) -> PluginResult<()> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    /// Installed package names, sorted.
    ///
    /// A missing store lists as empty. Hidden directories are skipped.
    pub fn list(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();

        names.sort();
        names
    }

    /// Installed packages with their manifests and compatibility.
    pub fn installed(&self, host_version: &str) -> Vec<InstalledPackage> {
        self.list()
            .into_iter()
            .map(|name| {
                let path = self.root.join(&name);
                let manifest = read_local(&path).into_manifest();
                let compatible = is_compatible(&manifest, host_version);
                InstalledPackage { name, path, manifest, compatible }
            })
            .collect()
    }

    /// Path a package is (or would be) installed at.
    pub fn path_of(&self, name: &str) -> PluginResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    /// Whether a package is installed.
    pub fn contains(&self, name: &str) -> bool {
        self.path_of(name).map(|p| p.is_dir()).unwrap_or(false)
    }

    /// Remove a package directory and everything in it.
    pub fn uninstall(&self, name: &str) -> PluginResult<()> {
        let path = self.path_of(name)?;
        if !path.is_dir() {
            return Err(PluginError::NotFound(path));
        }

        std::fs::remove_dir_all(&path)?;
        tracing::info!(package = name, path = %path.display(), "Package uninstalled");
        Ok(())
    }
}

/// Reject names that are not a single plain path component.
pub fn validate_name(name: &str) -> PluginResult<()> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();

    if name.is_empty() || !single_normal || name.contains(['/', '\\']) {
        return Err(PluginError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_package(store: &Path, name: &str, manifest: Option<&str>) {
        let dir = store.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        if let Some(manifest) = manifest {
            std::fs::write(dir.join("plugin.json"), manifest).unwrap();
        }
    }

    #[test]
    fn test_list_missing_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path().join("nope"));
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_list_sorted_dirs_only() {
        let temp_dir = TempDir::new().unwrap();
        create_package(temp_dir.path(), "zeta", None);
        create_package(temp_dir.path(), "alpha", None);
        create_package(temp_dir.path(), ".staging-123", None);
        std::fs::write(temp_dir.path().join("notes.txt"), "x").unwrap();

        let store = LocalStore::new(temp_dir.path());
        assert_eq!(store.list(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_installed_reports_compatibility() {
        let temp_dir = TempDir::new().unwrap();
        create_package(temp_dir.path(), "new", Some(r#"{"min_core_version": "9.0.0"}"#));
        create_package(temp_dir.path(), "old", Some(r#"{"min_core_version": "0.1.0"}"#));
        create_package(temp_dir.path(), "plain", None);

        let store = LocalStore::new(temp_dir.path());
        let installed = store.installed("0.2.0");
        let flags: Vec<_> = installed.iter().map(|p| (p.name.as_str(), p.compatible)).collect();
        assert_eq!(flags, vec![("new", false), ("old", true), ("plain", true)]);
    }

    #[test]
    fn test_uninstall() {
        let temp_dir = TempDir::new().unwrap();
        create_package(temp_dir.path(), "demo", Some("{}"));
        let store = LocalStore::new(temp_dir.path());

        assert!(store.contains("demo"));
        store.uninstall("demo").unwrap();
        assert!(!store.contains("demo"));
        assert!(matches!(store.uninstall("demo"), Err(PluginError::NotFound(_))));
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", ".", "..", "a/b", "../x", "a\\b", "/abs"] {
            assert!(matches!(validate_name(name), Err(PluginError::InvalidName(_))), "{name}");
        }
        assert!(validate_name("i3-bar").is_ok());
        assert!(validate_name("my_pkg.v2").is_ok());
    }
}
