//! Plugin root discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Whether a root is a package directory or a single module file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Directory,
    File,
}

/// Where a root was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootOrigin {
    /// The development `plugins` directory in the working directory.
    LocalPlugins,
    /// An installed package in the store.
    Store,
    /// A single-file module in the working directory.
    WorkingDir,
}

impl std::fmt::Display for RootOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalPlugins => write!(f, "local"),
            Self::Store => write!(f, "store"),
            Self::WorkingDir => write!(f, "cwd"),
        }
    }
}

/// A location plugins may be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginRoot {
    pub path: PathBuf,
    pub kind: RootKind,
    pub origin: RootOrigin,
}

impl PluginRoot {
    /// Name used for the root: the directory name, or the file stem.
    pub fn name(&self) -> String {
        let name = match self.kind {
            RootKind::Directory => self.path.file_name(),
            RootKind::File => self.path.file_stem(),
        };
        name.map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }
}

/// Finds plugin roots in the working directory and the package store.
#[derive(Debug, Clone)]
pub struct PluginPathResolver {
    working_dir: PathBuf,
    store_root: PathBuf,
    local_dir: String,
    file_suffix: String,
}

impl PluginPathResolver {
    pub fn new(working_dir: impl Into<PathBuf>, store_root: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            store_root: store_root.into(),
            local_dir: "plugins".to_string(),
            file_suffix: "_plugin.json".to_string(),
        }
    }

    /// Override the development directory name.
    #[must_use]
    pub fn with_local_dir(mut self, name: impl Into<String>) -> Self {
        self.local_dir = name.into();
        self
    }

    /// Override the single-file module suffix.
    #[must_use]
    pub fn with_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    pub fn store_root(&self) -> &Path {
        &self.store_root
    }

    /// Resolve every root, de-duplicated, in discovery order.
    pub fn resolve(&self) -> Vec<PluginRoot> {
        let mut candidates = Vec::new();

        let local = self.working_dir.join(&self.local_dir);
        if local.is_dir() {
            candidates.push(PluginRoot {
                path: local,
                kind: RootKind::Directory,
                origin: RootOrigin::LocalPlugins,
            });
        }

        for path in sorted_entries(&self.store_root, |p, name| p.is_dir() && !name.starts_with('.')) {
            candidates.push(PluginRoot { path, kind: RootKind::Directory, origin: RootOrigin::Store });
        }

        let suffix = self.file_suffix.as_str();
        for path in sorted_entries(&self.working_dir, |p, name| p.is_file() && name.ends_with(suffix)) {
            candidates.push(PluginRoot { path, kind: RootKind::File, origin: RootOrigin::WorkingDir });
        }

        let mut seen = HashSet::new();
        let roots: Vec<_> =
            candidates.into_iter().filter(|root| seen.insert(identity(&root.path))).collect();

        tracing::debug!(count = roots.len(), "Resolved plugin roots");
        roots
    }
}

fn sorted_entries(dir: &Path, keep: impl Fn(&Path, &str) -> bool) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.file_name().and_then(|n| n.to_str()).is_some_and(|name| keep(p, name)))
        .collect();
    paths.sort();
    paths
}

fn identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()))
}
