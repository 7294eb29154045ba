//! Package builder.
//!
//! Authors describe a plugin as a list of widgets plus optional helper
//! scripts. The builder previews the editor without touching any document
//! and exports a package directory the store and loader understand.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::loader::EDITOR_ENTRY_FILE;
use super::manifest::PackageManifest;
use super::widgets::{DeclarativeEditor, ModuleDocument, UiSpec, WidgetSpec};
use super::{PluginError, PluginResult};

/// Minimum core version stamped into exported manifests.
pub const DEFAULT_MIN_CORE_VERSION: &str = "0.2.0";

/// Builds and exports a declarative plugin package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageBuilder {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    /// Defaults to "Auto-generated plugin {name}" when empty.
    #[serde(default)]
    pub description: String,

    #[serde(default = "default_min_core_version")]
    pub min_core_version: String,

    #[serde(default)]
    pub widgets: Vec<WidgetSpec>,

    /// Files or directories copied into `scripts/`.
    #[serde(default)]
    pub scripts: Vec<PathBuf>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_min_core_version() -> String {
    DEFAULT_MIN_CORE_VERSION.to_string()
}

impl PackageBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            description: String::new(),
            min_core_version: default_min_core_version(),
            widgets: Vec::new(),
            scripts: Vec::new(),
        }
    }

    /// Load a builder from a TOML file. Relative script paths are resolved
    /// against the file's directory.
    pub fn from_toml_file(path: &Path) -> PluginResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut builder: Self =
            toml::from_str(&content).map_err(|e| PluginError::Config(e.to_string()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for script in &mut builder.scripts {
            if script.is_relative() {
                *script = base.join(&*script);
            }
        }

        Ok(builder)
    }

    pub fn add_widget(&mut self, widget: WidgetSpec) -> &mut Self {
        self.widgets.push(widget);
        self
    }

    pub fn replace_widget(&mut self, index: usize, widget: WidgetSpec) -> PluginResult<()> {
        let slot = self.widgets.get_mut(index).ok_or_else(|| out_of_range(index))?;
        *slot = widget;
        Ok(())
    }

    pub fn remove_widget(&mut self, index: usize) -> PluginResult<WidgetSpec> {
        if index >= self.widgets.len() {
            return Err(out_of_range(index));
        }
        Ok(self.widgets.remove(index))
    }

    /// Move a widget one place up. Returns its new index.
    pub fn move_up(&mut self, index: usize) -> usize {
        if index > 0 && index < self.widgets.len() {
            self.widgets.swap(index, index - 1);
            index - 1
        } else {
            index
        }
    }

    /// Move a widget one place down. Returns its new index.
    pub fn move_down(&mut self, index: usize) -> usize {
        if index + 1 < self.widgets.len() {
            self.widgets.swap(index, index + 1);
            index + 1
        } else {
            index
        }
    }

    pub fn add_script(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.scripts.push(path.into());
        self
    }

    pub fn remove_script(&mut self, index: usize) -> Option<PathBuf> {
        (index < self.scripts.len()).then(|| self.scripts.remove(index))
    }

    fn description(&self) -> String {
        if self.description.is_empty() {
            format!("Auto-generated plugin {}", self.name)
        } else {
            self.description.clone()
        }
    }

    fn ui(&self) -> UiSpec {
        UiSpec { widgets: self.widgets.clone(), ..UiSpec::default() }
    }

    /// The manifest written as `plugin.json`.
    pub fn manifest(&self) -> PackageManifest {
        PackageManifest {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description(),
            min_core_version: self.min_core_version.clone(),
            ui: self.ui(),
        }
    }

    /// The module written as `editor.json`.
    pub fn module(&self) -> ModuleDocument {
        ModuleDocument {
            name: Some(self.name.clone()),
            version: Some(self.version.clone()),
            generated_by: Some(format!("{} {}", crate::APP_NAME, crate::CORE_VERSION)),
            min_core_version: Some(self.min_core_version.clone()),
            editor: Some(self.ui()),
        }
    }

    /// An editor over the current widgets, bound to no document.
    pub fn preview(&self) -> DeclarativeEditor {
        DeclarativeEditor::new(self.name.clone(), &self.ui(), None)
    }

    /// Write only the manifest.
    pub fn save_manifest(&self, path: &Path) -> PluginResult<()> {
        std::fs::write(path, self.manifest().to_json()?)?;
        Ok(())
    }

    /// Export the package to `{base_dir}/{name}`.
    pub fn export(&self, base_dir: &Path, overwrite: bool) -> PluginResult<PathBuf> {
        self.validate()?;

        let dir = base_dir.join(&self.name);
        if dir.exists() {
            if !overwrite {
                return Err(PluginError::AlreadyExists(dir));
            }
            std::fs::remove_dir_all(&dir)?;
        }
        std::fs::create_dir_all(&dir)?;

        self.save_manifest(&dir.join("plugin.json"))?;
        std::fs::write(dir.join(EDITOR_ENTRY_FILE), self.module().to_json()?)?;

        if !self.scripts.is_empty() {
            let scripts_dir = dir.join("scripts");
            std::fs::create_dir_all(&scripts_dir)?;
            for script in &self.scripts {
                copy_script(script, &scripts_dir)?;
            }
        }

        tracing::info!(package = %self.name, path = %dir.display(), "Package exported");
        Ok(dir)
    }

    fn validate(&self) -> PluginResult<()> {
        if self.name.chars().any(char::is_whitespace) {
            return Err(PluginError::InvalidName(self.name.clone()));
        }
        super::store::validate_name(&self.name)
    }
}

fn out_of_range(index: usize) -> PluginError {
    PluginError::Config(format!("no widget at index {index}"))
}

fn copy_script(source: &Path, scripts_dir: &Path) -> PluginResult<()> {
    let name = source.file_name().ok_or_else(|| PluginError::NotFound(source.to_path_buf()))?;
    if !source.exists() {
        return Err(PluginError::NotFound(source.to_path_buf()));
    }

    if source.is_file() {
        std::fs::copy(source, scripts_dir.join(name))?;
        return Ok(());
    }

    let target_root = scripts_dir.join(name);
    for entry in WalkDir::new(source).into_iter().filter_map(Result::ok) {
        let Ok(rel) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = target_root.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
