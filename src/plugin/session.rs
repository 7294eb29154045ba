//! Plugin host session.
//!
//! A session owns the plugins hosted during one reload cycle. Each reload
//! throws the previous set away, resolves roots again, gates installed
//! packages on their manifests and builds an editor for every module that
//! offers one.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use super::compat::is_compatible;
use super::host::{DisabledEditor, EditorComponent, LoadablePlugin};
use super::loader::{panic_message, DynamicLoader};
use super::manifest::{read_local, Manifest};
use super::resolver::{PluginPathResolver, PluginRoot, RootKind, RootOrigin};
use super::widgets::ActionOutcome;
use super::{PluginError, PluginResult};
use crate::core::SharedDocument;

/// Lifecycle of a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Resolving,
    PerRootEvaluation,
    Ready,
}

/// A loaded module and the editor it built.
pub struct ActivePlugin {
    // Dropped in declaration order: the editor goes before its module.
    editor: Box<dyn EditorComponent>,
    module: Box<dyn LoadablePlugin>,
    root: PluginRoot,
}

impl ActivePlugin {
    pub fn editor(&self) -> &dyn EditorComponent {
        self.editor.as_ref()
    }

    pub fn module_name(&self) -> &str {
        self.module.name()
    }

    pub fn root(&self) -> &PluginRoot {
        &self.root
    }
}

/// A plugin occupying a slot in the host.
pub enum HostedPlugin {
    /// Loaded and instantiated.
    Active(ActivePlugin),
    /// An installed package that failed the compatibility gate.
    Disabled {
        name: String,
        manifest: Manifest,
        root: PluginRoot,
        placeholder: DisabledEditor,
    },
}

impl HostedPlugin {
    /// Tab title.
    pub fn title(&self) -> &str {
        match self {
            Self::Active(plugin) => plugin.editor.title(),
            Self::Disabled { name, .. } => name,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled { .. })
    }

    pub fn root(&self) -> &PluginRoot {
        match self {
            Self::Active(plugin) => &plugin.root,
            Self::Disabled { root, .. } => root,
        }
    }

    /// The editor shown for this slot.
    pub fn editor(&self) -> &dyn EditorComponent {
        match self {
            Self::Active(plugin) => plugin.editor.as_ref(),
            Self::Disabled { placeholder, .. } => placeholder,
        }
    }

    fn editor_mut(&mut self) -> &mut dyn EditorComponent {
        match self {
            Self::Active(plugin) => plugin.editor.as_mut(),
            Self::Disabled { placeholder, .. } => placeholder,
        }
    }
}

/// A root that produced no plugin, and why.
#[derive(Debug, Clone)]
pub struct RootFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of one reload.
#[derive(Debug, Clone, Default)]
pub struct ReloadReport {
    /// Plugins loaded and instantiated.
    pub loaded: usize,
    /// Roots the resolver produced.
    pub roots_considered: usize,
    /// Packages disabled by the compatibility gate.
    pub disabled: Vec<String>,
    /// Roots that failed to load or instantiate.
    pub failures: Vec<RootFailure>,
}

impl std::fmt::Display for ReloadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Loaded {} plugin(s) from {} root(s)", self.loaded, self.roots_considered)?;
        if !self.disabled.is_empty() {
            write!(f, ", {} incompatible", self.disabled.len())?;
        }
        if !self.failures.is_empty() {
            write!(f, ", {} failed", self.failures.len())?;
        }
        Ok(())
    }
}

/// Hosts the plugins of the running application.
pub struct PluginHostSession {
    resolver: PluginPathResolver,
    loader: DynamicLoader,
    host_version: String,
    state: SessionState,
    plugins: Vec<HostedPlugin>,
}

impl PluginHostSession {
    pub fn new(resolver: PluginPathResolver, host_version: impl Into<String>) -> Self {
        Self {
            resolver,
            loader: DynamicLoader::new(),
            host_version: host_version.into(),
            state: SessionState::Idle,
            plugins: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn host_version(&self) -> &str {
        &self.host_version
    }

    pub fn plugins(&self) -> &[HostedPlugin] {
        &self.plugins
    }

    pub fn get(&self, index: usize) -> Option<&HostedPlugin> {
        self.plugins.get(index)
    }

    /// Find a hosted plugin by tab title or root name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.plugins.iter().position(|p| p.title() == name || p.root().name() == name)
    }

    /// Discard hosted plugins and load everything again.
    pub fn reload(&mut self, document: Option<SharedDocument>) -> ReloadReport {
        self.plugins.clear();
        self.state = SessionState::Resolving;

        let roots = self.resolver.resolve();
        let mut report = ReloadReport { roots_considered: roots.len(), ..ReloadReport::default() };

        self.state = SessionState::PerRootEvaluation;
        for root in roots {
            if root.origin == RootOrigin::Store && root.kind == RootKind::Directory {
                let manifest = read_local(&root.path).into_manifest();
                if !is_compatible(&manifest, &self.host_version) {
                    let name = root.name();
                    tracing::info!(package = %name, host = %self.host_version, "Package disabled: incompatible");
                    report.disabled.push(name.clone());
                    self.plugins.push(HostedPlugin::Disabled {
                        placeholder: DisabledEditor::new(&name, &self.host_version),
                        name,
                        manifest,
                        root,
                    });
                    continue;
                }
            }

            match self.instantiate(&root, document.clone()) {
                Ok(Some(plugin)) => {
                    report.loaded += 1;
                    self.plugins.push(HostedPlugin::Active(plugin));
                }
                Ok(None) => {}
                Err(e) => report.failures.push(RootFailure { path: root.path.clone(), error: e.to_string() }),
            }
        }

        self.state = SessionState::Ready;
        tracing::info!(
            loaded = report.loaded,
            roots = report.roots_considered,
            disabled = report.disabled.len(),
            failed = report.failures.len(),
            "Plugins reloaded"
        );
        report
    }

    fn instantiate(
        &self,
        root: &PluginRoot,
        document: Option<SharedDocument>,
    ) -> PluginResult<Option<ActivePlugin>> {
        let module = self.loader.load(root)?;

        let Some(factory) = module.editor_factory() else {
            tracing::debug!(path = %root.path.display(), "Module has no editor entry point, skipping");
            return Ok(None);
        };

        let built = catch_unwind(AssertUnwindSafe(|| factory.build(document)));
        let editor = match built {
            Ok(Ok(editor)) => editor,
            Ok(Err(e)) => {
                tracing::warn!(path = %root.path.display(), error = %e, "Failed to instantiate plugin editor");
                return Err(e);
            }
            Err(panic) => {
                let message = panic_message(&panic);
                tracing::warn!(path = %root.path.display(), panic = %message, "Plugin editor panicked");
                return Err(PluginError::Instantiation(message));
            }
        };

        Ok(Some(ActivePlugin { editor, module, root: root.clone() }))
    }

    /// Press widget `widget_index` of the plugin at `plugin_index`.
    pub fn activate(&mut self, plugin_index: usize, widget_index: usize) -> PluginResult<ActionOutcome> {
        let plugin = self.plugins.get_mut(plugin_index).ok_or_else(|| {
            PluginError::ExecutionError(format!("no plugin at index {plugin_index}"))
        })?;

        let editor = plugin.editor_mut();
        catch_unwind(AssertUnwindSafe(|| editor.press(widget_index))).unwrap_or_else(|panic| {
            Err(PluginError::ExecutionError(format!("plugin panicked: {}", panic_message(&panic))))
        })
    }

    /// Drop every hosted plugin.
    pub fn clear(&mut self) {
        self.plugins.clear();
        self.state = SessionState::Idle;
    }
}
