//! Application state and lifecycle management.
//!
//! The `App` struct ties together the configuration, the package store, the
//! plugin host session and the config document being edited. The CLI drives
//! it directly; the TUI adds tab and widget selection on top.

use std::path::{Path, PathBuf};

use crate::core::{find_default_document, Config, ConfigDocument, SharedDocument};
use crate::plugin::{
    ActionOutcome, HostedPlugin, InstalledPackage, LocalStore, PluginError, PluginHostSession,
    PluginPathResolver, PluginResult, ReloadReport,
};
use crate::tui::Theme;

/// Overrides coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Config document to open
    pub document: Option<PathBuf>,
    /// Package store root
    pub store_dir: Option<PathBuf>,
    /// Catalog access token
    pub token: Option<String>,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
}

/// Application modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Browsing plugin tabs
    #[default]
    Normal,

    /// Showing help screen with keyboard shortcuts
    Help,

    /// Quit requested with unsaved document changes
    ConfirmQuit,
}

/// Main application state.
pub struct App {
    /// Current working directory
    pub cwd: PathBuf,

    /// Application configuration
    pub config: Config,

    /// Local package store
    pub store: LocalStore,

    /// Hosted plugins
    pub session: PluginHostSession,

    /// Config document being edited (if any)
    pub document: Option<SharedDocument>,

    /// Current mode of the application
    pub mode: AppMode,

    /// Index of the selected plugin tab
    pub selected_plugin: usize,

    /// Index of the selected widget within the tab
    pub selected_widget: usize,

    /// Status message to display (if any)
    pub status_message: Option<String>,

    /// Report of the most recent reload
    pub last_report: Option<ReloadReport>,

    /// Current UI theme
    pub theme: Theme,

    /// Whether the application should quit
    pub should_quit: bool,
}

impl App {
    /// Create the application from the loaded configuration and CLI overrides.
    ///
    /// An explicitly requested document must exist; the default document
    /// locations are only used when present.
    pub fn new(options: AppOptions) -> anyhow::Result<Self> {
        let mut config = match options.config_path {
            Some(ref path) => Config::load_from_file(path)?,
            None => Config::load()?,
        };

        if let Some(store_dir) = options.store_dir {
            config.plugins.store_dir = Some(store_dir);
        }
        if options.token.is_some() {
            config.remote.token = options.token;
        }

        let cwd = std::env::current_dir()?;
        let mut app = Self::with_config(config, cwd);

        if let Some(path) = options.document.or_else(|| app.config.document_path()) {
            app.open_document(&path)?;
        } else if let Some(path) = find_default_document() {
            if let Err(e) = app.open_document(&path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to open default document");
            }
        }

        Ok(app)
    }

    /// Create the application without opening a document.
    pub fn with_config(config: Config, cwd: PathBuf) -> Self {
        let store = LocalStore::new(config.store_dir());
        let resolver = PluginPathResolver::new(&cwd, store.root())
            .with_local_dir(config.plugins.local_dir.clone())
            .with_file_suffix(config.plugins.single_file_suffix.clone());
        let session = PluginHostSession::new(resolver, crate::CORE_VERSION);
        let theme = Theme::from_config(&config.ui);

        Self {
            cwd,
            config,
            store,
            session,
            document: None,
            mode: AppMode::default(),
            selected_plugin: 0,
            selected_widget: 0,
            status_message: None,
            last_report: None,
            theme,
            should_quit: false,
        }
    }

    /// Open a config document. Plugins must be reloaded to see it.
    pub fn open_document(&mut self, path: &Path) -> anyhow::Result<()> {
        let document = ConfigDocument::open(path)?;
        tracing::debug!(path = %document.path().display(), lines = document.line_count(), "Document opened");
        self.document = Some(document.into_shared());
        Ok(())
    }

    /// Path of the open document.
    pub fn document_path(&self) -> Option<PathBuf> {
        self.document.as_ref().map(|d| d.lock().path().to_path_buf())
    }

    /// Whether the open document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.document.as_ref().is_some_and(|d| d.lock().is_modified())
    }

    /// Reload every plugin.
    pub fn reload(&mut self) -> ReloadReport {
        let report = self.session.reload(self.document.clone());
        self.clamp_selection();
        self.status_message = Some(report.to_string());
        self.last_report = Some(report.clone());
        report
    }

    /// Installed packages with their compatibility.
    pub fn installed_packages(&self) -> Vec<InstalledPackage> {
        self.store.installed(crate::CORE_VERSION)
    }

    /// Client for the remote catalog.
    #[cfg(feature = "remote")]
    pub fn catalog(&self) -> PluginResult<crate::plugin::RemoteCatalog> {
        crate::plugin::RemoteCatalog::new(self.config.remote.clone())
    }

    /// Packages offered by the remote catalog.
    #[cfg(feature = "remote")]
    pub fn remote_packages(&self) -> PluginResult<Vec<crate::plugin::RemotePackage>> {
        self.catalog()?.refresh()
    }

    /// Install or update a package from the catalog.
    ///
    /// The remote manifest is checked first; an incompatible package is
    /// refused unless `force` is set.
    #[cfg(feature = "remote")]
    pub fn install(&self, name: &str, branch: Option<&str>, force: bool) -> PluginResult<PathBuf> {
        crate::plugin::validate_name(name)?;

        let manifest = self.catalog()?.fetch_remote_manifest(name).into_manifest();
        if !crate::plugin::is_compatible(&manifest, crate::CORE_VERSION) {
            if !force {
                return Err(PluginError::Incompatible {
                    name: name.to_string(),
                    host: crate::CORE_VERSION.to_string(),
                });
            }
            tracing::warn!(package = name, "Installing incompatible package (forced)");
        }

        let branch = branch.unwrap_or(&self.config.remote.branch);
        crate::plugin::Installer::new(self.config.remote.clone(), self.store.clone())
            .install(name, branch)
    }

    /// Remove an installed package.
    pub fn uninstall(&self, name: &str) -> PluginResult<()> {
        self.store.uninstall(name)
    }

    /// Press a widget of a hosted plugin, addressed by index or name.
    pub fn activate(&mut self, plugin: &str, widget: usize) -> PluginResult<ActionOutcome> {
        let index = plugin
            .parse::<usize>()
            .ok()
            .filter(|i| *i < self.session.plugins().len())
            .or_else(|| self.session.position(plugin))
            .ok_or_else(|| PluginError::NotFound(PathBuf::from(plugin)))?;

        self.session.activate(index, widget)
    }

    /// Save the document. Returns the backup path, if one was written.
    pub fn save_document(&mut self) -> anyhow::Result<Option<PathBuf>> {
        let document =
            self.document.as_ref().ok_or_else(|| anyhow::anyhow!("No config document is open"))?;
        let backup = document.lock().save(self.config.general.backup_on_save)?;
        tracing::info!(backup = ?backup, "Document saved");
        Ok(backup)
    }

    /// Throw away unsaved document changes.
    pub fn discard_changes(&mut self) -> anyhow::Result<()> {
        if let Some(ref document) = self.document {
            document.lock().discard_changes()?;
        }
        Ok(())
    }

    /// Currently selected hosted plugin.
    pub fn current_plugin(&self) -> Option<&HostedPlugin> {
        self.session.get(self.selected_plugin)
    }

    fn widget_count(&self) -> usize {
        self.current_plugin().map_or(0, |p| p.editor().widgets().len())
    }

    fn clamp_selection(&mut self) {
        let count = self.session.plugins().len();
        if self.selected_plugin >= count {
            self.selected_plugin = count.saturating_sub(1);
        }
        let widgets = self.widget_count();
        if self.selected_widget >= widgets {
            self.selected_widget = widgets.saturating_sub(1);
        }
    }

    /// Switch to the next plugin tab (wrapping).
    pub fn next_plugin(&mut self) {
        let count = self.session.plugins().len();
        if count > 0 {
            self.selected_plugin = (self.selected_plugin + 1) % count;
            self.selected_widget = 0;
        }
    }

    /// Switch to the previous plugin tab (wrapping).
    pub fn previous_plugin(&mut self) {
        let count = self.session.plugins().len();
        if count > 0 {
            self.selected_plugin = (self.selected_plugin + count - 1) % count;
            self.selected_widget = 0;
        }
    }

    /// Move widget selection down.
    pub fn select_next_widget(&mut self) {
        let count = self.widget_count();
        if count > 0 {
            self.selected_widget = (self.selected_widget + 1).min(count - 1);
        }
    }

    /// Move widget selection up.
    pub fn select_previous_widget(&mut self) {
        self.selected_widget = self.selected_widget.saturating_sub(1);
    }

    /// Press the selected widget and report the outcome in the status bar.
    pub fn press_selected(&mut self) {
        if self.session.plugins().is_empty() {
            return;
        }

        match self.session.activate(self.selected_plugin, self.selected_widget) {
            Ok(ActionOutcome::Nothing) => {}
            Ok(outcome) => self.set_status(outcome.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Plugin action failed");
                self.set_status(format!("Error: {e}"));
            }
        }
    }

    /// Save from the TUI, reporting in the status bar.
    pub fn save_from_ui(&mut self) {
        match self.save_document() {
            Ok(Some(backup)) => self.set_status(format!("Saved (backup: {})", backup.display())),
            Ok(None) => self.set_status("Saved"),
            Err(e) => self.set_status(format!("Save failed: {e}")),
        }
    }

    /// Discard from the TUI, reporting in the status bar.
    pub fn discard_from_ui(&mut self) {
        match self.discard_changes() {
            Ok(()) => self.set_status("Changes discarded"),
            Err(e) => self.set_status(format!("Discard failed: {e}")),
        }
    }

    /// Set a status message.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear the status message.
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Request quit. Unsaved changes ask for confirmation first.
    pub fn request_quit(&mut self) {
        if self.is_modified() && self.mode != AppMode::ConfirmQuit {
            self.mode = AppMode::ConfirmQuit;
        } else {
            self.quit();
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn is_help_shown(&self) -> bool {
        self.mode == AppMode::Help
    }
}
