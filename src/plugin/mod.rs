//! Plugin system for ConfigCore.
//!
//! Plugins are packages installed from a remote catalog into a local store,
//! development modules in the working directory's `plugins` folder, or single
//! `*_plugin.json` files next to it.
//!
//! # Pipeline
//!
//! 1. The [`RemoteCatalog`] lists packages and fetches their manifests.
//! 2. The installer extracts one package from a repository snapshot into the
//!    [`LocalStore`].
//! 3. The [`PluginPathResolver`] finds plugin roots.
//! 4. The [`PluginHostSession`] gates store packages on their manifest
//!    ([`is_compatible`]), loads each root with the [`DynamicLoader`] and
//!    builds its editor.
//!
//! # Module format
//!
//! ```json
//! {
//!   "name": "gaps",
//!   "min_core_version": "0.2.0",
//!   "editor": {
//!     "layout": "vertical",
//!     "widgets": [
//!       {"type": "label", "label": "Gaps"},
//!       {"type": "button", "label": "Add", "action": {"kind": "append_line", "line": "gaps inner 5"}}
//!     ]
//!   }
//! }
//! ```

#[cfg(feature = "remote")]
mod catalog;
mod compat;
mod error;
mod export;
mod host;
mod installer;
mod loader;
mod manifest;
#[cfg(feature = "native-plugins")]
mod native;
mod resolver;
mod session;
mod store;
mod widgets;

#[cfg(feature = "remote")]
pub use catalog::{
    decode_content, parse_listing, user_agent, ContentEntry, RemoteCatalog, RemotePackage,
};
pub use compat::is_compatible;
pub use error::{PluginError, PluginResult};
pub use export::{PackageBuilder, DEFAULT_MIN_CORE_VERSION};
pub use host::{DisabledEditor, EditorComponent, EditorFactory, LoadablePlugin};
#[cfg(feature = "remote")]
pub use installer::Installer;
pub use installer::{extract_package, install_from_snapshot, is_plain_relative};
pub use loader::{entry_candidates, DynamicLoader, EDITOR_ENTRY_FILE};
pub use manifest::{
    decode as decode_manifest, read_local as read_local_manifest, Manifest, ManifestDecode,
    PackageManifest, COMPATIBLE_VERSIONS_KEYS, MANIFEST_FILES, MIN_CORE_VERSION_KEY,
};
#[cfg(feature = "native-plugins")]
pub use native::{library_file_name, NativePlugin};
pub use resolver::{PluginPathResolver, PluginRoot, RootKind, RootOrigin};
pub use session::{
    ActivePlugin, HostedPlugin, PluginHostSession, ReloadReport, RootFailure, SessionState,
};
pub use store::{validate_name, InstalledPackage, LocalStore};
pub use widgets::{
    Action, ActionOutcome, DeclarativeEditor, ModuleDocument, ScriptedPlugin, UiSpec, WidgetSpec,
};

/// ABI version native plugin libraries must report.
pub const PLUGIN_API_VERSION: u32 = 1;
