//! Core types and functionality for ConfigCore.
//!
//! This module contains the pieces the plugin pipeline builds on: version
//! comparison, configuration, the edited config document and the shell
//! launcher used by button actions.

mod config;
mod document;
mod executor;
mod version;

pub use config::{
    Config, GeneralConfig, PluginsConfig, RemoteConfig, UiConfig, DEFAULT_STORE_DIR_NAME,
};
pub use document::{
    comment_line, default_document_candidates, find_default_document, is_commented, make_backup,
    uncomment_line, ConfigDocument, DocumentError, SharedDocument,
};
pub use executor::ShellLauncher;
pub use version::Version;
