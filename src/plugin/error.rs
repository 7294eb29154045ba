//! Plugin system error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::DocumentError;

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur during plugin operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Package or plugin path not found.
    #[error("Not found: {0}")]
    NotFound(PathBuf),

    /// Package name that cannot be used as a store directory.
    #[error("Invalid package name: '{0}'")]
    InvalidName(String),

    /// Export target already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Transport-level failure talking to the remote repository.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response from the remote repository.
    #[error("Remote returned status {status}: {message}")]
    RemoteStatus { status: u16, message: String },

    /// Snapshot archive without entries.
    #[error("Repository snapshot archive is empty")]
    EmptyArchive,

    /// Requested package folder is absent from the snapshot.
    #[error("Package folder '{0}' not found in repository snapshot")]
    PackageNotFound(String),

    /// Snapshot archive could not be read.
    #[error("Archive error: {0}")]
    Archive(String),

    /// Package declares it is not compatible with this host.
    #[error("Package '{name}' is not compatible with core {host}")]
    Incompatible { name: String, host: String },

    /// Plugin loading failed.
    #[error("Failed to load plugin: {0}")]
    LoadError(String),

    /// Editor construction failed.
    #[error("Failed to instantiate plugin editor: {0}")]
    Instantiation(String),

    /// A button action failed.
    #[error("Plugin action failed: {0}")]
    ExecutionError(String),

    /// Config document error.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<zip::result::ZipError> for PluginError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for PluginError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
