#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unnecessary_lazy_evaluations)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::should_implement_trait)]

//! # ConfigCore
//!
//! Config file editor host with compatibility-gated plugin packages.
//!
//! ConfigCore opens a plain-text config file (an i3 config by default) and
//! hosts plugin editors that modify it. Plugins come from a remote catalog
//! repository, get installed into a local package store, and are loaded only
//! when their manifest says they work with this core version.
//!
//! ## Features
//!
//! - **Package catalog**: browse and install packages from a GitHub repository
//! - **Compatibility gate**: `min_core_version` or an explicit version list
//! - **Declarative editors**: labels, text and buttons that edit the config
//! - **Native plugins**: optional dynamic libraries with the same interface
//! - **Package builder**: author and export packages from a TOML description
//!
//! ## Quick Start
//!
//! ```bash
//! # Browse the catalog
//! configcore packages remote
//!
//! # Install a package and open the editor
//! configcore packages install i3-gaps
//! configcore --document ~/.config/i3/config
//! ```

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::redundant_else)]
#![allow(clippy::if_not_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::unnecessary_debug_formatting)]
#![allow(clippy::use_self)]

pub mod app;
pub mod core;
pub mod plugin;
pub mod tui;

// Re-export commonly used types
pub use app::App;
pub use core::{Config, ConfigDocument, Version};
pub use plugin::{
    is_compatible, LoadablePlugin, PackageBuilder, PluginError, PluginHostSession, PluginResult,
};

/// Version of the running core, used by the compatibility gate.
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "configcore";

/// Short alias
pub const APP_ALIAS: &str = "ccore";
