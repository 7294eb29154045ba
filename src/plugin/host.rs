//! Interfaces between the host and loaded plugins.
//!
//! A loaded plugin is a [`LoadablePlugin`]. It may expose an editor through
//! [`EditorFactory`]; plugins without one are still loaded but contribute no
//! tab. Editors are [`EditorComponent`]s rendered by the host UI.

use super::widgets::{ActionOutcome, WidgetSpec};
use super::PluginResult;
use crate::core::SharedDocument;

/// A plugin module that has been loaded into the host.
pub trait LoadablePlugin: Send {
    /// Display name of the module.
    fn name(&self) -> &str;

    /// The editor entry point, if the module provides one.
    fn editor_factory(&self) -> Option<&dyn EditorFactory>;
}

/// Builds editor components bound to the current config document.
pub trait EditorFactory {
    /// Build an editor. `document` is `None` when no config document is open.
    fn build(&self, document: Option<SharedDocument>) -> PluginResult<Box<dyn EditorComponent>>;
}

/// An instantiated plugin editor.
pub trait EditorComponent: Send {
    /// Tab title.
    fn title(&self) -> &str;

    /// Widgets, top to bottom.
    fn widgets(&self) -> &[WidgetSpec];

    /// Press the widget at `index`.
    fn press(&mut self, index: usize) -> PluginResult<ActionOutcome>;
}

/// Placeholder editor shown for a package that failed the compatibility gate.
#[derive(Debug, Clone)]
pub struct DisabledEditor {
    title: String,
    widgets: Vec<WidgetSpec>,
}

impl DisabledEditor {
    pub fn new(package: &str, host_version: &str) -> Self {
        Self {
            title: package.to_string(),
            widgets: vec![WidgetSpec::label(format!(
                "Plugin '{package}' is disabled: not compatible with core {host_version}"
            ))],
        }
    }
}

impl EditorComponent for DisabledEditor {
    fn title(&self) -> &str {
        &self.title
    }

    fn widgets(&self) -> &[WidgetSpec] {
        &self.widgets
    }

    fn press(&mut self, _index: usize) -> PluginResult<ActionOutcome> {
        Ok(ActionOutcome::Nothing)
    }
}
