//! Declarative editor widgets.
//!
//! A plugin editor is a vertical stack of labels, read-only text blocks and
//! buttons. Buttons carry an action that either runs a shell command or edits
//! the bound config document.

use serde::{Deserialize, Serialize};

use super::host::{EditorComponent, EditorFactory, LoadablePlugin};
use super::{PluginError, PluginResult};
use crate::core::{SharedDocument, ShellLauncher};

/// One widget of an editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetSpec {
    /// A static label.
    Label {
        #[serde(default)]
        label: String,
    },
    /// A read-only block of text.
    Text {
        #[serde(default)]
        text: String,
    },
    /// A push button.
    Button {
        #[serde(default = "default_button_label")]
        label: String,
        #[serde(default)]
        action: Action,
    },
}

fn default_button_label() -> String {
    "Button".to_string()
}

impl WidgetSpec {
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label { label: text.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn button(label: impl Into<String>, action: Action) -> Self {
        Self::Button { label: label.into(), action }
    }

    /// Short type name, as used in the serialized form.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Label { .. } => "label",
            Self::Text { .. } => "text",
            Self::Button { .. } => "button",
        }
    }

    /// Text shown for the widget.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Label { label } | Self::Button { label, .. } => label,
            Self::Text { text } => text,
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(self, Self::Button { .. })
    }
}

/// What a button does when pressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Nothing.
    #[default]
    None,
    /// Run a shell command without waiting for it.
    RunShell {
        #[serde(default)]
        cmd: String,
    },
    /// Append a line to the document.
    AppendLine {
        #[serde(default)]
        line: String,
    },
    /// Replace the line at a zero-based index.
    ReplaceLine {
        #[serde(default)]
        index: usize,
        #[serde(default)]
        line: String,
    },
}

impl Action {
    /// Human readable summary used in previews and listings.
    pub fn describe(&self) -> String {
        match self {
            Self::None => "no action".to_string(),
            Self::RunShell { cmd } => format!("run: {cmd}"),
            Self::AppendLine { line } => format!("append line: {line}"),
            Self::ReplaceLine { index, line } => format!("replace line {index}: {line}"),
        }
    }
}

/// Layout and widgets of a declarative editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSpec {
    /// Optional editor title (defaults to the module name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Layout; only `vertical` is supported.
    #[serde(default = "default_layout")]
    pub layout: String,
    /// Widgets, top to bottom.
    #[serde(default)]
    pub widgets: Vec<WidgetSpec>,
}

fn default_layout() -> String {
    "vertical".to_string()
}

impl Default for UiSpec {
    fn default() -> Self {
        Self { title: None, layout: default_layout(), widgets: Vec::new() }
    }
}

/// A standalone declarative plugin module.
///
/// The `editor` entry point (also accepted as `ui`, so a package manifest can
/// double as a module) is what the host instantiates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_core_version: Option<String>,
    #[serde(default, alias = "ui", skip_serializing_if = "Option::is_none")]
    pub editor: Option<UiSpec>,
}

impl ModuleDocument {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Result of pressing a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The widget has no effect.
    Nothing,
    /// A shell command was spawned.
    ShellStarted { pid: u32 },
    /// A line was appended to the document.
    LineAppended,
    /// A line of the document was replaced.
    LineReplaced { index: usize },
    /// No document is bound; the action was only described.
    Preview(String),
}

impl std::fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nothing => write!(f, "no action"),
            Self::ShellStarted { pid } => write!(f, "started command (pid {pid})"),
            Self::LineAppended => write!(f, "line appended"),
            Self::LineReplaced { index } => write!(f, "line {index} replaced"),
            Self::Preview(what) => write!(f, "preview: {what}"),
        }
    }
}

/// Editor built from a [`UiSpec`].
pub struct DeclarativeEditor {
    title: String,
    widgets: Vec<WidgetSpec>,
    document: Option<SharedDocument>,
    launcher: ShellLauncher,
}

impl DeclarativeEditor {
    pub fn new(title: impl Into<String>, ui: &UiSpec, document: Option<SharedDocument>) -> Self {
        let title = ui.title.clone().unwrap_or_else(|| title.into());
        Self { title, widgets: ui.widgets.clone(), document, launcher: ShellLauncher::new() }
    }

    /// Use a custom launcher for `run_shell` actions.
    #[must_use]
    pub fn with_launcher(mut self, launcher: ShellLauncher) -> Self {
        self.launcher = launcher;
        self
    }

    fn run(&self, action: &Action) -> PluginResult<ActionOutcome> {
        match action {
            Action::None => Ok(ActionOutcome::Nothing),
            Action::RunShell { cmd } => self
                .launcher
                .spawn(cmd)
                .map(|pid| ActionOutcome::ShellStarted { pid })
                .map_err(|e| PluginError::ExecutionError(format!("command '{cmd}' failed: {e}"))),
            Action::AppendLine { line } => {
                let Some(ref document) = self.document else {
                    return Ok(ActionOutcome::Preview(action.describe()));
                };
                document.lock().append_line(line.clone());
                Ok(ActionOutcome::LineAppended)
            }
            Action::ReplaceLine { index, line } => {
                let Some(ref document) = self.document else {
                    return Ok(ActionOutcome::Preview(action.describe()));
                };
                document.lock().replace_line(*index, line.clone())?;
                Ok(ActionOutcome::LineReplaced { index: *index })
            }
        }
    }
}

impl EditorComponent for DeclarativeEditor {
    fn title(&self) -> &str {
        &self.title
    }

    fn widgets(&self) -> &[WidgetSpec] {
        &self.widgets
    }

    fn press(&mut self, index: usize) -> PluginResult<ActionOutcome> {
        let widget = self.widgets.get(index).ok_or_else(|| {
            PluginError::ExecutionError(format!("no widget at index {index} in '{}'", self.title))
        })?;

        match widget {
            WidgetSpec::Button { action, .. } => {
                let action = action.clone();
                let outcome = self.run(&action)?;
                tracing::debug!(editor = %self.title, index, outcome = %outcome, "Button pressed");
                Ok(outcome)
            }
            _ => Ok(ActionOutcome::Nothing),
        }
    }
}

/// A plugin backed by a [`ModuleDocument`].
#[derive(Debug, Clone)]
pub struct ScriptedPlugin {
    name: String,
    module: ModuleDocument,
}

impl ScriptedPlugin {
    pub fn new(name: impl Into<String>, module: ModuleDocument) -> Self {
        let name = module.name.clone().unwrap_or_else(|| name.into());
        Self { name, module }
    }

    pub fn module(&self) -> &ModuleDocument {
        &self.module
    }
}

impl LoadablePlugin for ScriptedPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn editor_factory(&self) -> Option<&dyn EditorFactory> {
        self.module.editor.as_ref().map(|_| self as &dyn EditorFactory)
    }
}

impl EditorFactory for ScriptedPlugin {
    fn build(&self, document: Option<SharedDocument>) -> PluginResult<Box<dyn EditorComponent>> {
        let ui = self
            .module
            .editor
            .as_ref()
            .ok_or_else(|| PluginError::Instantiation(format!("'{}' has no editor", self.name)))?;

        if ui.layout != "vertical" {
            return Err(PluginError::Instantiation(format!(
                "unsupported layout '{}' in '{}'",
                ui.layout, self.name
            )));
        }

        Ok(Box::new(DeclarativeEditor::new(self.name.clone(), ui, document)))
    }
}
