//! UI rendering for the TUI.
//!
//! Layout: header (document and core version), one tab per hosted plugin,
//! the selected editor's widgets, and a status bar.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use super::Theme;
use crate::app::AppMode;
use crate::plugin::{HostedPlugin, WidgetSpec};
use crate::App;

/// Draw the main UI.
pub fn draw(frame: &mut Frame, app: &App) {
    if matches!(app.mode, AppMode::Help) {
        draw_help_screen(frame, app);
        return;
    }

    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Tabs
            Constraint::Min(5),    // Editor
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);
    draw_tabs(frame, app, chunks[1]);
    draw_editor(frame, app, chunks[2]);
    draw_status_bar(frame, app, chunks[3]);

    if matches!(app.mode, AppMode::ConfirmQuit) {
        draw_confirm_quit_overlay(frame, app);
    }
}

/// Draw the header with the document path and core version.
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let document = app
        .document_path()
        .map_or_else(|| "no document".to_string(), |p| p.display().to_string());

    let mut spans = vec![Span::styled(format!(" {document}"), Style::default().fg(theme.text))];
    if app.is_modified() {
        spans.push(Span::styled(
            " [modified]",
            Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.primary))
            .title(" configcore ")
            .title_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD))
            .title_bottom(Line::from(format!(" core {} ", crate::CORE_VERSION)).right_aligned()),
    );

    frame.render_widget(header, area);
}

/// Tab title for a hosted plugin.
pub fn tab_title(plugin: &HostedPlugin) -> String {
    if plugin.is_disabled() {
        format!("{} (incompatible)", plugin.title())
    } else {
        plugin.title().to_string()
    }
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let titles: Vec<Line> = app
        .session
        .plugins()
        .iter()
        .map(|p| {
            let style = if p.is_disabled() {
                Style::default().fg(theme.warning)
            } else {
                Style::default().fg(theme.text)
            };
            Line::from(Span::styled(tab_title(p), style))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.selected_plugin)
        .highlight_style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
        .divider(Span::styled("│", Style::default().fg(theme.border)))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.border)));

    frame.render_widget(tabs, area);
}

fn draw_editor(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.border));

    let Some(plugin) = app.current_plugin() else {
        let empty = Paragraph::new(vec![
            Line::from(Span::styled("No plugins loaded.", Style::default().fg(theme.text_dim))),
            Line::from(""),
            Line::from(Span::styled(
                "Install a package with `configcore packages install <name>` and press r.",
                Style::default().fg(theme.text_dim),
            )),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    };

    if let HostedPlugin::Disabled { manifest, .. } = plugin {
        draw_disabled(frame, app, plugin, manifest, area);
        return;
    }

    let editor = plugin.editor();
    let items: Vec<ListItem> =
        editor.widgets().iter().map(|w| ListItem::new(widget_line(w, theme))).collect();

    let list = List::new(items)
        .block(block.title(format!(" {} ", editor.title())))
        .highlight_style(Style::default().bg(theme.selected_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(app.selected_widget));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_disabled(
    frame: &mut Frame,
    app: &App,
    plugin: &HostedPlugin,
    manifest: &crate::plugin::Manifest,
    area: Rect,
) {
    let theme = &app.theme;

    let mut lines: Vec<Line> = plugin
        .editor()
        .widgets()
        .iter()
        .map(|w| {
            Line::from(Span::styled(
                w.display_text().to_string(),
                Style::default().fg(theme.warning).add_modifier(Modifier::BOLD),
            ))
        })
        .collect();
    lines.push(Line::from(""));

    let pretty = serde_json::to_string_pretty(manifest.value()).unwrap_or_else(|_| manifest.to_string());
    lines.extend(
        pretty.lines().map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(theme.text_dim)))),
    );

    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning))
            .title(format!(" {} ", plugin.title())),
    );
    frame.render_widget(body, area);
}

/// One rendered widget row.
fn widget_line<'a>(widget: &'a WidgetSpec, theme: &Theme) -> Line<'a> {
    match widget {
        WidgetSpec::Label { label } => {
            Line::from(Span::styled(label.as_str(), Style::default().fg(theme.text).add_modifier(Modifier::BOLD)))
        }
        WidgetSpec::Text { text } => Line::from(Span::styled(text.as_str(), Style::default().fg(theme.text_dim))),
        WidgetSpec::Button { label, action } => Line::from(vec![
            Span::styled(format!("[ {label} ]"), Style::default().fg(theme.accent)),
            Span::styled(format!("  {}", action.describe()), Style::default().fg(theme.text_dim)),
        ]),
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let mut spans = Vec::new();
    if let Some(ref message) = app.status_message {
        let color = if message.starts_with("Error") || message.contains("failed") {
            theme.error
        } else {
            theme.success
        };
        spans.push(Span::styled(format!(" {message} "), Style::default().fg(color)));
        spans.push(Span::styled("│", Style::default().fg(theme.border)));
    }
    spans.push(Span::styled(
        " ←/→ tabs  ↑/↓ select  Enter press  r reload  s save  d discard  ? help  q quit",
        Style::default().fg(theme.text_dim),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_help_screen(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(10),   // Content
            Constraint::Length(2), // Footer
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![Span::styled(
        " Keyboard Shortcuts ",
        Style::default().fg(theme.primary).add_modifier(Modifier::BOLD),
    )]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme.primary)));
    frame.render_widget(title, chunks[0]);

    let section = |name: &'static str| {
        Line::from(Span::styled(name, Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    };

    let lines = vec![
        section("Navigation"),
        Line::from(""),
        help_line("← / → / Tab", "Switch plugin tab", theme),
        help_line("↑ / k", "Select previous widget", theme),
        help_line("↓ / j", "Select next widget", theme),
        Line::from(""),
        section("Plugins"),
        Line::from(""),
        help_line("Enter / Space", "Press the selected button", theme),
        help_line("r", "Reload all plugins", theme),
        Line::from(""),
        section("Document"),
        Line::from(""),
        help_line("s", "Save (with timestamped backup)", theme),
        help_line("d", "Discard unsaved changes", theme),
        Line::from(""),
        section("General"),
        Line::from(""),
        help_line("?", "Show this help", theme),
        help_line("q / Esc", "Quit", theme),
    ];

    frame.render_widget(Paragraph::new(lines), chunks[1]);

    let footer = Paragraph::new(Line::from(Span::styled(
        "Press Esc, q or ? to close",
        Style::default().fg(theme.text_dim),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[2]);
}

fn help_line<'a>(key: &'a str, description: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {key:<16}"), Style::default().fg(theme.primary)),
        Span::styled(description, Style::default().fg(theme.text)),
    ])
}

fn draw_confirm_quit_overlay(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = centered_rect(50, 20, frame.area());

    frame.render_widget(Clear, area);
    let dialog = Paragraph::new(vec![
        Line::from(Span::styled("The document has unsaved changes.", Style::default().fg(theme.text))),
        Line::from(""),
        Line::from(Span::styled(
            "y quit   s save and quit   n cancel",
            Style::default().fg(theme.text_dim),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning))
            .title(" Quit? "),
    );
    frame.render_widget(dialog, area);
}

/// A rectangle centered in `area`, sized in percent.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
