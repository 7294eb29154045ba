//! Terminal User Interface module.
//!
//! Hosts one tab per plugin editor using ratatui.

mod app;
mod input;
mod theme;
mod ui;

pub use app::run_tui;
pub use input::handle_events;
pub use theme::{parse_hex_color, Theme};
pub use ui::{draw, tab_title};
