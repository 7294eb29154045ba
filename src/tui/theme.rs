//! Color themes for the editor host.

use ratatui::style::Color;

use crate::core::UiConfig;

/// Colors used by the terminal host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Theme name for display and configuration
    pub name: String,
    /// Active tab, selected widget marker and headers
    pub primary: Color,
    /// Buttons
    pub accent: Color,
    /// Main text color
    pub text: Color,
    /// Labels, hints and the status bar
    pub text_dim: Color,
    /// Selected widget background
    pub selected_bg: Color,
    /// Border color
    pub border: Color,
    /// Saved / loaded indicators
    pub success: Color,
    /// Unsaved changes and disabled plugins
    pub warning: Color,
    /// Failed actions
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    /// Default theme - works on light and dark terminals.
    pub fn default_theme() -> Self {
        Self {
            name: "default".to_string(),
            primary: Color::Rgb(99, 102, 241),    // Indigo
            accent: Color::Rgb(16, 185, 129),     // Emerald
            text: Color::White,
            text_dim: Color::Rgb(156, 163, 175),  // Gray-400
            selected_bg: Color::Rgb(55, 65, 81),  // Gray-700
            border: Color::Rgb(75, 85, 99),       // Gray-600
            success: Color::Rgb(34, 197, 94),     // Green
            warning: Color::Rgb(234, 179, 8),     // Yellow
            error: Color::Rgb(239, 68, 68),       // Red
        }
    }

    /// Dracula theme - dark purple and pink.
    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),
            primary: Color::Rgb(189, 147, 249),  // Purple
            accent: Color::Rgb(255, 121, 198),   // Pink
            text: Color::Rgb(248, 248, 242),     // Foreground
            text_dim: Color::Rgb(98, 114, 164),  // Comment
            selected_bg: Color::Rgb(68, 71, 90), // Current line
            border: Color::Rgb(98, 114, 164),
            success: Color::Rgb(80, 250, 123),
            warning: Color::Rgb(241, 250, 140),
            error: Color::Rgb(255, 85, 85),
        }
    }

    /// Nord theme - arctic blues.
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            primary: Color::Rgb(136, 192, 208),  // Frost
            accent: Color::Rgb(163, 190, 140),   // Aurora green
            text: Color::Rgb(236, 239, 244),     // Snow storm
            text_dim: Color::Rgb(216, 222, 233),
            selected_bg: Color::Rgb(67, 76, 94), // Polar night
            border: Color::Rgb(76, 86, 106),
            success: Color::Rgb(163, 190, 140),
            warning: Color::Rgb(235, 203, 139),
            error: Color::Rgb(191, 97, 106),
        }
    }

    /// Gruvbox dark theme - warm retro colors.
    pub fn gruvbox_dark() -> Self {
        Self {
            name: "gruvbox-dark".to_string(),
            primary: Color::Rgb(250, 189, 47),
            accent: Color::Rgb(184, 187, 38),
            text: Color::Rgb(235, 219, 178),
            text_dim: Color::Rgb(168, 153, 132),
            selected_bg: Color::Rgb(80, 73, 69),
            border: Color::Rgb(102, 92, 84),
            success: Color::Rgb(184, 187, 38),
            warning: Color::Rgb(254, 128, 25),
            error: Color::Rgb(251, 73, 52),
        }
    }

    /// High contrast theme for accessibility.
    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast".to_string(),
            primary: Color::Yellow,
            accent: Color::Cyan,
            text: Color::White,
            text_dim: Color::Gray,
            selected_bg: Color::Blue,
            border: Color::White,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }

    /// Get a theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::default_theme()),
            "dracula" => Some(Self::dracula()),
            "nord" => Some(Self::nord()),
            "gruvbox-dark" | "gruvbox_dark" | "gruvbox" => Some(Self::gruvbox_dark()),
            "high-contrast" | "high_contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    /// List all available built-in theme names.
    pub fn available_themes() -> Vec<&'static str> {
        vec!["default", "dracula", "nord", "gruvbox-dark", "high-contrast"]
    }

    /// Theme from the `[ui]` config section. Unknown names fall back to the
    /// default theme.
    pub fn from_config(config: &UiConfig) -> Self {
        let mut theme = Self::by_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using default");
            Self::default()
        });

        if let Some(color) = config.accent.as_deref().and_then(parse_hex_color) {
            theme.accent = color;
        }
        theme
    }
}

/// Parse a hex color string (#RRGGBB or RRGGBB) into a Color.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Color::Rgb(r, g, b))
}
