//! Theme and styling configuration.
//!
//! A single built-in palette shared by the views. Components that only need a
//! couple of colors use them directly.

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Primary foreground color.
    pub fg: Color,
    /// Secondary text (hints, empty states).
    pub muted: Color,
    /// Accent color for titles and focused values.
    pub accent: Color,
    /// Unfocused border color.
    pub border: Color,
    /// Focused border color.
    pub border_focused: Color,
    /// Selected row background.
    pub selection_bg: Color,
    /// Selected row foreground.
    pub selection_fg: Color,
    /// Error text.
    pub error: Color,
    /// Success text and primary buttons.
    pub success: Color,
    /// Warnings and in-progress text.
    pub warning: Color,
    /// Tag chips.
    pub tag: Color,
}

impl Theme {
    /// The built-in dark palette.
    pub const DEFAULT: Theme = Theme {
        fg: Color::White,
        muted: Color::DarkGray,
        accent: Color::Cyan,
        border: Color::DarkGray,
        border_focused: Color::Yellow,
        selection_bg: Color::Cyan,
        selection_fg: Color::Black,
        error: Color::Red,
        success: Color::Green,
        warning: Color::Yellow,
        tag: Color::Blue,
    };

    /// Border style for a possibly focused block.
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }

    /// Title style for a possibly focused block.
    pub fn title_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.fg)
        }
    }

    /// Style of the selected row in a list.
    pub fn selection_style(&self) -> Style {
        Style::default()
            .fg(self.selection_fg)
            .bg(self.selection_bg)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static THEME: Theme = Theme::DEFAULT;

/// Get the active theme.
pub fn theme() -> &'static Theme {
    &THEME
}
