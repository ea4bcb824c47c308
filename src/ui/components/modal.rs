//! Confirmation dialog for destructive actions.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Result of a key press in a confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction<T> {
    /// The user confirmed; carries the dialog's payload.
    Confirm(T),
    /// The user backed out.
    Cancel,
}

/// A yes/no prompt carrying the payload to act on when confirmed.
#[derive(Debug, Clone)]
pub struct ConfirmDialog<T> {
    title: String,
    message: String,
    payload: T,
}

impl<T: Clone> ConfirmDialog<T> {
    /// Create a new confirmation dialog.
    pub fn new(title: impl Into<String>, message: impl Into<String>, payload: T) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            payload,
        }
    }

    /// Get the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Handle keyboard input.
    ///
    /// `y`/Enter confirms, `n`/Esc/`q` cancels, anything else is ignored.
    pub fn handle_input(&self, key: KeyEvent) -> Option<ConfirmAction<T>> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                Some(ConfirmAction::Confirm(self.payload.clone()))
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') | KeyCode::Esc => {
                Some(ConfirmAction::Cancel)
            }
            _ => None,
        }
    }

    /// Render the dialog centered in `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = (self.message.chars().count() as u16 + 6)
            .clamp(40, 70)
            .min(area.width.saturating_sub(4));
        let dialog = centered_rect(width, 7, area);
        frame.render_widget(Clear, dialog);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .title(format!(" {} ", self.title))
            .title_alignment(Alignment::Center);
        let inner = block.inner(dialog);
        frame.render_widget(block, dialog);

        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(self.message.as_str())
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            chunks[1],
        );

        let buttons = Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Delete   "),
            Span::styled("[n]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Cancel"),
        ]);
        frame.render_widget(Paragraph::new(buttons).alignment(Alignment::Center), chunks[2]);
    }
}

/// Create a centered rectangle.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
