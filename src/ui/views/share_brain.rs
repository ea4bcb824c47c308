//! Share brain view.
//!
//! Modal panel that turns public sharing of the whole collection on and off
//! and hands out the link others can open.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::components::{centered_rect, LoadingIndicator};
use crate::ui::theme::theme;

const DESCRIPTION: &str = "Share your entire collection of notes, documents, links and videos \
with others. They get a read-only view of everything you have saved.";

/// Actions returned from the share brain view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareBrainAction {
    /// Close the panel.
    Close,
    /// Enable sharing.
    Share,
    /// Disable sharing.
    StopSharing,
    /// Copy the link to the clipboard.
    Copy(String),
}

/// Turn the backend's share link into the link a visitor opens.
///
/// The backend link ends in the owner's user ID; the visitor link is
/// `{share_base_url}/brain/{user_id}`.
pub fn share_link(share_base_url: &str, backend_link: &str) -> String {
    let user_id = backend_link
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    format!("{}/brain/{}", share_base_url.trim_end_matches('/'), user_id)
}

/// The share brain panel.
#[derive(Debug)]
pub struct ShareBrainView {
    share_base_url: String,
    /// Visitor link while sharing is on.
    link: Option<String>,
    /// A request is in flight.
    loading: bool,
    spinner: LoadingIndicator,
}

impl ShareBrainView {
    /// Create the panel; visitor links are built on `share_base_url`.
    pub fn new(share_base_url: impl Into<String>) -> Self {
        Self {
            share_base_url: share_base_url.into(),
            link: None,
            loading: false,
            spinner: LoadingIndicator::with_message("Working..."),
        }
    }

    /// Get the visitor link, if sharing is on.
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// Check if a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sharing was enabled; `backend_link` is the backend's share link.
    pub fn sharing_enabled(&mut self, backend_link: &str) {
        self.loading = false;
        self.link = Some(share_link(&self.share_base_url, backend_link));
    }

    /// Sharing was disabled.
    pub fn sharing_disabled(&mut self) {
        self.loading = false;
        self.link = None;
    }

    /// A share request failed; keep the previous state.
    pub fn request_failed(&mut self) {
        self.loading = false;
    }

    /// Advance the spinner.
    pub fn tick(&mut self) {
        if self.loading {
            self.spinner.tick();
        }
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ShareBrainAction> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(ShareBrainAction::Close),
            _ if self.loading => None,
            KeyCode::Enter | KeyCode::Char('c') => match &self.link {
                Some(link) => Some(ShareBrainAction::Copy(link.clone())),
                None => {
                    self.loading = true;
                    Some(ShareBrainAction::Share)
                }
            },
            KeyCode::Char('x') => {
                self.loading = true;
                Some(ShareBrainAction::StopSharing)
            }
            _ => None,
        }
    }

    /// Render the panel as a modal overlay.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let dialog_area = centered_rect(64.min(area.width.saturating_sub(4)), 14, area);
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(Span::styled(
                " Share Your Extra Memory ",
                Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.accent));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Description
                Constraint::Length(4), // Link
                Constraint::Length(1), // Status
                Constraint::Length(1), // Buttons
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(DESCRIPTION)
                .style(Style::default().fg(t.muted))
                .wrap(Wrap { trim: true }),
            chunks[0],
        );

        let link_text = match &self.link {
            Some(link) => Span::styled(link.as_str(), Style::default().fg(t.fg)),
            None => Span::styled(
                "Press Enter to generate your shareable link",
                Style::default().fg(t.muted),
            ),
        };
        frame.render_widget(
            Paragraph::new(link_text)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).border_style(t.border_style(false))),
            chunks[1],
        );

        if self.loading {
            self.spinner.render(frame, chunks[2]);
        }

        let primary = if self.link.is_some() {
            " [Enter] Copy Link "
        } else {
            " [Enter] Start Sharing "
        };
        let buttons = Line::from(vec![
            Span::styled(
                primary,
                Style::default()
                    .fg(t.selection_fg)
                    .bg(t.success)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(" [x] Stop Sharing ", Style::default().fg(t.error)),
            Span::raw("   "),
            Span::styled(" [Esc] Close ", Style::default().fg(t.muted)),
        ]);
        frame.render_widget(Paragraph::new(buttons).alignment(Alignment::Center), chunks[3]);
    }
}
