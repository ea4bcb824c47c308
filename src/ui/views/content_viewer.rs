//! Content viewer.
//!
//! Full view of a single item: title with its type icon, the body, and the
//! tags it carries. Links also show the page's title and description once
//! the preview lookup answers.

use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::api::types::{Content, ContentType};
use crate::api::{ApiError, LinkPreview};
use crate::ui::components::centered_rect;
use crate::ui::theme::theme;

/// Actions returned from the content viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentViewerAction {
    /// Close the viewer.
    Close,
    /// Open a URL with the system opener.
    OpenUrl(String),
}

/// Link preview progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    Loading,
    Ready(LinkPreview),
    Unavailable,
}

/// Read-only view of one content item.
#[derive(Debug)]
pub struct ContentViewerView {
    content: Content,
    scroll: u16,
    /// Only links get a preview.
    preview: Option<PreviewState>,
}

impl ContentViewerView {
    /// Create a viewer for `content`.
    pub fn new(content: Content) -> Self {
        let preview = match content.content_type {
            ContentType::Link => Some(PreviewState::Loading),
            ContentType::Text | ContentType::Video | ContentType::Image | ContentType::Audio => {
                None
            }
        };
        Self {
            content,
            scroll: 0,
            preview,
        }
    }

    /// The link preview, for links.
    pub fn preview(&self) -> Option<&PreviewState> {
        self.preview.as_ref()
    }

    /// Apply a preview lookup result. Results for another item are ignored.
    pub fn set_preview(&mut self, content_id: &str, result: Result<LinkPreview, ApiError>) {
        if content_id != self.content.id || self.preview.is_none() {
            return;
        }
        self.preview = Some(match result {
            Ok(preview) => PreviewState::Ready(preview),
            Err(e) => {
                debug!(error = %e, "Link preview unavailable");
                PreviewState::Unavailable
            }
        });
    }

    /// Get the item being shown.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Current scroll offset in lines.
    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ContentViewerAction> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(ContentViewerAction::Close),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.scroll = 0;
                None
            }
            KeyCode::Char('o') if self.content.content_type.is_url() => {
                Some(ContentViewerAction::OpenUrl(self.content.link.clone()))
            }
            _ => None,
        }
    }

    /// Body lines for the item's type.
    fn body_lines(&self) -> Vec<Line<'_>> {
        let t = theme();
        let link = self.content.link.as_str();
        let url_block = |label: &'static str| {
            vec![
                Line::from(Span::styled(label, Style::default().fg(t.muted))),
                Line::from(""),
                Line::from(Span::styled(
                    link,
                    Style::default().fg(t.accent).add_modifier(Modifier::UNDERLINED),
                )),
                Line::from(""),
                Line::from(Span::styled("Press o to open", Style::default().fg(t.muted))),
            ]
        };

        match self.content.content_type {
            ContentType::Text => link.lines().map(Line::from).collect(),
            ContentType::Video => url_block("Video source:"),
            ContentType::Image => url_block("Image source:"),
            ContentType::Audio => url_block("Audio source:"),
            ContentType::Link => {
                let mut lines = self.preview_lines();
                lines.extend(url_block("Original link:"));
                lines
            }
        }
    }

    /// Title and description from the link preview.
    fn preview_lines(&self) -> Vec<Line<'_>> {
        let t = theme();
        match &self.preview {
            Some(PreviewState::Loading) => vec![
                Line::from(Span::styled("Fetching preview...", Style::default().fg(t.muted))),
                Line::from(""),
            ],
            Some(PreviewState::Ready(preview)) => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        preview.title.as_deref().unwrap_or("Article Link"),
                        Style::default().fg(t.fg).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(
                        preview
                            .description
                            .as_deref()
                            .unwrap_or("Press o to view the full article"),
                    ),
                ];
                if let Some(image) = &preview.image_url {
                    lines.push(Line::from(Span::styled(
                        format!("Image: {}", image),
                        Style::default().fg(t.muted),
                    )));
                }
                lines.push(Line::from(""));
                lines
            }
            Some(PreviewState::Unavailable) | None => Vec::new(),
        }
    }

    /// Render the viewer as a modal overlay.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let width = (area.width * 4 / 5).max(40).min(area.width);
        let height = (area.height * 4 / 5).max(10).min(area.height);
        let dialog_area = centered_rect(width, height, area);
        frame.render_widget(Clear, dialog_area);

        let kind = self.content.content_type;
        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(format!(" {} ", kind.icon()), Style::default().fg(kind.color())),
                Span::styled(
                    format!("{} ", self.content.title),
                    Style::default().fg(t.fg).add_modifier(Modifier::BOLD),
                ),
            ]))
            .title_bottom(Span::styled(" [Esc] Close  [j/k] Scroll ", Style::default().fg(t.muted)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.accent));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let has_tags = !self.content.tags.is_empty();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(if has_tags { 2 } else { 0 }),
            ])
            .split(inner);

        let body = Paragraph::new(self.body_lines())
            .style(Style::default().fg(t.fg))
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(body, chunks[0]);

        if has_tags {
            let mut spans = vec![Span::styled("Tags: ", Style::default().fg(t.muted))];
            for tag in &self.content.tags {
                spans.push(Span::styled(format!("#{}", tag.title), Style::default().fg(t.tag)));
                spans.push(Span::raw(" "));
            }
            let footer = Paragraph::new(Line::from(spans))
                .block(Block::default().borders(Borders::TOP).border_style(t.border_style(false)));
            frame.render_widget(footer, chunks[1]);
        }
    }
}
