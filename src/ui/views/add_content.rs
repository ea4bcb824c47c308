//! Add content view.
//!
//! Modal form for storing a new item: type, title, body (text or source URL)
//! and tags. Validation runs on submit and errors are shown per field.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::api::types::{ContentType, NewContent};
use crate::ui::components::{centered_rect, TagSelector, TagSelectorAction, TextInput};
use crate::ui::theme::theme;
use crate::validation::{validate_content, ContentErrors};

/// Actions returned from the add content view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddContentAction {
    /// Close the form without saving.
    Cancel,
    /// Send the validated content to the backend.
    Submit(NewContent),
}

/// Focusable fields, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Content type picker.
    Type,
    /// Title input.
    Title,
    /// Body input.
    Body,
    /// Tag selector.
    Tags,
    /// Submit button.
    Submit,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Type,
        FormField::Title,
        FormField::Body,
        FormField::Tags,
        FormField::Submit,
    ];

    fn next(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// The add content form.
#[derive(Debug)]
pub struct AddContentView {
    content_type: ContentType,
    title: TextInput,
    body: TextInput,
    tags: TagSelector,
    focus: FormField,
    errors: ContentErrors,
    submitting: bool,
}

impl AddContentView {
    /// Create an empty form offering `tag_pool` as tag suggestions.
    pub fn new(tag_pool: Vec<String>) -> Self {
        let mut title = TextInput::new();
        title.set_placeholder("Enter title");
        let content_type = ContentType::Text;
        let mut body = TextInput::new();
        body.set_placeholder(content_type.body_placeholder());

        Self {
            content_type,
            title,
            body,
            tags: TagSelector::with_candidates(tag_pool),
            focus: FormField::Type,
            errors: ContentErrors::default(),
            submitting: false,
        }
    }

    /// Get the selected content type.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Get the focused field.
    pub fn focus(&self) -> FormField {
        self.focus
    }

    /// Get the current validation errors.
    pub fn errors(&self) -> &ContentErrors {
        &self.errors
    }

    /// Get the tag selector.
    pub fn tags(&self) -> &TagSelector {
        &self.tags
    }

    /// Check if a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Replace the tag suggestions.
    pub fn set_tag_pool(&mut self, pool: Vec<String>) {
        self.tags.set_candidates(pool);
    }

    /// The backend rejected the submission; re-enable the form as it was.
    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }

    fn set_focus(&mut self, field: FormField) {
        if self.focus == FormField::Tags && field != FormField::Tags {
            self.tags.blur();
        }
        if field == FormField::Tags {
            self.tags.focus();
        }
        self.focus = field;
    }

    fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = content_type;
        self.body.set_placeholder(content_type.body_placeholder());
    }

    /// Validate the form and build the request body.
    fn submit(&mut self) -> Option<AddContentAction> {
        self.errors = validate_content(self.title.value(), self.body.value(), self.tags.tags());
        if !self.errors.is_empty() {
            return None;
        }
        self.submitting = true;
        Some(AddContentAction::Submit(NewContent {
            title: self.title.value().trim().to_string(),
            link: self.body.value().trim().to_string(),
            content_type: self.content_type,
            tags: self.tags.tags().to_vec(),
        }))
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<AddContentAction> {
        if self.submitting {
            return None;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) if self.focus == FormField::Tags && self.tags.is_open() => {
                self.tags.handle_input(key);
                None
            }
            (KeyCode::Esc, _) => Some(AddContentAction::Cancel),
            (KeyCode::Tab, KeyModifiers::NONE) => {
                self.set_focus(self.focus.next());
                None
            }
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) => {
                self.set_focus(self.focus.prev());
                None
            }
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => self.submit(),
            (KeyCode::Enter, _) if self.focus == FormField::Submit => self.submit(),
            (KeyCode::Enter, _) if self.focus != FormField::Tags => {
                self.set_focus(self.focus.next());
                None
            }
            _ => self.handle_field_input(key),
        }
    }

    fn handle_field_input(&mut self, key: KeyEvent) -> Option<AddContentAction> {
        match self.focus {
            FormField::Type => {
                match key.code {
                    KeyCode::Left | KeyCode::Char('h') => {
                        self.set_content_type(self.content_type.prev())
                    }
                    KeyCode::Right | KeyCode::Char('l') => {
                        self.set_content_type(self.content_type.next())
                    }
                    _ => {}
                }
                None
            }
            FormField::Title => {
                if self.title.handle_input(key) {
                    self.errors.title = None;
                }
                None
            }
            FormField::Body => {
                if self.body.handle_input(key) {
                    self.errors.content = None;
                }
                None
            }
            FormField::Tags => {
                if let Some(TagSelectorAction::Changed(tags)) = self.tags.handle_input(key) {
                    if !tags.is_empty() {
                        self.errors.tags = None;
                    }
                }
                None
            }
            FormField::Submit => None,
        }
    }

    /// Render the form as a modal overlay.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let dialog_area = centered_rect(70.min(area.width.saturating_sub(4)), 22, area);
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(Span::styled(
                " Add Content ",
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
                Constraint::Length(3), // Type
                Constraint::Length(3), // Title
                Constraint::Length(3), // Body
                Constraint::Length(4), // Tags
                Constraint::Length(1), // Status
                Constraint::Length(1), // Submit
                Constraint::Min(0),
            ])
            .split(inner);

        let title_error = self.errors.title.as_ref().map(ToString::to_string);
        let body_error = self.errors.content.as_ref().map(ToString::to_string);
        let tags_error = self.errors.tags.as_ref().map(ToString::to_string);

        self.render_type_field(frame, chunks[0]);
        self.title.render_with_label(
            frame,
            chunks[1],
            "Title *",
            self.focus == FormField::Title,
            title_error.as_deref(),
        );
        let body_label = if self.content_type.is_url() {
            "Source URL *"
        } else {
            "Content *"
        };
        self.body.render_with_label(
            frame,
            chunks[2],
            body_label,
            self.focus == FormField::Body,
            body_error.as_deref(),
        );

        if self.submitting {
            frame.render_widget(
                Paragraph::new(Span::styled("Saving...", Style::default().fg(t.warning)))
                    .alignment(Alignment::Center),
                chunks[4],
            );
        }
        self.render_submit_button(frame, chunks[5]);

        // Last, so the dropdown draws over the fields below it
        self.tags.render(
            frame,
            chunks[3],
            self.focus == FormField::Tags,
            tags_error.as_deref(),
        );
    }

    fn render_type_field(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let focused = self.focus == FormField::Type;

        let spans: Vec<Span> = ContentType::ALL
            .iter()
            .flat_map(|kind| {
                let label = format!(" {} {} ", kind.icon(), kind.as_str());
                let style = if *kind == self.content_type {
                    Style::default()
                        .fg(t.selection_fg)
                        .bg(kind.color())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(t.muted)
                };
                [Span::styled(label, style), Span::raw(" ")]
            })
            .collect();

        let block = Block::default()
            .title(Span::styled(" Type ← → ", t.title_style(focused)))
            .borders(Borders::ALL)
            .border_style(t.border_style(focused));
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_submit_button(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let style = if self.focus == FormField::Submit {
            Style::default()
                .fg(t.selection_fg)
                .bg(t.success)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(t.success)
        };
        let text = if self.submitting {
            " Saving... "
        } else {
            " [Enter] Add Content  (Ctrl+S) "
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, style)).alignment(Alignment::Center),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(view: &mut AddContentView, text: &str) {
        for c in text.chars() {
            view.handle_input(key(KeyCode::Char(c)));
        }
    }

    fn focus(view: &mut AddContentView, field: FormField) {
        while view.focus() != field {
            view.handle_input(key(KeyCode::Tab));
        }
    }

    #[test]
    fn test_new_form() {
        let view = AddContentView::new(vec!["rust".to_string()]);
        assert_eq!(view.content_type(), ContentType::Text);
        assert_eq!(view.focus(), FormField::Type);
        assert!(!view.is_submitting());
        assert_eq!(view.tags().candidates(), ["rust"]);
    }

    #[test]
    fn test_type_picker_cycles() {
        let mut view = AddContentView::new(vec![]);
        view.handle_input(key(KeyCode::Right));
        assert_eq!(view.content_type(), ContentType::Image);
        view.handle_input(key(KeyCode::Left));
        view.handle_input(key(KeyCode::Left));
        assert_eq!(view.content_type(), ContentType::Link);
    }

    #[test]
    fn test_tab_order_wraps() {
        let mut view = AddContentView::new(vec![]);
        for expected in [
            FormField::Title,
            FormField::Body,
            FormField::Tags,
            FormField::Submit,
            FormField::Type,
        ] {
            view.handle_input(key(KeyCode::Tab));
            assert_eq!(view.focus(), expected);
        }
        view.handle_input(key(KeyCode::BackTab));
        assert_eq!(view.focus(), FormField::Submit);
    }

    #[test]
    fn test_leaving_tags_closes_dropdown() {
        let mut view = AddContentView::new(vec!["a".to_string()]);
        focus(&mut view, FormField::Tags);
        assert!(view.tags().is_open());
        view.handle_input(key(KeyCode::Tab));
        assert!(!view.tags().is_open());
    }

    #[test]
    fn test_submit_empty_reports_every_field() {
        let mut view = AddContentView::new(vec![]);
        focus(&mut view, FormField::Submit);
        assert_eq!(view.handle_input(key(KeyCode::Enter)), None);

        let errors = view.errors();
        assert_eq!(errors.title, Some(ValidationError::TitleRequired));
        assert_eq!(errors.content, Some(ValidationError::ContentRequired));
        assert_eq!(errors.tags, Some(ValidationError::TagsRequired));
        assert!(!view.is_submitting());
    }

    #[test]
    fn test_submit_valid_form() {
        let mut view = AddContentView::new(vec![]);
        view.handle_input(key(KeyCode::Right)); // image
        focus(&mut view, FormField::Title);
        type_text(&mut view, "  Sunset ");
        focus(&mut view, FormField::Body);
        type_text(&mut view, "https://img.example.com/sun.png");
        focus(&mut view, FormField::Tags);
        type_text(&mut view, "photo");
        view.handle_input(key(KeyCode::Enter));
        assert_eq!(view.tags().tags(), ["photo"]);

        focus(&mut view, FormField::Submit);
        let action = view.handle_input(key(KeyCode::Enter));
        assert_eq!(
            action,
            Some(AddContentAction::Submit(NewContent {
                title: "Sunset".to_string(),
                link: "https://img.example.com/sun.png".to_string(),
                content_type: ContentType::Image,
                tags: vec!["photo".to_string()],
            }))
        );
        assert!(view.is_submitting());
        // Input is ignored while submitting
        assert_eq!(view.handle_input(key(KeyCode::Esc)), None);
    }

    #[test]
    fn test_failed_submit_keeps_state() {
        let mut view = AddContentView::new(vec![]);
        focus(&mut view, FormField::Title);
        type_text(&mut view, "Note");
        focus(&mut view, FormField::Body);
        type_text(&mut view, "remember this");
        focus(&mut view, FormField::Tags);
        type_text(&mut view, "todo");
        view.handle_input(key(KeyCode::Enter));

        let first = view.handle_input(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(first.is_some());
        view.submit_failed();
        assert!(!view.is_submitting());

        let again = view.handle_input(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(first, again);
    }

    #[test]
    fn test_typing_clears_field_error() {
        let mut view = AddContentView::new(vec![]);
        focus(&mut view, FormField::Submit);
        view.handle_input(key(KeyCode::Enter));
        focus(&mut view, FormField::Title);
        type_text(&mut view, "x");
        assert_eq!(view.errors().title, None);
        assert!(view.errors().content.is_some());
    }

    #[test]
    fn test_escape_closes_dropdown_before_form() {
        let mut view = AddContentView::new(vec!["a".to_string()]);
        focus(&mut view, FormField::Tags);
        assert_eq!(view.handle_input(key(KeyCode::Esc)), None);
        assert!(!view.tags().is_open());
        assert_eq!(
            view.handle_input(key(KeyCode::Esc)),
            Some(AddContentAction::Cancel)
        );
    }

    #[test]
    fn test_enter_in_tags_commits_tag_not_field() {
        let mut view = AddContentView::new(vec![]);
        focus(&mut view, FormField::Tags);
        type_text(&mut view, "new");
        view.handle_input(key(KeyCode::Enter));
        assert_eq!(view.focus(), FormField::Tags);
        assert_eq!(view.tags().tags(), ["new"]);
    }
}
