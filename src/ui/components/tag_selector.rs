//! Tag selector component.
//!
//! An input with a suggestion dropdown for building a small set of unique
//! tags. Tags can be picked from a candidate pool or coined from the typed
//! text through a synthetic "add new tag" row.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::input::TextInput;

/// Maximum number of dropdown rows drawn at once.
const MAX_DROPDOWN_ROWS: u16 = 6;

/// Action resulting from tag selector input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSelectorAction {
    /// The selected tags changed; carries the full new sequence.
    Changed(Vec<String>),
}

/// Visibility of the suggestion dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownState {
    /// Dropdown hidden.
    Closed,
    /// Dropdown shown, candidates filtered by the typed text.
    OpenFiltered,
    /// Dropdown shown with an empty input, listing every unselected candidate.
    OpenUnfiltered,
}

/// Tag selector component.
#[derive(Debug, Default)]
pub struct TagSelector {
    /// Selected tags in insertion order.
    tags: Vec<String>,
    /// All available tags.
    candidates: Vec<String>,
    /// Candidates matching the input that are not yet selected.
    filtered: Vec<String>,
    /// Typed text.
    input: TextInput,
    /// Whether the dropdown is shown.
    open: bool,
    /// Highlighted dropdown row; `None` when nothing is highlighted.
    highlighted: Option<usize>,
}

impl TagSelector {
    /// Create an empty tag selector.
    pub fn new() -> Self {
        let mut input = TextInput::new();
        input.set_placeholder("Type to search or add a tag");
        Self {
            input,
            ..Self::default()
        }
    }

    /// Create a tag selector with the given candidate pool.
    pub fn with_candidates(candidates: Vec<String>) -> Self {
        let mut selector = Self::new();
        selector.set_candidates(candidates);
        selector
    }

    /// Get the selected tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Get the candidate pool.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Get the filtered candidates currently offered.
    pub fn filtered(&self) -> &[String] {
        &self.filtered
    }

    /// Get the typed text.
    pub fn input(&self) -> &str {
        self.input.value()
    }

    /// Get the highlighted row.
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Get the dropdown state.
    pub fn dropdown_state(&self) -> DropdownState {
        if !self.open {
            DropdownState::Closed
        } else if self.input.is_empty() {
            DropdownState::OpenUnfiltered
        } else {
            DropdownState::OpenFiltered
        }
    }

    /// Check if the dropdown is shown.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Replace the candidate pool.
    pub fn set_candidates(&mut self, candidates: Vec<String>) {
        self.candidates = candidates;
        self.refilter();
    }

    /// Clear tags and input and close the dropdown.
    pub fn reset(&mut self) {
        self.tags.clear();
        self.input.clear();
        self.open = false;
        self.refilter();
    }

    /// Focus entered the control.
    pub fn focus(&mut self) {
        self.open = true;
    }

    /// Focus left the control.
    pub fn blur(&mut self) {
        self.open = false;
        self.highlighted = None;
    }

    /// The trimmed input, if it could become a new tag.
    fn pending_text(&self) -> Option<&str> {
        let text = self.input.value().trim();
        (!text.is_empty()).then_some(text)
    }

    /// Number of navigable rows, including the "add new tag" row.
    fn row_count(&self) -> usize {
        self.filtered.len() + usize::from(self.pending_text().is_some())
    }

    /// Recompute the filtered list and drop the highlight.
    fn refilter(&mut self) {
        let query = self.input.value().to_lowercase();
        self.filtered = self
            .candidates
            .iter()
            .filter(|c| !self.tags.contains(c))
            .filter(|c| query.is_empty() || c.to_lowercase().contains(&query))
            .cloned()
            .collect();
        self.highlighted = None;
    }

    /// Replace the typed text.
    pub fn on_input_change(&mut self, text: &str) {
        self.input.set_value(text);
        self.input_changed();
    }

    fn input_changed(&mut self) {
        if !self.input.is_empty() {
            self.open = true;
        }
        self.refilter();
    }

    /// Add a tag.
    ///
    /// Empty and duplicate tags are ignored.
    pub fn add_tag(&mut self, tag: &str) -> Option<TagSelectorAction> {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return None;
        }
        self.tags.push(tag.to_string());
        self.input.clear();
        self.open = false;
        self.refilter();
        Some(TagSelectorAction::Changed(self.tags.clone()))
    }

    /// Remove the first tag equal to `tag`.
    pub fn remove_tag(&mut self, tag: &str) -> Option<TagSelectorAction> {
        let index = self.tags.iter().position(|t| t == tag)?;
        self.tags.remove(index);
        self.refilter();
        Some(TagSelectorAction::Changed(self.tags.clone()))
    }

    /// Handle keyboard input.
    ///
    /// Returns an action when the selected tags change.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<TagSelectorAction> {
        match key.code {
            KeyCode::Down => {
                self.open = true;
                let rows = self.row_count();
                if rows > 0 {
                    self.highlighted = Some(match self.highlighted {
                        None => 0,
                        Some(i) => (i + 1) % rows,
                    });
                }
                None
            }
            KeyCode::Up => {
                self.open = true;
                let rows = self.row_count();
                if rows > 0 {
                    self.highlighted = Some(match self.highlighted {
                        None => rows - 1,
                        Some(i) => (i + rows - 1) % rows,
                    });
                }
                None
            }
            KeyCode::Enter => match self.highlighted {
                Some(i) if i < self.filtered.len() => {
                    let tag = self.filtered[i].clone();
                    self.add_tag(&tag)
                }
                _ => {
                    let text = self.pending_text()?.to_string();
                    self.add_tag(&text)
                }
            },
            KeyCode::Esc => {
                self.blur();
                None
            }
            KeyCode::Backspace if self.input.is_empty() => {
                let last = self.tags.last()?.clone();
                self.remove_tag(&last)
            }
            _ => {
                if self.input.handle_input(key) {
                    self.input_changed();
                }
                None
            }
        }
    }

    /// Render the selector: chips, then the input box.
    ///
    /// The dropdown is drawn below `area` on top of whatever is there, so
    /// render this after sibling widgets.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool, error: Option<&str>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(3)])
            .split(area);

        self.render_chips(frame, chunks[0]);
        self.input
            .render_with_label(frame, chunks[1], "Tags", focused, error);

        if focused && self.open {
            let bounds = frame.area();
            self.render_dropdown(frame, chunks[1], bounds);
        }
    }

    fn render_chips(&self, frame: &mut Frame, area: Rect) {
        if self.tags.is_empty() {
            frame.render_widget(
                Paragraph::new("No tags yet").style(Style::default().fg(Color::DarkGray)),
                area,
            );
            return;
        }

        let mut spans = Vec::with_capacity(self.tags.len() * 2);
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                format!(" #{} ", tag),
                Style::default().fg(Color::White).bg(Color::Blue),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true }), area);
    }

    fn render_dropdown(&self, frame: &mut Frame, anchor: Rect, bounds: Rect) {
        let mut items: Vec<ListItem> = self
            .filtered
            .iter()
            .map(|tag| ListItem::new(format!("  {}", tag)))
            .collect();
        if let Some(text) = self.pending_text() {
            items.push(
                ListItem::new(format!("+ Add \"{}\"", text))
                    .style(Style::default().fg(Color::Green)),
            );
        }

        let rows = if items.is_empty() {
            1
        } else {
            (items.len() as u16).min(MAX_DROPDOWN_ROWS)
        };
        let top = anchor.y + anchor.height;
        let height = (rows + 2).min(bounds.bottom().saturating_sub(top));
        if height < 3 {
            return;
        }
        let dropdown = Rect::new(anchor.x, top, anchor.width, height);
        frame.render_widget(Clear, dropdown);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));

        if items.is_empty() {
            frame.render_widget(
                Paragraph::new("No tags available")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(block),
                dropdown,
            );
            return;
        }

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(self.highlighted);
        frame.render_stateful_widget(list, dropdown, &mut state);
    }
}
