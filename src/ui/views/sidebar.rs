//! Category sidebar.
//!
//! Lists the categories of the content list. On wide terminals it shows
//! icons and labels; collapsed it shows icons only.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use super::content_list::Category;
use crate::ui::theme::theme;

/// Terminal width (columns) at or above which the sidebar starts open.
pub const SIDEBAR_BREAKPOINT: u16 = 96;

/// Width of the open sidebar.
pub const OPEN_WIDTH: u16 = 22;

/// Width of the collapsed sidebar.
pub const COLLAPSED_WIDTH: u16 = 5;

/// Open/closed state and category selection.
#[derive(Debug, Clone)]
pub struct SidebarState {
    open: bool,
    /// Which side of the breakpoint the last width report was on.
    wide: bool,
    selected: usize,
}

impl SidebarState {
    /// Create the state for a terminal `width` columns wide.
    ///
    /// `width` is the first size report; it sets the initial state and
    /// later resizes are compared against it.
    pub fn new(width: u16) -> Self {
        let wide = width >= SIDEBAR_BREAKPOINT;
        Self {
            open: wide,
            wide,
            selected: 0,
        }
    }

    /// Whether the sidebar is expanded.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Toggle expanded/collapsed. Holds until the next breakpoint crossing.
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Follow a terminal resize.
    ///
    /// The state is reset to the breakpoint's default when the width crosses
    /// it, and left alone otherwise.
    pub fn on_resize(&mut self, width: u16) {
        let wide = width >= SIDEBAR_BREAKPOINT;
        if wide != self.wide {
            self.wide = wide;
            self.open = wide;
        }
    }

    /// Columns the sidebar occupies.
    pub fn width(&self) -> u16 {
        if self.open {
            OPEN_WIDTH
        } else {
            COLLAPSED_WIDTH
        }
    }

    /// The highlighted category.
    pub fn category(&self) -> Category {
        Category::ALL[self.selected]
    }

    /// Highlight `category`.
    pub fn select(&mut self, category: Category) {
        if let Some(idx) = Category::ALL.iter().position(|c| *c == category) {
            self.selected = idx;
        }
    }

    /// Handle a category key. Returns the new category when it changed.
    ///
    /// `1`-`7` pick directly; `[` and `]` step with wrap-around.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<Category> {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return None;
        }
        let len = Category::ALL.len();
        let next = match key.code {
            KeyCode::Char(c @ '1'..='7') => (c as usize) - ('1' as usize),
            KeyCode::Char(']') => (self.selected + 1) % len,
            KeyCode::Char('[') => (self.selected + len - 1) % len,
            _ => return None,
        };
        if next == self.selected {
            return None;
        }
        self.selected = next;
        Some(self.category())
    }

    /// Render the sidebar.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let items: Vec<ListItem> = Category::ALL
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let line = if self.open {
                    Line::from(vec![
                        Span::styled(format!("{} ", category.icon()), Style::default().fg(t.accent)),
                        Span::raw(category.label()),
                        Span::styled(format!(" {}", i + 1), Style::default().fg(t.muted)),
                    ])
                } else {
                    Line::from(Span::styled(category.icon(), Style::default().fg(t.accent)))
                };
                ListItem::new(line)
            })
            .collect();

        let mut block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(t.border_style(false));
        if self.open {
            block = block
                .title(Span::styled(
                    " Extra Memory ",
                    Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
                ))
                .title_bottom(Span::styled(" ^B ^L Logout ", Style::default().fg(t.muted)));
        } else {
            block = block.title(Span::styled("◈", Style::default().fg(t.accent)));
        }

        let list = List::new(items)
            .block(block)
            .highlight_style(t.selection_style());
        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ContentType;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_initial_state_follows_width() {
        assert!(SidebarState::new(120).is_open());
        assert!(SidebarState::new(96).is_open());
        assert!(!SidebarState::new(95).is_open());
    }

    #[test]
    fn test_resize_on_same_side_keeps_toggle() {
        let mut sidebar = SidebarState::new(120);
        sidebar.toggle();
        sidebar.on_resize(130);
        assert!(!sidebar.is_open());
    }

    #[test]
    fn test_first_resize_crossing_breakpoint_applies() {
        let mut sidebar = SidebarState::new(120);
        sidebar.on_resize(80);
        assert!(!sidebar.is_open());

        let mut sidebar = SidebarState::new(80);
        sidebar.on_resize(120);
        assert!(sidebar.is_open());
    }

    #[test]
    fn test_crossing_overrides_toggle() {
        let mut sidebar = SidebarState::new(120);
        sidebar.toggle();
        assert!(!sidebar.is_open());

        // Same side of the breakpoint: manual choice holds
        sidebar.on_resize(110);
        assert!(!sidebar.is_open());

        sidebar.on_resize(80);
        assert!(!sidebar.is_open());
        sidebar.toggle();
        assert!(sidebar.is_open());
        sidebar.on_resize(90);
        assert!(sidebar.is_open());

        sidebar.on_resize(100);
        assert!(sidebar.is_open());
        sidebar.on_resize(60);
        assert!(!sidebar.is_open());
    }

    #[test]
    fn test_width() {
        let mut sidebar = SidebarState::new(120);
        assert_eq!(sidebar.width(), OPEN_WIDTH);
        sidebar.toggle();
        assert_eq!(sidebar.width(), COLLAPSED_WIDTH);
    }

    #[test]
    fn test_number_keys_pick_category() {
        let mut sidebar = SidebarState::new(120);
        assert_eq!(sidebar.handle_input(key('1')), None);
        assert_eq!(
            sidebar.handle_input(key('2')),
            Some(Category::Kind(ContentType::Text))
        );
        assert_eq!(sidebar.handle_input(key('7')), Some(Category::Tags));
        assert_eq!(sidebar.handle_input(key('8')), None);
    }

    #[test]
    fn test_bracket_keys_wrap() {
        let mut sidebar = SidebarState::new(120);
        assert_eq!(sidebar.handle_input(key('[')), Some(Category::Tags));
        assert_eq!(sidebar.handle_input(key(']')), Some(Category::All));
    }

    #[test]
    fn test_select() {
        let mut sidebar = SidebarState::new(120);
        sidebar.select(Category::Kind(ContentType::Audio));
        assert_eq!(sidebar.category(), Category::Kind(ContentType::Audio));
    }
}
