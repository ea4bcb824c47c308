//! Content list view.
//!
//! Shows one category of a collection: the signed-in user's own content, or
//! another user's shared brain. The view owns its loading/error/empty states
//! and the request feeding them.
//!
//! At most one fetch is in flight per view. Starting a new one aborts the
//! previous task and replaces the in-flight slot, so a late response that was
//! already queued carries an id that no longer matches and is discarded.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use tokio::task::AbortHandle;
use tracing::debug;

use crate::api::error::ApiError;
use crate::api::types::{Content, ContentType, Listing};
use crate::tasks::ListingQuery;
use crate::ui::components::LoadingIndicator;
use crate::ui::theme::theme;

/// A sidebar selection: which slice of the collection to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Every item.
    All,
    /// Items of one type.
    Kind(ContentType),
    /// The tag listing.
    Tags,
}

impl Category {
    /// Categories in sidebar order.
    pub const ALL: [Category; 7] = [
        Category::All,
        Category::Kind(ContentType::Text),
        Category::Kind(ContentType::Video),
        Category::Kind(ContentType::Image),
        Category::Kind(ContentType::Link),
        Category::Kind(ContentType::Audio),
        Category::Tags,
    ];

    /// Sidebar label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All Content",
            Category::Kind(ContentType::Text) => "Documents",
            Category::Kind(ContentType::Video) => "Videos",
            Category::Kind(ContentType::Image) => "Images",
            Category::Kind(ContentType::Link) => "Links",
            Category::Kind(ContentType::Audio) => "Audios",
            Category::Tags => "Tags",
        }
    }

    /// Sidebar icon.
    pub fn icon(&self) -> &'static str {
        match self {
            Category::All => "◆",
            Category::Kind(kind) => kind.icon(),
            Category::Tags => "#",
        }
    }
}

/// Whose collection the view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSource {
    /// The signed-in user's collection.
    Own,
    /// Another user's shared collection, by user ID.
    Shared(String),
}

/// A fetch the owner should spawn, then attach with [`ContentListView::track`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Request identifier, echoed back with the result.
    pub id: u64,
    /// What to fetch.
    pub query: ListingQuery,
}

/// Render state of the list.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// A fetch is outstanding.
    Loading,
    /// The last fetch failed.
    Error(String),
    /// The last fetch succeeded.
    Loaded(Listing),
}

/// Actions returned from the content list.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentListAction {
    /// Open the viewer for an item.
    Open(Content),
    /// Ask for confirmation, then delete an item.
    Delete(Content),
    /// Spawn a new fetch.
    Fetch(FetchRequest),
}

/// One visible row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Row<'a> {
    /// A content item.
    Item(&'a Content),
    /// A tag title.
    Tag(&'a str),
}

/// The outstanding request.
#[derive(Debug)]
struct InFlight {
    id: u64,
    handle: Option<AbortHandle>,
}

/// Keep the items belonging to `category`.
///
/// `All` keeps everything. `Tags` is a separate listing, so it does not narrow
/// item collections.
pub fn filter_contents(items: &[Content], category: Category) -> Vec<&Content> {
    match category {
        Category::All | Category::Tags => items.iter().collect(),
        Category::Kind(kind) => items.iter().filter(|c| c.content_type == kind).collect(),
    }
}

/// Distinct tag titles across `items`, in first-seen order.
fn tag_titles(items: &[Content]) -> Vec<&str> {
    let mut titles: Vec<&str> = Vec::new();
    for tag in items.iter().flat_map(|c| c.tags.iter()) {
        if !titles.contains(&tag.title.as_str()) {
            titles.push(&tag.title);
        }
    }
    titles
}

/// The content list view.
#[derive(Debug)]
pub struct ContentListView {
    source: FetchSource,
    category: Category,
    state: LoadState,
    in_flight: Option<InFlight>,
    next_request_id: u64,
    selected: usize,
    spinner: LoadingIndicator,
}

impl ContentListView {
    /// Create a view over the given collection.
    ///
    /// Nothing is fetched until [`Self::refresh`] is called.
    pub fn new(source: FetchSource) -> Self {
        Self {
            source,
            category: Category::All,
            state: LoadState::Loading,
            in_flight: None,
            next_request_id: 0,
            selected: 0,
            spinner: LoadingIndicator::with_message("Loading content..."),
        }
    }

    /// Get the source.
    pub fn source(&self) -> &FetchSource {
        &self.source
    }

    /// Whether items can be deleted from this view.
    pub fn is_read_only(&self) -> bool {
        matches!(self.source, FetchSource::Shared(_))
    }

    /// Get the active category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Get the render state.
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Get the selected row index.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Whether `id` is the outstanding request.
    pub fn is_current(&self, id: u64) -> bool {
        self.in_flight.as_ref().is_some_and(|f| f.id == id)
    }

    /// Whether a request is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The query for the current source and category.
    fn query(&self) -> ListingQuery {
        match (&self.source, self.category) {
            (FetchSource::Shared(user_id), _) => ListingQuery::Shared(user_id.clone()),
            (FetchSource::Own, Category::Tags) => ListingQuery::Tags,
            (FetchSource::Own, _) => ListingQuery::Contents,
        }
    }

    /// Switch category and start a fetch for it.
    pub fn set_category(&mut self, category: Category) -> FetchRequest {
        self.category = category;
        self.selected = 0;
        self.refresh()
    }

    /// Start a fetch, superseding any outstanding one.
    pub fn refresh(&mut self) -> FetchRequest {
        self.cancel();
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some(InFlight { id, handle: None });
        self.state = LoadState::Loading;
        debug!(id, category = self.category.label(), "Content fetch started");
        FetchRequest {
            id,
            query: self.query(),
        }
    }

    /// Attach the task running request `id`.
    ///
    /// A handle for a request that is no longer outstanding is aborted.
    pub fn track(&mut self, id: u64, handle: AbortHandle) {
        match self.in_flight.as_mut() {
            Some(flight) if flight.id == id => flight.handle = Some(handle),
            _ => handle.abort(),
        }
    }

    /// Abort the outstanding request, if any.
    pub fn cancel(&mut self) {
        if let Some(flight) = self.in_flight.take() {
            debug!(id = flight.id, "Content fetch cancelled");
            if let Some(handle) = flight.handle {
                handle.abort();
            }
        }
    }

    /// Apply the result of request `id`.
    ///
    /// Returns false when the result was discarded: stale, or an aborted
    /// request.
    pub fn apply(&mut self, id: u64, result: Result<Listing, ApiError>) -> bool {
        if !self.is_current(id) {
            debug!(id, "Discarding stale content fetch result");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(listing) => {
                self.state = LoadState::Loaded(listing);
                self.clamp_selection();
                true
            }
            Err(e) if e.is_aborted() => false,
            Err(e) => {
                self.state = LoadState::Error(e.user_message());
                true
            }
        }
    }

    /// Rows visible under the current category.
    pub fn rows(&self) -> Vec<Row<'_>> {
        match &self.state {
            LoadState::Loaded(Listing::Tags(tags)) => tags.iter().map(|t| Row::Tag(t)).collect(),
            LoadState::Loaded(Listing::Contents(items)) if self.category == Category::Tags => {
                tag_titles(items).into_iter().map(Row::Tag).collect()
            }
            LoadState::Loaded(Listing::Contents(items)) => filter_contents(items, self.category)
                .into_iter()
                .map(Row::Item)
                .collect(),
            LoadState::Loading | LoadState::Error(_) => Vec::new(),
        }
    }

    /// The owner of a shared collection, taken from the first item.
    pub fn owner_name(&self) -> Option<&str> {
        match &self.state {
            LoadState::Loaded(Listing::Contents(items)) => {
                items.first().and_then(|c| c.owner_name())
            }
            _ => None,
        }
    }

    /// The item under the cursor.
    pub fn selected_item(&self) -> Option<&Content> {
        match self.rows().get(self.selected).copied() {
            Some(Row::Item(content)) => Some(content),
            _ => None,
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Advance the loading spinner.
    pub fn tick(&mut self) {
        if self.state == LoadState::Loading {
            self.spinner.tick();
        }
    }

    /// Handle keyboard input.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ContentListAction> {
        let len = self.rows().len();
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                if len > 0 && self.selected + 1 < len {
                    self.selected += 1;
                }
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                self.selected = 0;
                None
            }
            (KeyCode::Char('G'), KeyModifiers::SHIFT | KeyModifiers::NONE) | (KeyCode::End, _) => {
                self.selected = len.saturating_sub(1);
                None
            }
            (KeyCode::Enter, _) => self.selected_item().cloned().map(ContentListAction::Open),
            (KeyCode::Char('d'), KeyModifiers::NONE) if !self.is_read_only() => {
                self.selected_item().cloned().map(ContentListAction::Delete)
            }
            (KeyCode::Char('r'), KeyModifiers::NONE) => {
                Some(ContentListAction::Fetch(self.refresh()))
            }
            _ => None,
        }
    }

    /// Render the list.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let title = match (&self.source, self.owner_name()) {
            (FetchSource::Shared(_), Some(owner)) => {
                format!(" {}'s brain · {} ", owner, self.category.label())
            }
            (FetchSource::Shared(_), None) => format!(" Shared brain · {} ", self.category.label()),
            (FetchSource::Own, _) => format!(" {} ", self.category.label()),
        };
        let block = Block::default()
            .title(Span::styled(title, t.title_style(true)))
            .borders(Borders::ALL)
            .border_style(t.border_style(false));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match &self.state {
            LoadState::Loading => self.spinner.render(frame, centered_line(inner)),
            LoadState::Error(message) => {
                let text = vec![
                    Line::from(Span::styled(
                        message.as_str(),
                        Style::default().fg(t.error).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled("Press r to retry", Style::default().fg(t.muted))),
                ];
                frame.render_widget(
                    Paragraph::new(text).alignment(Alignment::Center),
                    centered_line(inner),
                );
            }
            LoadState::Loaded(_) => self.render_rows(frame, inner),
        }
    }

    fn render_rows(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let rows = self.rows();
        if rows.is_empty() {
            let message = match self.category {
                Category::Tags => "No tags yet.".to_string(),
                Category::All => "Nothing here yet. Press a to add content.".to_string(),
                other => format!("No {} yet.", other.label().to_lowercase()),
            };
            frame.render_widget(
                Paragraph::new(Span::styled(message, Style::default().fg(t.muted)))
                    .alignment(Alignment::Center),
                centered_line(area),
            );
            return;
        }

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| match row {
                Row::Item(content) => {
                    let kind = content.content_type;
                    let mut spans = vec![
                        Span::styled(format!("{} ", kind.icon()), Style::default().fg(kind.color())),
                        Span::styled(content.title.as_str(), Style::default().fg(t.fg)),
                    ];
                    for tag in &content.tags {
                        spans.push(Span::styled(
                            format!("  #{}", tag.title),
                            Style::default().fg(t.tag),
                        ));
                    }
                    ListItem::new(Line::from(spans))
                }
                Row::Tag(title) => ListItem::new(Line::from(Span::styled(
                    format!("# {}", title),
                    Style::default().fg(t.tag),
                ))),
            })
            .collect();

        let list = List::new(items)
            .highlight_style(t.selection_style())
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

impl Drop for ContentListView {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A one-or-two line strip in the vertical middle of `area`.
fn centered_line(area: Rect) -> Rect {
    let height = area.height.min(2);
    Rect::new(area.x, area.y + area.height.saturating_sub(height) / 2, area.width, height)
}
