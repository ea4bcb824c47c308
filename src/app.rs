//! Main application state and event loop.
//!
//! This module implements The Elm Architecture (TEA) pattern for predictable
//! state management in the TUI application. Terminal events arrive through
//! [`App::update`], backend results through [`App::handle_api_message`], and
//! [`App::view`] draws the current state.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tokio::task::AbortHandle;
use tracing::{debug, info, trace, warn};

use crate::api::types::{Content, ContentType};
use crate::api::{AuthContext, MemoryClient, PreviewClient};
use crate::config::Config;
use crate::error::AppError;
use crate::events::Event;
use crate::tasks::{ApiMessage, TaskSpawner};
use crate::ui::components::ConfirmAction;
use crate::ui::theme::theme;
use crate::ui::views::{
    AddContentAction, AuthFormAction, AuthFormView, AuthMode, ContentListAction, ContentListView,
    ContentViewerAction, FetchRequest, FetchSource, ShareBrainAction, SidebarState,
};
use crate::ui::{ConfirmDialog, NotificationManager, Overlay, OverlayAction, Severity};

/// The screen being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Sign-in form.
    Login,
    /// Account creation form.
    Signup,
    /// The signed-in user's collection.
    Dashboard,
    /// Someone else's shared collection, read-only.
    SharedBrain,
}

/// Work to run once a toast has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Leave the login screen for the dashboard.
    EnterDashboard,
}

/// The main application struct that holds all state.
///
/// This implements the Model part of The Elm Architecture (TEA).
pub struct App {
    screen: Screen,
    should_quit: bool,
    config: Config,
    auth: AuthContext,
    client: MemoryClient,
    previews: PreviewClient,
    tasks: TaskSpawner,
    notifications: NotificationManager<FollowUp>,
    auth_form: AuthFormView,
    content_list: ContentListView,
    sidebar: SidebarState,
    overlay: Overlay,
    /// Pending delete confirmation, carrying the content ID.
    confirm: Option<ConfirmDialog<String>>,
    /// Suggestions offered by the add-content tag selector.
    tag_pool: Vec<String>,
    /// Tasks not owned by a view: auth, mutations, tag pool.
    background: Vec<AbortHandle>,
}

impl App {
    /// Create the application.
    ///
    /// Nothing is fetched until [`Self::start`] or [`Self::open_shared`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured backend URL is unusable.
    pub fn new(
        config: Config,
        auth: AuthContext,
        tasks: TaskSpawner,
        width: u16,
    ) -> Result<Self, AppError> {
        debug!("Creating new application instance");
        let client = MemoryClient::new(&config.backend_url)?;
        let previews = PreviewClient::new(&config.link_preview_url)?;
        let notifications = NotificationManager::with_default_duration(Duration::from_millis(
            config.settings.notification_duration_ms,
        ));
        let tag_pool = config.settings.fallback_tags.clone();

        Ok(Self {
            screen: Screen::Login,
            should_quit: false,
            config,
            auth,
            client,
            previews,
            tasks,
            notifications,
            auth_form: AuthFormView::new(AuthMode::Login),
            content_list: ContentListView::new(FetchSource::Own),
            sidebar: SidebarState::new(width),
            overlay: Overlay::None,
            confirm: None,
            tag_pool,
            background: Vec::new(),
        })
    }

    /// Show the dashboard if a token is stored, otherwise the login form.
    pub fn start(&mut self) {
        if self.auth.is_authenticated() {
            self.enter_dashboard();
        } else {
            self.show_auth(AuthMode::Login);
        }
    }

    /// Show another user's shared collection.
    pub fn open_shared(&mut self, user_id: impl Into<String>) {
        let user_id = user_id.into();
        info!(user_id = %user_id, "Opening shared brain");
        self.overlay.close();
        self.confirm = None;
        self.screen = Screen::SharedBrain;
        self.content_list = ContentListView::new(FetchSource::Shared(user_id));
        self.sidebar.select(self.content_list.category());
        let request = self.content_list.refresh();
        self.spawn_fetch(request);
    }

    /// Returns whether the application should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Returns the current screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a reference to the notification manager.
    pub fn notifications(&self) -> &NotificationManager<FollowUp> {
        &self.notifications
    }

    /// Get the open modal.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Get the sidebar state.
    pub fn sidebar(&self) -> &SidebarState {
        &self.sidebar
    }

    /// Get the content list.
    pub fn content_list(&self) -> &ContentListView {
        &self.content_list
    }

    /// Get the auth form.
    pub fn auth_form(&self) -> &AuthFormView {
        &self.auth_form
    }

    /// Whether a delete confirmation is showing.
    pub fn is_confirming(&self) -> bool {
        self.confirm.is_some()
    }

    /// A client carrying the current token.
    fn authed_client(&self) -> MemoryClient {
        self.client.with_token(self.auth.get())
    }

    fn track(&mut self, handle: AbortHandle) {
        self.background.retain(|h| !h.is_finished());
        self.background.push(handle);
    }

    fn abort_background(&mut self) {
        for handle in self.background.drain(..) {
            handle.abort();
        }
    }

    // ========================================================================
    // Screen transitions
    // ========================================================================

    fn show_auth(&mut self, mode: AuthMode) {
        debug!(?mode, "Showing auth form");
        self.screen = match mode {
            AuthMode::Login => Screen::Login,
            AuthMode::Signup => Screen::Signup,
        };
        self.auth_form = AuthFormView::new(mode);
    }

    fn enter_dashboard(&mut self) {
        info!("Entering dashboard");
        self.screen = Screen::Dashboard;
        self.overlay.close();
        self.confirm = None;
        self.content_list = ContentListView::new(FetchSource::Own);
        self.sidebar.select(self.content_list.category());
        let request = self.content_list.refresh();
        self.spawn_fetch(request);
    }

    /// Forget the session and go back to the login form.
    fn logout(&mut self) {
        info!("Logging out");
        if let Err(e) = self.auth.clear() {
            warn!("Failed to clear stored token: {}", e);
        }
        self.abort_background();
        self.overlay.close();
        self.confirm = None;
        self.content_list = ContentListView::new(FetchSource::Own);
        self.show_auth(AuthMode::Login);
    }

    fn spawn_fetch(&mut self, request: FetchRequest) {
        let handle = self
            .tasks
            .spawn_fetch_listing(&self.authed_client(), request.id, request.query);
        self.content_list.track(request.id, handle);
    }

    /// Open the viewer, looking up a preview for links.
    fn open_viewer(&mut self, content: Content) {
        if content.content_type == ContentType::Link {
            let handle = self.tasks.spawn_link_preview(
                &self.previews,
                content.id.clone(),
                content.link.clone(),
            );
            self.track(handle);
        }
        self.overlay.open_viewer(content);
    }

    // ========================================================================
    // Errors and notifications
    // ========================================================================

    /// Surface an error to the user.
    ///
    /// Cancellations are dropped. A lost session on the dashboard sends the
    /// user back to the login form.
    pub fn handle_error(&mut self, error: AppError) {
        if error.is_silent() {
            trace!("Ignoring cancelled request");
            return;
        }
        if error.requires_signin() && self.screen == Screen::Dashboard {
            warn!(error = %error, "Session lost");
            self.logout();
            self.notifications
                .warning("Your session has expired. Please sign in again.");
            return;
        }
        debug!(error = %error, "Recoverable error occurred");
        self.notifications.error(error.user_message());
    }

    fn run_follow_up(&mut self, follow_up: FollowUp) {
        match follow_up {
            FollowUp::EnterDashboard => {
                if self.auth.is_authenticated() && self.screen == Screen::Login {
                    self.enter_dashboard();
                }
            }
        }
    }

    fn copy_to_clipboard(&mut self, text: &str) {
        let result = arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text.to_string()));
        match result {
            Ok(()) => {
                self.notifications.success("Link Copied");
            }
            Err(e) => self.handle_error(AppError::other(format!("Clipboard unavailable: {e}"))),
        }
    }

    fn open_url(&mut self, url: &str) {
        if let Err(e) = open::that(url) {
            self.handle_error(AppError::other(format!("Could not open {url}: {e}")));
        }
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Update the application state based on an event.
    ///
    /// This implements the Update part of The Elm Architecture (TEA).
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Quit => {
                info!("Quit event received");
                self.should_quit = true;
            }
            Event::Key(key_event) => {
                trace!(key = ?key_event.code, modifiers = ?key_event.modifiers, "Key event");
                self.handle_key_event(key_event);
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
                self.sidebar.on_resize(width);
            }
            Event::Tick => self.handle_tick_at(Instant::now()),
        }
    }

    fn handle_tick_at(&mut self, now: Instant) {
        for dismissed in self.notifications.tick_at(now) {
            if let Some(follow_up) = dismissed.on_complete {
                self.run_follow_up(follow_up);
            }
        }
        self.auth_form.tick();
        self.content_list.tick();
        self.overlay.tick();
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            (KeyCode::Char('x'), KeyModifiers::CONTROL) => {
                self.notifications.close_latest();
                return;
            }
            _ => {}
        }

        if let Some(dialog) = &self.confirm {
            if let Some(action) = dialog.handle_input(key) {
                self.confirm = None;
                if let ConfirmAction::Confirm(content_id) = action {
                    info!(content_id = %content_id, "Deleting content");
                    let handle = self
                        .tasks
                        .spawn_delete_content(&self.authed_client(), content_id);
                    self.track(handle);
                }
            }
            return;
        }

        match self.screen {
            Screen::Login | Screen::Signup => self.handle_auth_key(key),
            Screen::Dashboard | Screen::SharedBrain => self.handle_collection_key(key),
        }
    }

    fn handle_auth_key(&mut self, key: KeyEvent) {
        let Some(action) = self.auth_form.handle_input(key) else {
            return;
        };
        match action {
            AuthFormAction::Submit(AuthMode::Login, credentials) => {
                let handle = self.tasks.spawn_signin(&self.client, credentials);
                self.track(handle);
            }
            AuthFormAction::Submit(AuthMode::Signup, credentials) => {
                let handle = self.tasks.spawn_signup(&self.client, credentials);
                self.track(handle);
            }
            AuthFormAction::SwitchMode(mode) => self.show_auth(mode),
            AuthFormAction::Quit => self.should_quit = true,
        }
    }

    fn handle_collection_key(&mut self, key: KeyEvent) {
        if self.overlay.is_scroll_locked() {
            if let Some(action) = self.overlay.handle_input(key) {
                self.handle_overlay_action(action);
            }
            return;
        }

        let own = self.screen == Screen::Dashboard;
        match (key.code, key.modifiers) {
            (KeyCode::Char('b'), KeyModifiers::CONTROL) => {
                self.sidebar.toggle();
                return;
            }
            (KeyCode::Char('l'), KeyModifiers::CONTROL) if own => {
                self.logout();
                self.notifications.info("Signed out");
                return;
            }
            (KeyCode::Char('q'), KeyModifiers::NONE) => {
                self.should_quit = true;
                return;
            }
            (KeyCode::Char('a'), KeyModifiers::NONE) if own => {
                self.overlay.open_add_content(self.tag_pool.clone());
                let handle = self.tasks.spawn_fetch_tag_pool(&self.authed_client());
                self.track(handle);
                return;
            }
            (KeyCode::Char('s'), KeyModifiers::NONE) if own => {
                self.overlay.open_share_brain(&self.config.share_base_url);
                return;
            }
            _ => {}
        }

        if let Some(category) = self.sidebar.handle_input(key) {
            let request = self.content_list.set_category(category);
            self.spawn_fetch(request);
            return;
        }

        if let Some(action) = self.content_list.handle_input(key) {
            match action {
                ContentListAction::Open(content) => self.open_viewer(content),
                ContentListAction::Delete(content) => {
                    self.confirm = Some(ConfirmDialog::new(
                        "Delete Content",
                        format!("Delete \"{}\"? This cannot be undone.", content.title),
                        content.id,
                    ));
                }
                ContentListAction::Fetch(request) => self.spawn_fetch(request),
            }
        }
    }

    fn handle_overlay_action(&mut self, action: OverlayAction) {
        match action {
            OverlayAction::AddContent(AddContentAction::Cancel)
            | OverlayAction::ShareBrain(ShareBrainAction::Close)
            | OverlayAction::ContentViewer(ContentViewerAction::Close) => self.overlay.close(),
            OverlayAction::AddContent(AddContentAction::Submit(content)) => {
                let handle = self
                    .tasks
                    .spawn_create_content(&self.authed_client(), content);
                self.track(handle);
            }
            OverlayAction::ShareBrain(ShareBrainAction::Share) => {
                let handle = self.tasks.spawn_share_brain(&self.authed_client());
                self.track(handle);
            }
            OverlayAction::ShareBrain(ShareBrainAction::StopSharing) => {
                let handle = self.tasks.spawn_stop_sharing(&self.authed_client());
                self.track(handle);
            }
            OverlayAction::ShareBrain(ShareBrainAction::Copy(link)) => {
                self.copy_to_clipboard(&link)
            }
            OverlayAction::ContentViewer(ContentViewerAction::OpenUrl(url)) => self.open_url(&url),
        }
    }

    /// Apply a result reported by a background task.
    pub fn handle_api_message(&mut self, message: ApiMessage) {
        match message {
            ApiMessage::SignedIn(Ok(token)) => {
                if let Err(e) = self.auth.set(token) {
                    self.auth_form.submit_failed();
                    self.handle_error(e.into());
                    return;
                }
                let duration = self.notifications.default_duration();
                self.notifications.show(
                    "Signed in. Redirecting...",
                    Severity::Success,
                    duration,
                    Some(FollowUp::EnterDashboard),
                );
            }
            ApiMessage::SignedIn(Err(e)) | ApiMessage::SignedUp(Err(e)) => {
                self.auth_form.submit_failed();
                self.handle_error(e.into());
            }
            ApiMessage::SignedUp(Ok(())) => {
                self.notifications
                    .success("Account created. Please sign in.");
                self.show_auth(AuthMode::Login);
            }
            ApiMessage::ListingFetched { request_id, result } => {
                let lost_session = matches!(&result, Err(e) if e.requires_signin());
                if lost_session && self.content_list.is_current(request_id) {
                    if let Err(e) = result {
                        self.handle_error(e.into());
                    }
                    return;
                }
                self.content_list.apply(request_id, result);
            }
            ApiMessage::TagPoolFetched(Ok(tags)) => {
                if !tags.is_empty() {
                    self.tag_pool = tags;
                }
                if let Some(form) = self.overlay.add_content_mut() {
                    form.set_tag_pool(self.tag_pool.clone());
                }
            }
            ApiMessage::TagPoolFetched(Err(e)) => {
                debug!("Tag pool unavailable, keeping fallback tags: {}", e);
            }
            ApiMessage::ContentCreated(Ok(())) => {
                self.notifications.success("Content added");
                if self.overlay.add_content_mut().is_some() {
                    self.overlay.close();
                }
                let request = self.content_list.refresh();
                self.spawn_fetch(request);
            }
            ApiMessage::ContentCreated(Err(e)) => {
                if let Some(form) = self.overlay.add_content_mut() {
                    form.submit_failed();
                }
                self.handle_error(e.into());
            }
            ApiMessage::ContentDeleted { content_id, result } => match result {
                Ok(()) => {
                    debug!(content_id = %content_id, "Content deleted");
                    self.notifications.success("Content deleted");
                    let request = self.content_list.refresh();
                    self.spawn_fetch(request);
                }
                Err(e) => self.handle_error(e.into()),
            },
            ApiMessage::SharingEnabled(result) => {
                let view = self.overlay.share_brain_mut();
                match (result, view) {
                    (Ok(link), Some(view)) => {
                        view.sharing_enabled(&link);
                        self.notifications.success("Sharing enabled");
                    }
                    (Ok(_), None) => {
                        self.notifications.success("Sharing enabled");
                    }
                    (Err(e), view) => {
                        if let Some(view) = view {
                            view.request_failed();
                        }
                        self.handle_error(e.into());
                    }
                }
            }
            ApiMessage::SharingDisabled(result) => {
                let view = self.overlay.share_brain_mut();
                match (result, view) {
                    (Ok(()), view) => {
                        if let Some(view) = view {
                            view.sharing_disabled();
                        }
                        self.notifications.info("Content sharing has been stopped");
                    }
                    (Err(e), view) => {
                        if let Some(view) = view {
                            view.request_failed();
                        }
                        self.handle_error(e.into());
                    }
                }
            }
            ApiMessage::LinkPreviewFetched { content_id, result } => {
                if let Some(viewer) = self.overlay.content_viewer_mut() {
                    viewer.set_preview(&content_id, result);
                }
            }
        }
    }

    // ========================================================================
    // View
    // ========================================================================

    /// Render the application UI.
    ///
    /// This implements the View part of The Elm Architecture (TEA).
    pub fn view(&self, frame: &mut Frame) {
        let area = frame.area();

        match self.screen {
            Screen::Login | Screen::Signup => self.render_auth(frame, area),
            Screen::Dashboard | Screen::SharedBrain => self.render_collection(frame, area),
        }

        self.overlay.render(frame, area);
        if let Some(dialog) = &self.confirm {
            dialog.render(frame, area);
        }
        // On top of everything
        self.notifications.render(frame, area);
    }

    fn render_auth(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("◈ ", Style::default().fg(t.accent)),
            Span::styled(
                "Extra Memory",
                Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(t.border_style(false)),
        );
        frame.render_widget(header, chunks[0]);
        self.auth_form.render(frame, chunks[1]);
    }

    fn render_collection(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(self.sidebar.width()), Constraint::Min(1)])
            .split(area);
        self.sidebar.render(frame, columns[0]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(columns[1]);
        self.content_list.render(frame, rows[0]);
        self.render_footer(frame, rows[1]);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let (label, hints) = match self.screen {
            Screen::SharedBrain => (
                " SHARED ",
                "j/k move  Enter open  1-7 category  r refresh  Ctrl+B sidebar  q quit",
            ),
            _ => (
                " DASHBOARD ",
                "a add  s share  d delete  Enter open  1-7 category  r refresh  Ctrl+L logout  q quit",
            ),
        };
        let footer = Line::from(vec![
            Span::styled(label, Style::default().fg(t.selection_fg).bg(t.accent)),
            Span::raw(" "),
            Span::styled(hints, Style::default().fg(t.muted)),
        ]);
        frame.render_widget(Paragraph::new(footer), area);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.abort_background();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, LinkPreview};
    use crate::tasks::create_task_channel;
    use crate::ui::views::ContentViewerView;
    use crate::ui::views::Category;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn test_config() -> Config {
        Config {
            // Discard port: requests fail fast without a server
            backend_url: "http://127.0.0.1:9".to_string(),
            link_preview_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        }
    }

    fn create_app() -> App {
        let (_rx, tasks) = create_task_channel();
        App::new(test_config(), AuthContext::in_memory(), tasks, 120).unwrap()
    }

    fn signed_in_app() -> App {
        let mut app = create_app();
        app.auth.set("token").unwrap();
        app.start();
        app
    }

    #[test]
    fn test_starts_on_login_without_token() {
        let mut app = create_app();
        app.start();
        assert_eq!(app.screen(), Screen::Login);
        assert!(!app.should_quit());
    }

    #[test]
    fn test_ctrl_n_switches_auth_mode() {
        let mut app = create_app();
        app.start();
        app.update(ctrl('n'));
        assert_eq!(app.screen(), Screen::Signup);
        app.update(ctrl('n'));
        assert_eq!(app.screen(), Screen::Login);
    }

    #[test]
    fn test_quit_on_ctrl_c() {
        let mut app = create_app();
        app.update(ctrl('c'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_quit_event() {
        let mut app = create_app();
        app.update(Event::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn test_failed_signin_is_reported() {
        let mut app = create_app();
        app.start();
        app.handle_api_message(ApiMessage::SignedIn(Err(ApiError::InvalidCredentials)));
        assert_eq!(app.notifications().len(), 1);
        assert_eq!(app.screen(), Screen::Login);
        assert!(!app.auth_form().is_submitting());
    }

    #[test]
    fn test_signup_success_returns_to_login() {
        let mut app = create_app();
        app.update(ctrl('n'));
        app.handle_api_message(ApiMessage::SignedUp(Ok(())));
        assert_eq!(app.screen(), Screen::Login);
        assert_eq!(app.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_signin_enters_dashboard_after_toast() {
        let mut app = create_app();
        app.start();
        app.handle_api_message(ApiMessage::SignedIn(Ok("abc".to_string())));
        assert_eq!(app.auth.get(), Some("abc"));
        // Still on login while the toast is up
        assert_eq!(app.screen(), Screen::Login);

        let later = Instant::now() + Duration::from_secs(10);
        app.handle_tick_at(later);
        app.handle_tick_at(later + Duration::from_secs(1));
        assert_eq!(app.screen(), Screen::Dashboard);
        assert!(app.content_list().is_fetching());
    }

    #[tokio::test]
    async fn test_start_with_token_opens_dashboard() {
        let app = signed_in_app();
        assert_eq!(app.screen(), Screen::Dashboard);
        assert!(app.content_list().is_fetching());
    }

    #[tokio::test]
    async fn test_logout_clears_token() {
        let mut app = signed_in_app();
        app.update(ctrl('l'));
        assert_eq!(app.screen(), Screen::Login);
        assert!(app.auth.get().is_none());
    }

    #[tokio::test]
    async fn test_lost_session_returns_to_login() {
        let mut app = signed_in_app();
        let id = 0;
        assert!(app.content_list().is_current(id));
        app.handle_api_message(ApiMessage::ListingFetched {
            request_id: id,
            result: Err(ApiError::Unauthorized),
        });
        assert_eq!(app.screen(), Screen::Login);
        assert!(app.auth.get().is_none());
    }

    #[tokio::test]
    async fn test_stale_listing_is_ignored() {
        let mut app = signed_in_app();
        app.update(key(KeyCode::Char('r')));
        app.handle_api_message(ApiMessage::ListingFetched {
            request_id: 0,
            result: Err(ApiError::Unauthorized),
        });
        assert_eq!(app.screen(), Screen::Dashboard);
        assert!(app.content_list().is_fetching());
    }

    #[tokio::test]
    async fn test_aborted_errors_are_silent() {
        let mut app = signed_in_app();
        app.handle_api_message(ApiMessage::ContentDeleted {
            content_id: "c1".to_string(),
            result: Err(ApiError::Aborted),
        });
        assert!(app.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_sidebar_category_keys() {
        let mut app = signed_in_app();
        app.update(key(KeyCode::Char('3')));
        assert_eq!(
            app.content_list().category(),
            Category::Kind(ContentType::Video)
        );
        assert!(app.content_list().is_fetching());
    }

    #[tokio::test]
    async fn test_ctrl_b_toggles_sidebar() {
        let mut app = signed_in_app();
        assert!(app.sidebar().is_open());
        app.update(ctrl('b'));
        assert!(!app.sidebar().is_open());
    }

    #[tokio::test]
    async fn test_resize_crossing_breakpoint() {
        let mut app = signed_in_app();
        assert!(app.sidebar().is_open());
        app.update(Event::Resize(80, 40));
        assert!(!app.sidebar().is_open());
        app.update(Event::Resize(120, 40));
        assert!(app.sidebar().is_open());
    }

    #[tokio::test]
    async fn test_add_content_overlay_open_and_close() {
        let mut app = signed_in_app();
        app.update(key(KeyCode::Char('a')));
        assert!(app.overlay().is_scroll_locked());

        // Keys go to the overlay, not the dashboard
        app.update(key(KeyCode::Char('q')));
        assert!(!app.should_quit());

        app.update(key(KeyCode::Esc));
        assert!(!app.overlay().is_scroll_locked());
    }

    #[tokio::test]
    async fn test_share_panel_receives_link() {
        let mut app = signed_in_app();
        app.update(key(KeyCode::Char('s')));
        app.update(key(KeyCode::Enter));
        app.handle_api_message(ApiMessage::SharingEnabled(Ok(
            "http://127.0.0.1:9/api/v1/brain/u1".to_string(),
        )));
        match app.overlay() {
            Overlay::ShareBrain(view) => {
                assert_eq!(view.link(), Some("http://localhost:5173/brain/u1"));
            }
            other => panic!("Expected share panel, got {:?}", other),
        }

        app.handle_api_message(ApiMessage::SharingDisabled(Ok(())));
        match app.overlay() {
            Overlay::ShareBrain(view) => assert_eq!(view.link(), None),
            other => panic!("Expected share panel, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sharing_enabled_after_panel_closed() {
        let mut app = signed_in_app();
        app.handle_api_message(ApiMessage::SharingEnabled(Ok(
            "http://127.0.0.1:9/api/v1/brain/u1".to_string(),
        )));
        assert!(!app.overlay().is_scroll_locked());
        assert_eq!(app.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_ctrl_x_closes_newest_toast() {
        let mut app = signed_in_app();
        app.handle_api_message(ApiMessage::SharingDisabled(Ok(())));
        app.update(ctrl('x'));
        // Well inside the auto-dismiss deadline, past the close animation
        app.handle_tick_at(Instant::now() + Duration::from_millis(500));
        assert!(app.notifications().is_empty());
    }

    fn link_item() -> Content {
        Content {
            id: "c1".to_string(),
            title: "Rust".to_string(),
            link: "https://www.rust-lang.org".to_string(),
            content_type: ContentType::Link,
            tags: vec![],
            user: None,
        }
    }

    #[tokio::test]
    async fn test_link_preview_reaches_open_viewer() {
        let mut app = signed_in_app();
        app.open_viewer(link_item());
        app.handle_api_message(ApiMessage::LinkPreviewFetched {
            content_id: "c1".to_string(),
            result: Ok(LinkPreview {
                title: Some("Rust Programming Language".to_string()),
                ..LinkPreview::default()
            }),
        });

        let loading = ContentViewerView::new(link_item()).preview().cloned();
        let preview = app.overlay.content_viewer_mut().and_then(|v| v.preview().cloned());
        assert!(preview.is_some());
        assert_ne!(preview, loading);
    }

    #[tokio::test]
    async fn test_link_preview_failure_is_silent() {
        let mut app = signed_in_app();
        app.open_viewer(link_item());
        app.handle_api_message(ApiMessage::LinkPreviewFetched {
            content_id: "c1".to_string(),
            result: Err(ApiError::ServerError("down".to_string())),
        });
        assert!(app.notifications().is_empty());

        // A late answer after the viewer closed goes nowhere
        app.overlay.close();
        app.handle_api_message(ApiMessage::LinkPreviewFetched {
            content_id: "c1".to_string(),
            result: Ok(LinkPreview::default()),
        });
        assert!(!app.overlay().is_scroll_locked());
    }

    #[tokio::test]
    async fn test_tag_pool_reaches_open_form() {
        let mut app = signed_in_app();
        app.update(key(KeyCode::Char('a')));
        app.handle_api_message(ApiMessage::TagPoolFetched(Ok(vec!["rust".to_string()])));
        match app.overlay() {
            Overlay::AddContent(form) => assert_eq!(form.tags().candidates(), ["rust"]),
            other => panic!("Expected add content form, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shared_brain_is_read_only() {
        let mut app = create_app();
        app.open_shared("u1");
        assert_eq!(app.screen(), Screen::SharedBrain);
        assert!(app.content_list().is_read_only());
        app.update(key(KeyCode::Char('a')));
        assert!(!app.overlay().is_scroll_locked());
    }
}
