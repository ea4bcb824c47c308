//! Modal overlay slot.
//!
//! At most one modal is open at a time. The slot owns the modal's state, so
//! opening another one (or closing) drops whatever was there.

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::api::types::Content;
use crate::ui::views::{
    AddContentAction, AddContentView, ContentViewerAction, ContentViewerView, ShareBrainAction,
    ShareBrainView,
};

/// The open modal, if any.
#[derive(Debug, Default)]
pub enum Overlay {
    #[default]
    None,
    AddContent(AddContentView),
    ShareBrain(ShareBrainView),
    ContentViewer(ContentViewerView),
}

/// What the open modal asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayAction {
    AddContent(AddContentAction),
    ShareBrain(ShareBrainAction),
    ContentViewer(ContentViewerAction),
}

impl Overlay {
    /// Open the add content form.
    pub fn open_add_content(&mut self, tag_pool: Vec<String>) {
        *self = Overlay::AddContent(AddContentView::new(tag_pool));
    }

    /// Open the share panel.
    pub fn open_share_brain(&mut self, share_base_url: &str) {
        *self = Overlay::ShareBrain(ShareBrainView::new(share_base_url));
    }

    /// Open the viewer for `content`.
    pub fn open_viewer(&mut self, content: Content) {
        *self = Overlay::ContentViewer(ContentViewerView::new(content));
    }

    /// Close whatever is open.
    pub fn close(&mut self) {
        *self = Overlay::None;
    }

    /// Whether a modal is open. The screen underneath takes no input then.
    pub fn is_scroll_locked(&self) -> bool {
        !matches!(self, Overlay::None)
    }

    /// The add content form, if open.
    pub fn add_content_mut(&mut self) -> Option<&mut AddContentView> {
        match self {
            Overlay::AddContent(view) => Some(view),
            _ => None,
        }
    }

    /// The share panel, if open.
    pub fn share_brain_mut(&mut self) -> Option<&mut ShareBrainView> {
        match self {
            Overlay::ShareBrain(view) => Some(view),
            _ => None,
        }
    }

    /// The content viewer, if open.
    pub fn content_viewer_mut(&mut self) -> Option<&mut ContentViewerView> {
        match self {
            Overlay::ContentViewer(view) => Some(view),
            _ => None,
        }
    }

    /// Advance spinners.
    pub fn tick(&mut self) {
        match self {
            Overlay::ShareBrain(view) => view.tick(),
            Overlay::None | Overlay::AddContent(_) | Overlay::ContentViewer(_) => {}
        }
    }

    /// Route a key to the open modal.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<OverlayAction> {
        match self {
            Overlay::None => None,
            Overlay::AddContent(view) => view.handle_input(key).map(OverlayAction::AddContent),
            Overlay::ShareBrain(view) => view.handle_input(key).map(OverlayAction::ShareBrain),
            Overlay::ContentViewer(view) => {
                view.handle_input(key).map(OverlayAction::ContentViewer)
            }
        }
    }

    /// Render the open modal over `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match self {
            Overlay::None => {}
            Overlay::AddContent(view) => view.render(frame, area),
            Overlay::ShareBrain(view) => view.render(frame, area),
            Overlay::ContentViewer(view) => view.render(frame, area),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ContentType;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample() -> Content {
        Content {
            id: "c1".to_string(),
            title: "Note".to_string(),
            link: "hello".to_string(),
            content_type: ContentType::Text,
            tags: vec![],
            user: None,
        }
    }

    #[test]
    fn test_default_is_unlocked() {
        let overlay = Overlay::default();
        assert!(!overlay.is_scroll_locked());
    }

    #[test]
    fn test_open_locks_and_close_unlocks() {
        let mut overlay = Overlay::default();
        overlay.open_viewer(sample());
        assert!(overlay.is_scroll_locked());
        overlay.close();
        assert!(!overlay.is_scroll_locked());
    }

    #[test]
    fn test_switching_drops_previous_state() {
        let mut overlay = Overlay::default();
        overlay.open_add_content(vec!["rust".to_string()]);
        if let Some(form) = overlay.add_content_mut() {
            // Move focus off the type field
            form.handle_input(key(KeyCode::Tab));
        }
        overlay.open_share_brain("http://localhost:5173");
        assert!(overlay.add_content_mut().is_none());
        assert!(overlay.share_brain_mut().is_some());

        overlay.open_add_content(vec![]);
        let fresh = AddContentView::new(vec![]).focus();
        let form = overlay.add_content_mut().map(|f| f.focus());
        assert_eq!(form, Some(fresh));
    }

    #[test]
    fn test_routes_keys_to_open_modal() {
        let mut overlay = Overlay::default();
        assert_eq!(overlay.handle_input(key(KeyCode::Esc)), None);

        overlay.open_viewer(sample());
        assert_eq!(
            overlay.handle_input(key(KeyCode::Esc)),
            Some(OverlayAction::ContentViewer(ContentViewerAction::Close))
        );

        overlay.open_share_brain("http://localhost:5173");
        assert_eq!(
            overlay.handle_input(key(KeyCode::Enter)),
            Some(OverlayAction::ShareBrain(ShareBrainAction::Share))
        );
    }
}
