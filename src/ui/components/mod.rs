//! Reusable UI components.

mod input;
mod loading;
mod modal;
mod notification;
mod tag_selector;

pub use input::TextInput;
pub use loading::LoadingIndicator;
pub use modal::{centered_rect, ConfirmAction, ConfirmDialog};
pub use notification::{NotificationManager, Severity};
pub use tag_selector::{TagSelector, TagSelectorAction};
