//! Application views (screens and modals).

mod add_content;
mod auth_form;
mod content_list;
mod content_viewer;
mod share_brain;
mod sidebar;

pub use add_content::{AddContentAction, AddContentView};
pub use auth_form::{AuthFormAction, AuthFormView, AuthMode};
pub use content_list::{Category, ContentListAction, ContentListView, FetchRequest, FetchSource};
pub use content_viewer::{ContentViewerAction, ContentViewerView};
pub use share_brain::{ShareBrainAction, ShareBrainView};
pub use sidebar::SidebarState;
