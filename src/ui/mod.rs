//! User interface components and views.
//!
//! This module contains all TUI rendering logic: the screens, the modal
//! overlay slot, and the reusable components they are built from.

pub mod components;
mod overlay;
pub mod theme;
pub mod views;

pub use components::{ConfirmDialog, NotificationManager, Severity};
pub use overlay::{Overlay, OverlayAction};
