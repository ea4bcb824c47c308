//! Event handling for the application.
//!
//! This module turns terminal input into application events.

mod handler;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;

/// An event delivered to the application's update function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized to (width, height).
    Resize(u16, u16),
    /// The tick rate elapsed without input.
    Tick,
    /// The application should exit.
    Quit,
}
