//! Extra Memory API client and types.
//!
//! This module provides the interface for communicating with the Extra Memory
//! REST backend.

pub mod auth;
mod client;
pub mod error;
mod preview;
pub mod types;

pub use auth::AuthContext;
pub use client::MemoryClient;
pub use error::ApiError;
pub use preview::{LinkPreview, PreviewClient};
pub use types::{Content, ContentType, NewContent};
