//! Application settings configuration.

use serde::{Deserialize, Serialize};

/// Default toast lifetime in milliseconds.
pub const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 2000;

/// Default event-loop tick rate in milliseconds.
pub const DEFAULT_TICK_RATE_MS: u64 = 100;

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How long toasts stay up before auto-dismissing.
    pub notification_duration_ms: u64,
    /// Event-loop tick rate.
    pub tick_rate_ms: u64,
    /// Tag suggestions used when the backend's tag list cannot be fetched.
    pub fallback_tags: Vec<String>,
    /// Log filter directive used when `RUST_LOG` is not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notification_duration_ms: DEFAULT_NOTIFICATION_DURATION_MS,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            fallback_tags: default_fallback_tags(),
            log_filter: None,
        }
    }
}

fn default_fallback_tags() -> Vec<String> {
    [
        "javascript",
        "react",
        "typescript",
        "nodejs",
        "css",
        "html",
        "programming",
        "tutorial",
        "documentation",
        "project",
        "learning",
        "frontend",
        "backend",
        "fullstack",
        "database",
        "api",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}
