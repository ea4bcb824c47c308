//! Async task management for non-blocking API operations.
//!
//! Backend calls run as tokio tasks while the UI keeps rendering. Results come
//! back to the main event loop as `ApiMessage`s over an unbounded channel that
//! the loop drains with `try_recv()`.
//!
//! Every spawn method returns an `AbortHandle` for the request. Aborting it
//! drops the in-flight request, and the result is reported as
//! `ApiError::Aborted` so the owner can tell cancellation from failure.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::api::error::ApiError;
use crate::api::types::{Credentials, Listing, NewContent};
use crate::api::{LinkPreview, MemoryClient, PreviewClient};

/// What a content-list fetch asks the backend for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingQuery {
    /// The signed-in user's content.
    Contents,
    /// The signed-in user's tags.
    Tags,
    /// Another user's shared content.
    Shared(String),
}

/// Messages sent from background tasks to the main event loop.
#[derive(Debug)]
pub enum ApiMessage {
    /// Sign-in result, carrying the token.
    SignedIn(Result<String, ApiError>),

    /// Sign-up result.
    SignedUp(Result<(), ApiError>),

    /// Content-list fetch result.
    ListingFetched {
        request_id: u64,
        result: Result<Listing, ApiError>,
    },

    /// Tag pool for the add-content form.
    TagPoolFetched(Result<Vec<String>, ApiError>),

    /// New content stored.
    ContentCreated(Result<(), ApiError>),

    /// Content deleted.
    ContentDeleted {
        content_id: String,
        result: Result<(), ApiError>,
    },

    /// Sharing enabled, carrying the backend's share link.
    SharingEnabled(Result<String, ApiError>),

    /// Sharing disabled.
    SharingDisabled(Result<(), ApiError>),

    /// Page metadata for a link being viewed.
    LinkPreviewFetched {
        content_id: String,
        result: Result<LinkPreview, ApiError>,
    },
}

/// Spawns background tasks for async operations.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>) -> Self {
        Self { tx }
    }

    /// Run `fut` on tokio and send its result, wrapped by `wrap`, to the loop.
    ///
    /// The request runs in its own task; a reporter task waits on it. An
    /// aborted request is reported as `ApiError::Aborted`.
    fn spawn<F, T, W>(&self, fut: F, wrap: W) -> AbortHandle
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
        W: FnOnce(Result<T, ApiError>) -> ApiMessage + Send + 'static,
    {
        let tx = self.tx.clone();
        let request = tokio::spawn(fut);
        let abort = request.abort_handle();
        tokio::spawn(async move {
            let result = match request.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => Err(ApiError::Aborted),
                Err(e) => {
                    warn!("Backend task failed: {}", e);
                    return;
                }
            };
            if tx.send(wrap(result)).is_err() {
                debug!("Event loop gone, dropping task result");
            }
        });
        abort
    }

    /// Spawn a sign-in.
    pub fn spawn_signin(&self, client: &MemoryClient, credentials: Credentials) -> AbortHandle {
        let client = client.clone();
        self.spawn(
            async move { client.signin(&credentials).await },
            ApiMessage::SignedIn,
        )
    }

    /// Spawn a sign-up.
    pub fn spawn_signup(&self, client: &MemoryClient, credentials: Credentials) -> AbortHandle {
        let client = client.clone();
        self.spawn(
            async move { client.signup(&credentials).await },
            ApiMessage::SignedUp,
        )
    }

    /// Spawn a content-list fetch tagged with `request_id`.
    pub fn spawn_fetch_listing(
        &self,
        client: &MemoryClient,
        request_id: u64,
        query: ListingQuery,
    ) -> AbortHandle {
        let client = client.clone();
        self.spawn(
            async move {
                match query {
                    ListingQuery::Contents => client.list_contents().await.map(Listing::Contents),
                    ListingQuery::Tags => client.list_tags().await.map(Listing::Tags),
                    ListingQuery::Shared(user_id) => {
                        client.shared_brain(&user_id).await.map(Listing::Contents)
                    }
                }
            },
            move |result| ApiMessage::ListingFetched { request_id, result },
        )
    }

    /// Spawn a fetch of the tag pool for the add-content form.
    pub fn spawn_fetch_tag_pool(&self, client: &MemoryClient) -> AbortHandle {
        let client = client.clone();
        self.spawn(
            async move { client.list_tags().await },
            ApiMessage::TagPoolFetched,
        )
    }

    /// Spawn creation of a content item.
    pub fn spawn_create_content(&self, client: &MemoryClient, content: NewContent) -> AbortHandle {
        let client = client.clone();
        self.spawn(
            async move { client.create_content(&content).await },
            ApiMessage::ContentCreated,
        )
    }

    /// Spawn deletion of a content item.
    pub fn spawn_delete_content(&self, client: &MemoryClient, content_id: String) -> AbortHandle {
        let client = client.clone();
        let id = content_id.clone();
        self.spawn(
            async move { client.delete_content(&id).await },
            move |result| ApiMessage::ContentDeleted { content_id, result },
        )
    }

    /// Spawn enabling of sharing.
    pub fn spawn_share_brain(&self, client: &MemoryClient) -> AbortHandle {
        let client = client.clone();
        self.spawn(
            async move { client.share_brain().await },
            ApiMessage::SharingEnabled,
        )
    }

    /// Spawn disabling of sharing.
    pub fn spawn_stop_sharing(&self, client: &MemoryClient) -> AbortHandle {
        let client = client.clone();
        self.spawn(
            async move { client.stop_sharing().await },
            ApiMessage::SharingDisabled,
        )
    }

    /// Spawn a link preview lookup for the viewed item `content_id`.
    pub fn spawn_link_preview(
        &self,
        previews: &PreviewClient,
        content_id: String,
        link: String,
    ) -> AbortHandle {
        let previews = previews.clone();
        self.spawn(
            async move { previews.fetch(&link).await },
            move |result| ApiMessage::LinkPreviewFetched { content_id, result },
        )
    }
}

/// Create a channel for task communication.
///
/// Returns the receiver (for the main loop) and a TaskSpawner (for spawning tasks).
pub fn create_task_channel() -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx))
}
