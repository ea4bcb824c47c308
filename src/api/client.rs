//! Extra Memory API client implementation.
//!
//! This module provides the client for the backend's `/api/v1` REST endpoints.
//! It handles bearer authentication, request/response processing, error
//! mapping, and retry logic for idempotent reads.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, instrument, warn};

use super::auth::bearer;
use super::error::{ApiError, Endpoint, Result};
use super::types::{
    Content, ContentList, Credentials, DeleteContentRequest, ErrorBody, NewContent,
    ShareResponse, SigninResponse, TagList,
};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient read failures.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 500;

/// Path prefix of every backend route.
const API_PREFIX: &str = "/api/v1";

/// The Extra Memory API client.
///
/// Cheap to clone: the underlying connection pool is shared. A clone carries
/// its own token snapshot, taken from the auth context when a request is
/// about to be issued.
#[derive(Debug, Clone)]
pub struct MemoryClient {
    /// The HTTP client.
    client: Client,
    /// The backend origin plus the API prefix.
    api_url: String,
    /// Bearer token for authenticated routes.
    token: Option<String>,
}

impl MemoryClient {
    /// Create a new client for the given backend origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s) or the HTTP client cannot
    /// be built.
    pub fn new(backend_url: &str) -> Result<Self> {
        let origin = normalize_base_url(backend_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)?;

        info!(backend = %origin, "Created Extra Memory client");
        Ok(Self {
            client,
            api_url: format!("{}{}", origin, API_PREFIX),
            token: None,
        })
    }

    /// Return a clone that authenticates with the given token.
    pub fn with_token(&self, token: Option<&str>) -> Self {
        Self {
            client: self.client.clone(),
            api_url: self.api_url.clone(),
            token: token.map(str::to_string),
        }
    }

    /// Get the API base URL (origin plus prefix).
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Calls `POST /signin`.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn signin(&self, credentials: &Credentials) -> Result<String> {
        let response: SigninResponse = self
            .send(Method::POST, "/signin", Endpoint::Signin, Some(credentials), false)
            .await?;
        info!("Signed in");
        Ok(response.token)
    }

    /// Register a new account.
    ///
    /// Calls `POST /signup`.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn signup(&self, credentials: &Credentials) -> Result<()> {
        self.send_discard(Method::POST, "/signup", Endpoint::Signup, Some(credentials), false)
            .await?;
        info!("Signed up");
        Ok(())
    }

    /// List the signed-in user's content.
    ///
    /// Calls `GET /content`.
    #[instrument(skip(self))]
    pub async fn list_contents(&self) -> Result<Vec<Content>> {
        let list: ContentList = self.get("/content", Endpoint::Other, true).await?;
        debug!("Fetched {} content items", list.contents.len());
        Ok(list.contents)
    }

    /// List the signed-in user's tags.
    ///
    /// Calls `GET /tags`.
    #[instrument(skip(self))]
    pub async fn list_tags(&self) -> Result<Vec<String>> {
        let list: TagList = self.get("/tags", Endpoint::Other, true).await?;
        debug!("Fetched {} tags", list.tags.len());
        Ok(list.tags)
    }

    /// Store a new content item.
    ///
    /// Calls `POST /content`.
    #[instrument(skip(self, content), fields(title = %content.title, kind = %content.content_type))]
    pub async fn create_content(&self, content: &NewContent) -> Result<()> {
        self.send_discard(Method::POST, "/content", Endpoint::Other, Some(content), true)
            .await?;
        info!("Content created");
        Ok(())
    }

    /// Delete a content item.
    ///
    /// Calls `DELETE /content` with the ID in the body.
    #[instrument(skip(self))]
    pub async fn delete_content(&self, content_id: &str) -> Result<()> {
        let body = DeleteContentRequest {
            content_id: content_id.to_string(),
        };
        self.send_discard(Method::DELETE, "/content", Endpoint::Other, Some(&body), true)
            .await?;
        info!("Content deleted");
        Ok(())
    }

    /// Enable sharing and get the backend's share link.
    ///
    /// Calls `POST /brain/share`.
    #[instrument(skip(self))]
    pub async fn share_brain(&self) -> Result<String> {
        let response: ShareResponse = self
            .send(Method::POST, "/brain/share", Endpoint::Other, None::<&()>, true)
            .await?;
        info!("Sharing enabled");
        Ok(response.shareable_link)
    }

    /// Disable sharing.
    ///
    /// Calls `PUT /brain/share`.
    #[instrument(skip(self))]
    pub async fn stop_sharing(&self) -> Result<()> {
        self.send_discard(Method::PUT, "/brain/share", Endpoint::Other, None::<&()>, true)
            .await?;
        info!("Sharing disabled");
        Ok(())
    }

    /// Fetch another user's shared content. No authentication required.
    ///
    /// Calls `GET /brain/:userId`.
    #[instrument(skip(self))]
    pub async fn shared_brain(&self, user_id: &str) -> Result<Vec<Content>> {
        if user_id.trim().is_empty() {
            return Err(ApiError::NotShared);
        }
        let path = format!("/brain/{}", urlencoding::encode(user_id));
        let list: ContentList = self.get(&path, Endpoint::SharedBrain, false).await?;
        debug!("Fetched {} shared items", list.contents.len());
        Ok(list.contents)
    }

    /// Perform a GET request with retry for transient failures.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        endpoint: Endpoint,
        authenticated: bool,
    ) -> Result<T> {
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!("Request attempt {}/{}", attempts, MAX_RETRIES);

            match self
                .send(Method::GET, path, endpoint, None::<&()>, authenticated)
                .await
            {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempts < MAX_RETRIES => {
                    let delay = calculate_retry_delay(attempts);
                    warn!(
                        "Request failed (attempt {}), retrying in {}ms: {}",
                        attempts, delay, e
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send a request and parse the JSON response.
    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        endpoint: Endpoint,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<T> {
        let response = self
            .request(method, path, body, authenticated)?
            .send()
            .await?;
        let response = check_status(response, endpoint).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Send a request and ignore whatever success body comes back.
    async fn send_discard<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        endpoint: Endpoint,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<()> {
        let response = self
            .request(method, path, body, authenticated)?
            .send()
            .await?;
        check_status(response, endpoint).await?;
        Ok(())
    }

    /// Build a request with the common headers.
    fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<RequestBuilder> {
        let url = format!("{}{}", self.api_url, path);
        let mut builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");

        if authenticated {
            let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;
            builder = builder.header(header::AUTHORIZATION, bearer(token));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder)
    }
}

/// Turn a non-success response into an error.
async fn check_status(response: Response, endpoint: Endpoint) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    debug!("Error response body: {}", body);
    Err(error_from_response(status, endpoint, &url, &body))
}

/// Create an appropriate error from a failed response.
fn error_from_response(status: StatusCode, endpoint: Endpoint, url: &str, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| url.to_string());
    ApiError::from_status(status, endpoint, &message)
}

/// Calculate retry delay with exponential backoff.
fn calculate_retry_delay(attempt: u32) -> u64 {
    RETRY_DELAY_MS * 2u64.pow(attempt.saturating_sub(1))
}

/// Normalize the backend origin by trimming whitespace and trailing slashes.
fn normalize_base_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');

    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(ApiError::InvalidUrl(format!(
            "'{}' must start with http:// or https://",
            url
        )));
    }

    // Warn if not HTTPS (but don't enforce for localhost/testing)
    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://memory.example.com/").unwrap(),
            "https://memory.example.com"
        );
        assert_eq!(
            normalize_base_url("http://localhost:3000///").unwrap(),
            "http://localhost:3000"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_other_schemes() {
        assert!(matches!(
            normalize_base_url("memory.example.com"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_client_api_url() {
        let client = MemoryClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.api_url(), "http://localhost:3000/api/v1");
    }

    #[test]
    fn test_authenticated_request_requires_token() {
        let client = MemoryClient::new("http://localhost:3000").unwrap();
        let result = client.request(Method::GET, "/content", None::<&()>, true);
        assert!(matches!(result, Err(ApiError::MissingToken)));

        let client = client.with_token(Some("abc"));
        let request = client
            .request(Method::GET, "/content", None::<&()>, true)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.headers()[header::AUTHORIZATION], "Bearer abc");
        assert_eq!(request.url().as_str(), "http://localhost:3000/api/v1/content");
    }

    #[test]
    fn test_unauthenticated_request_has_no_auth_header() {
        let client = MemoryClient::new("http://localhost:3000").unwrap();
        let request = client
            .request(Method::GET, "/brain/u1", None::<&()>, false)
            .unwrap()
            .build()
            .unwrap();
        assert!(request.headers().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_error_from_response_uses_message_body() {
        let err = error_from_response(
            StatusCode::BAD_REQUEST,
            Endpoint::Other,
            "http://x/api/v1/content",
            r#"{"message":"Title is required"}"#,
        );
        assert_eq!(err.user_message(), "Title is required");
    }

    #[test]
    fn test_error_from_response_falls_back_to_url() {
        let err = error_from_response(
            StatusCode::NOT_FOUND,
            Endpoint::Other,
            "http://x/api/v1/content",
            "<html>nope</html>",
        );
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "http://x/api/v1/content"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_retry_delay_exponential() {
        assert_eq!(calculate_retry_delay(1), 500);
        assert_eq!(calculate_retry_delay(2), 1000);
        assert_eq!(calculate_retry_delay(3), 2000);
    }
}
