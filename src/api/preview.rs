//! Link previews.
//!
//! Saved links get a title and description from a microlink-compatible
//! metadata service: `GET {endpoint}?url=<link>` answering
//! `{"status": "success", "data": {"title", "description", "image": {"url"}}}`.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::error::{ApiError, Endpoint, Result};

/// Preview lookups give up sooner than backend calls.
const PREVIEW_TIMEOUT_SECS: u64 = 10;

/// Page metadata for a saved link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPreview {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PreviewResponse {
    status: String,
    #[serde(default)]
    data: Option<PreviewData>,
}

#[derive(Debug, Default, Deserialize)]
struct PreviewData {
    title: Option<String>,
    description: Option<String>,
    image: Option<PreviewImage>,
}

#[derive(Debug, Deserialize)]
struct PreviewImage {
    url: Option<String>,
}

impl PreviewResponse {
    fn into_preview(self) -> Result<LinkPreview> {
        if self.status != "success" {
            return Err(ApiError::InvalidResponse(format!(
                "preview service answered '{}'",
                self.status
            )));
        }
        let data = self.data.unwrap_or_default();
        Ok(LinkPreview {
            title: non_empty(data.title),
            description: non_empty(data.description),
            image_url: non_empty(data.image.and_then(|i| i.url)),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Client for the link metadata service.
#[derive(Debug, Clone)]
pub struct PreviewClient {
    client: Client,
    endpoint: String,
}

impl PreviewClient {
    /// Create a client for the service at `endpoint`.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
            return Err(ApiError::InvalidUrl(format!(
                "'{}' must start with http:// or https://",
                endpoint
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(PREVIEW_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// The lookup URL for `link`.
    fn lookup_url(&self, link: &str) -> String {
        format!("{}/?url={}", self.endpoint, urlencoding::encode(link))
    }

    /// Fetch the metadata of the page at `link`. Never retried.
    #[instrument(skip(self))]
    pub async fn fetch(&self, link: &str) -> Result<LinkPreview> {
        let url = self.lookup_url(link);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status, Endpoint::Other, &url));
        }
        let body: PreviewResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse preview: {}", e)))?;
        let preview = body.into_preview()?;
        debug!(has_title = preview.title.is_some(), "Fetched link preview");
        Ok(preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<LinkPreview> {
        serde_json::from_str::<PreviewResponse>(json)
            .unwrap()
            .into_preview()
    }

    #[test]
    fn test_success_body() {
        let preview = parse(
            r#"{"status":"success","data":{"title":"Rust","description":"A language",
                "image":{"url":"https://rust-lang.org/logo.png"}}}"#,
        )
        .unwrap();
        assert_eq!(preview.title.as_deref(), Some("Rust"));
        assert_eq!(preview.description.as_deref(), Some("A language"));
        assert_eq!(preview.image_url.as_deref(), Some("https://rust-lang.org/logo.png"));
    }

    #[test]
    fn test_missing_and_blank_fields() {
        let preview = parse(r#"{"status":"success","data":{"title":"  ","image":null}}"#).unwrap();
        assert_eq!(preview, LinkPreview::default());

        let preview = parse(r#"{"status":"success"}"#).unwrap();
        assert_eq!(preview, LinkPreview::default());
    }

    #[test]
    fn test_failed_status_is_an_error() {
        let err = parse(r#"{"status":"fail","data":{"url":"x"}}"#).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_lookup_url_encodes_link() {
        let client = PreviewClient::new("https://api.microlink.io/").unwrap();
        assert_eq!(
            client.lookup_url("https://example.com/a?b=c"),
            "https://api.microlink.io/?url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc"
        );
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        assert!(matches!(
            PreviewClient::new("ftp://example.com"),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
