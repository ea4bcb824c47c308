//! Extra Memory API request and response types.
//!
//! These types model the JSON bodies exchanged with the `/api/v1` endpoints.

use std::fmt;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// The kind of a stored content item.
///
/// Every per-kind behaviour (icon, label, colour, how the body is shown) is an
/// exhaustive match on this enum, so adding a variant is a compile error until
/// every site handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Free text note.
    Text,
    /// Video URL.
    Video,
    /// Image URL.
    Image,
    /// Audio URL.
    Audio,
    /// Web link.
    Link,
}

impl ContentType {
    /// All content types in display order.
    pub const ALL: [ContentType; 5] = [
        ContentType::Text,
        ContentType::Image,
        ContentType::Video,
        ContentType::Audio,
        ContentType::Link,
    ];

    /// The wire name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Video => "video",
            ContentType::Image => "image",
            ContentType::Audio => "audio",
            ContentType::Link => "link",
        }
    }

    /// Get the icon for this type.
    pub fn icon(&self) -> &'static str {
        match self {
            ContentType::Text => "¶",
            ContentType::Video => "▶",
            ContentType::Image => "▣",
            ContentType::Audio => "♪",
            ContentType::Link => "↗",
        }
    }

    /// Get the accent color for this type.
    pub fn color(&self) -> Color {
        match self {
            ContentType::Text => Color::White,
            ContentType::Video => Color::Red,
            ContentType::Image => Color::Green,
            ContentType::Audio => Color::Yellow,
            ContentType::Link => Color::Cyan,
        }
    }

    /// Whether the body of this type is a URL rather than inline text.
    pub fn is_url(&self) -> bool {
        match self {
            ContentType::Text => false,
            ContentType::Video | ContentType::Image | ContentType::Audio | ContentType::Link => {
                true
            }
        }
    }

    /// Prompt shown for the body field when composing content of this type.
    pub fn body_placeholder(&self) -> String {
        match self {
            ContentType::Text => "Enter content".to_string(),
            other => format!("Enter {} source url", other.as_str()),
        }
    }

    /// The next type in display order, wrapping around.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// The previous type in display order, wrapping around.
    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tag attached to a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// The tag ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// The tag text.
    pub title: String,
}

/// The owner of a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// The user's login name.
    pub username: String,
}

/// A stored content item.
///
/// Returned inside `GET /content` and `GET /brain/:userId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// The content ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// The content title.
    pub title: String,
    /// The body: free text for `text`, a URL for every other type.
    pub link: String,
    /// The content type.
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// Attached tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// The owner, when the backend populates it.
    #[serde(rename = "userId", default, deserialize_with = "deserialize_owner")]
    pub user: Option<User>,
}

impl Content {
    /// Get the tag titles in order.
    pub fn tag_titles(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.title.clone()).collect()
    }

    /// Get the owner's username, if known.
    pub fn owner_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

/// The backend sends either a populated user object or a bare ID string.
fn deserialize_owner<'de, D>(deserializer: D) -> std::result::Result<Option<User>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Owner {
        Populated(User),
        Id(String),
    }

    Ok(match Option::<Owner>::deserialize(deserializer)? {
        Some(Owner::Populated(user)) => Some(user),
        Some(Owner::Id(_)) | None => None,
    })
}

/// Response of `GET /content` and `GET /brain/:userId`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentList {
    /// The content items.
    #[serde(default)]
    pub contents: Vec<Content>,
}

/// Response of `GET /tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagList {
    /// Tag titles.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A fetched collection, as shown by the content list.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    /// Content items.
    Contents(Vec<Content>),
    /// Tag titles.
    Tags(Vec<String>),
}

impl Listing {
    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            Listing::Contents(items) => items.len(),
            Listing::Tags(tags) => tags.len(),
        }
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Body of `POST /content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewContent {
    /// Trimmed title.
    pub title: String,
    /// Trimmed body (text or URL).
    pub link: String,
    /// The content type.
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// Tag titles; the backend creates unknown ones.
    pub tags: Vec<String>,
}

/// Body of `DELETE /content`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteContentRequest {
    /// The content to delete.
    pub content_id: String,
}

/// Body of `POST /signin` and `POST /signup`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Plain password; only sent over the wire.
    pub password: String,
}

/// Response of `POST /signin`.
#[derive(Debug, Clone, Deserialize)]
pub struct SigninResponse {
    /// The bearer token.
    pub token: String,
}

/// Response of `POST /brain/share`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    /// Backend-issued link ending in the owner's user ID.
    pub shareable_link: String,
}

/// Error body returned by the backend on failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT_JSON: &str = r#"{
        "_id": "c1",
        "title": "Rust book",
        "link": "https://doc.rust-lang.org/book/",
        "type": "link",
        "tags": [{"_id": "t1", "title": "rust"}, {"_id": "t2", "title": "docs"}],
        "userId": {"_id": "u1", "username": "ferris"},
        "__v": 0
    }"#;

    #[test]
    fn test_content_deserialize() {
        let content: Content = serde_json::from_str(CONTENT_JSON).unwrap();
        assert_eq!(content.id, "c1");
        assert_eq!(content.content_type, ContentType::Link);
        assert_eq!(content.tag_titles(), vec!["rust", "docs"]);
        assert_eq!(content.owner_name(), Some("ferris"));
    }

    #[test]
    fn test_content_with_unpopulated_owner() {
        let json = r#"{"_id":"c2","title":"t","link":"x","type":"text","userId":"u1"}"#;
        let content: Content = serde_json::from_str(json).unwrap();
        assert!(content.user.is_none());
        assert!(content.tags.is_empty());
    }

    #[test]
    fn test_unknown_content_type_rejected() {
        let json = r#"{"_id":"c3","title":"t","link":"x","type":"tweet"}"#;
        assert!(serde_json::from_str::<Content>(json).is_err());
    }

    #[test]
    fn test_new_content_serialize() {
        let body = NewContent {
            title: "Song".to_string(),
            link: "https://example.com/a.mp3".to_string(),
            content_type: ContentType::Audio,
            tags: vec!["music".to_string()],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "audio");
        assert_eq!(json["tags"][0], "music");
    }

    #[test]
    fn test_delete_request_uses_camel_case() {
        let body = DeleteContentRequest {
            content_id: "c1".to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"contentId":"c1"}"#);
    }

    #[test]
    fn test_share_response() {
        let json = r#"{"shareableLink":"http://api.example.com/api/v1/brain/u42"}"#;
        let share: ShareResponse = serde_json::from_str(json).unwrap();
        assert!(share.shareable_link.ends_with("/u42"));
    }

    #[test]
    fn test_content_type_cycle() {
        assert_eq!(ContentType::Text.next(), ContentType::Image);
        assert_eq!(ContentType::Link.next(), ContentType::Text);
        assert_eq!(ContentType::Text.prev(), ContentType::Link);
    }

    #[test]
    fn test_content_type_is_url() {
        assert!(!ContentType::Text.is_url());
        assert!(ContentType::Video.is_url());
        assert_eq!(ContentType::Text.body_placeholder(), "Enter content");
        assert_eq!(ContentType::Image.body_placeholder(), "Enter image source url");
    }
}
