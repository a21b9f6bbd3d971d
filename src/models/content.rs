//! Content models
//!
//! This module provides:
//! - `ContentKind`, the kind token discriminating the four item types
//! - The four concrete item entities and the `ContentItem` sum type
//! - `Content`, the association row linking a module to one item with an
//!   explicit position
//! - The per-kind form field schema (an enumerated allow-list; server-managed
//!   fields never appear in it)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind token for the four content item types.
///
/// Resolved from the URL path segment; any other token yields `None` and is
/// reported as not found at dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Plain text body
    Text,
    /// Embedded video URL
    Video,
    /// Image reference
    Image,
    /// Uploaded file reference
    File,
}

impl ContentKind {
    /// Resolve a kind token to a concrete kind
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "text" => Some(ContentKind::Text),
            "video" => Some(ContentKind::Video),
            "image" => Some(ContentKind::Image),
            "file" => Some(ContentKind::File),
            _ => None,
        }
    }

    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Video => "video",
            ContentKind::Image => "image",
            ContentKind::File => "file",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text item: a plain text body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextItem {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Video item: an embed URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoItem {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Image item: a stored image path or URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageItem {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// File item: a stored file path or URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileItem {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub file: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Polymorphic content item: a tagged union over the four concrete types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentItem {
    Text(TextItem),
    Video(VideoItem),
    Image(ImageItem),
    File(FileItem),
}

impl ContentItem {
    /// The kind discriminator of this item
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Text(_) => ContentKind::Text,
            ContentItem::Video(_) => ContentKind::Video,
            ContentItem::Image(_) => ContentKind::Image,
            ContentItem::File(_) => ContentKind::File,
        }
    }

    /// Item row ID
    pub fn id(&self) -> i64 {
        match self {
            ContentItem::Text(i) => i.id,
            ContentItem::Video(i) => i.id,
            ContentItem::Image(i) => i.id,
            ContentItem::File(i) => i.id,
        }
    }

    /// Owning user ID
    pub fn owner_id(&self) -> i64 {
        match self {
            ContentItem::Text(i) => i.owner_id,
            ContentItem::Video(i) => i.owner_id,
            ContentItem::Image(i) => i.owner_id,
            ContentItem::File(i) => i.owner_id,
        }
    }

    /// Item title
    pub fn title(&self) -> &str {
        match self {
            ContentItem::Text(i) => &i.title,
            ContentItem::Video(i) => &i.title,
            ContentItem::Image(i) => &i.title,
            ContentItem::File(i) => &i.title,
        }
    }

    /// The kind-specific payload field value
    pub fn payload(&self) -> &str {
        match self {
            ContentItem::Text(i) => &i.body,
            ContentItem::Video(i) => &i.url,
            ContentItem::Image(i) => &i.image,
            ContentItem::File(i) => &i.file,
        }
    }
}

/// Content association row.
///
/// Links a module to one polymorphic item via the `(item_kind, item_id)`
/// pair. `sort_order` is 0-based and contiguous per module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Unique identifier
    pub id: i64,
    /// Owning module ID
    pub module_id: i64,
    /// Item kind discriminator
    pub item_kind: ContentKind,
    /// Item row ID within the kind's table
    pub item_id: i64,
    /// 0-based position within the module
    pub sort_order: i64,
}

/// A content association resolved together with its item
#[derive(Debug, Clone, Serialize)]
pub struct ContentWithItem {
    /// The association row
    #[serde(flatten)]
    pub content: Content,
    /// The resolved polymorphic item
    pub item: ContentItem,
}

/// Submitted content item form.
///
/// Unknown fields (including a forged `owner`) are dropped by serde; only
/// the allow-listed field for the resolved kind is consulted, and the owner
/// is always taken from the authenticated session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentForm {
    /// Item title (required for every kind)
    #[serde(default)]
    pub title: String,
    /// Text body (kind: text)
    pub body: Option<String>,
    /// Video URL (kind: video)
    pub url: Option<String>,
    /// Image path or URL (kind: image)
    pub image: Option<String>,
    /// File path or URL (kind: file)
    pub file: Option<String>,
}

impl ContentForm {
    /// The payload value matching the given kind, if submitted
    pub fn payload_for(&self, kind: ContentKind) -> Option<&str> {
        match kind {
            ContentKind::Text => self.body.as_deref(),
            ContentKind::Video => self.url.as_deref(),
            ContentKind::Image => self.image.as_deref(),
            ContentKind::File => self.file.as_deref(),
        }
    }
}

/// Field data type, for client-side form construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single-line text
    Text,
    /// Multi-line text
    LongText,
    /// URL
    Url,
    /// Stored path or URL reference
    Path,
}

/// One editable field of a content item form
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    /// Field name as submitted
    pub name: &'static str,
    /// Field data type
    pub field_type: FieldType,
    /// Whether the field must be non-empty
    pub required: bool,
}

/// The editable fields for each kind.
///
/// This is the explicit allow-list: every item field except the
/// server-managed ones (owner, order, created, updated).
pub fn form_fields(kind: ContentKind) -> &'static [FieldSpec] {
    const TITLE: FieldSpec = FieldSpec {
        name: "title",
        field_type: FieldType::Text,
        required: true,
    };

    match kind {
        ContentKind::Text => &[
            TITLE,
            FieldSpec {
                name: "body",
                field_type: FieldType::LongText,
                required: true,
            },
        ],
        ContentKind::Video => &[
            TITLE,
            FieldSpec {
                name: "url",
                field_type: FieldType::Url,
                required: true,
            },
        ],
        ContentKind::Image => &[
            TITLE,
            FieldSpec {
                name: "image",
                field_type: FieldType::Path,
                required: true,
            },
        ],
        ContentKind::File => &[
            TITLE,
            FieldSpec {
                name: "file",
                field_type: FieldType::Path,
                required: true,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_token() {
        assert_eq!(ContentKind::from_token("text"), Some(ContentKind::Text));
        assert_eq!(ContentKind::from_token("video"), Some(ContentKind::Video));
        assert_eq!(ContentKind::from_token("image"), Some(ContentKind::Image));
        assert_eq!(ContentKind::from_token("file"), Some(ContentKind::File));
        assert_eq!(ContentKind::from_token("audio"), None);
        assert_eq!(ContentKind::from_token(""), None);
        // Tokens are case-sensitive path segments
        assert_eq!(ContentKind::from_token("Text"), None);
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            ContentKind::Text,
            ContentKind::Video,
            ContentKind::Image,
            ContentKind::File,
        ] {
            assert_eq!(ContentKind::from_token(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_form_fields_exclude_server_managed() {
        for kind in [
            ContentKind::Text,
            ContentKind::Video,
            ContentKind::Image,
            ContentKind::File,
        ] {
            let fields = form_fields(kind);
            assert_eq!(fields.len(), 2, "title plus one payload field");
            assert!(fields.iter().all(|f| {
                f.name != "owner"
                    && f.name != "order"
                    && f.name != "created_at"
                    && f.name != "updated_at"
            }));
            assert_eq!(fields[0].name, "title");
        }
    }

    #[test]
    fn test_content_form_ignores_unknown_fields() {
        // A forged owner field must not be deserializable into the form
        let json = r#"{"title": "Intro", "body": "Welcome", "owner": 999}"#;
        let form: ContentForm = serde_json::from_str(json).expect("Form should parse");
        assert_eq!(form.title, "Intro");
        assert_eq!(form.body.as_deref(), Some("Welcome"));
    }

    #[test]
    fn test_content_form_payload_for() {
        let form = ContentForm {
            title: "Clip".to_string(),
            url: Some("https://example.com/v.mp4".to_string()),
            ..Default::default()
        };
        assert_eq!(form.payload_for(ContentKind::Video), Some("https://example.com/v.mp4"));
        assert_eq!(form.payload_for(ContentKind::Text), None);
    }

    #[test]
    fn test_content_item_accessors() {
        let item = ContentItem::Video(VideoItem {
            id: 7,
            owner_id: 3,
            title: "Lecture 1".to_string(),
            url: "https://example.com/1.mp4".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });

        assert_eq!(item.kind(), ContentKind::Video);
        assert_eq!(item.id(), 7);
        assert_eq!(item.owner_id(), 3);
        assert_eq!(item.title(), "Lecture 1");
        assert_eq!(item.payload(), "https://example.com/1.mp4");
    }
}
