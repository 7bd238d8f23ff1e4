//! Data model definitions for editable page content.
//!
//! This module defines the records the content store keeps in durable storage.
//! The primary model is [`EditableContent`], the current override for one
//! editable page region, and [`ContentHistory`], one immutable record per
//! committed update. Payloads are the tagged union [`ContentPayload`], keyed by
//! [`ContentType`] and checked once when they cross the store boundary.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ContentError;

/// The seven shapes an editable region can take.
///
/// Serialized in kebab-case (`"rich-text"`, `"contact-method"`), which is
/// also the form accepted by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    #[default]
    Text,
    RichText,
    Image,
    Plan,
    Testimonial,
    Stat,
    ContactMethod,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Text,
        ContentType::RichText,
        ContentType::Image,
        ContentType::Plan,
        ContentType::Testimonial,
        ContentType::Stat,
        ContentType::ContactMethod,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::RichText => "rich-text",
            ContentType::Image => "image",
            ContentType::Plan => "plan",
            ContentType::Testimonial => "testimonial",
            ContentType::Stat => "stat",
            ContentType::ContactMethod => "contact-method",
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ContentError::UnknownType(s.to_string()))
    }
}

/// Image reference. A deleted image is kept as a tombstone
/// (`src` and `alt` empty, `deleted` set) so it stays distinguishable from an
/// image that was never overridden.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file: Option<String>,
}

impl ImageContent {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            deleted: false,
            original_file: None,
        }
    }

    pub fn tombstone() -> Self {
        Self {
            src: String::new(),
            alt: String::new(),
            deleted: true,
            original_file: None,
        }
    }
}

/// One pricing plan card.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanData {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_popular: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub button_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl PlanData {
    /// Plans are visible unless explicitly hidden.
    pub fn visible(&self) -> bool {
        self.is_visible != Some(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatData {
    pub id: String,
    pub number: f64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMethodData {
    pub id: String,
    pub icon: String,
    pub title: String,
    pub value: String,
    pub action: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub method_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanListContent {
    pub plans: Vec<PlanData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestimonialListContent {
    pub testimonials: Vec<TestimonialData>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatListContent {
    pub stats: Vec<StatData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMethodListContent {
    pub contact_methods: Vec<ContactMethodData>,
}

/// Type-dependent content of an editable region.
///
/// Serialized without a tag: text variants are bare JSON strings, the rest are
/// the objects stored by the page (`{src, alt}`, `{plans: [...]}`, ...). The
/// tag lives next to the payload as the record's `type` field, so decoding
/// always goes through [`ContentPayload::from_value`].
///
/// ```rust
/// use callistra_content_core::content_model::{ContentPayload, ContentType};
/// use serde_json::json;
///
/// let payload = ContentPayload::from_value(ContentType::Image, json!({"src": "/logo.png", "alt": "Logo"}))?;
/// assert_eq!(payload.kind(), ContentType::Image);
///
/// let wrong = ContentPayload::from_value(ContentType::Plan, json!("not a plan list"));
/// assert!(wrong.is_err());
/// # Ok::<(), callistra_content_core::error::ContentError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContentPayload {
    Text(String),
    RichText(String),
    Image(ImageContent),
    Plans(PlanListContent),
    Testimonials(TestimonialListContent),
    Stats(StatListContent),
    ContactMethods(ContactMethodListContent),
}

impl ContentPayload {
    pub fn kind(&self) -> ContentType {
        match self {
            ContentPayload::Text(_) => ContentType::Text,
            ContentPayload::RichText(_) => ContentType::RichText,
            ContentPayload::Image(_) => ContentType::Image,
            ContentPayload::Plans(_) => ContentType::Plan,
            ContentPayload::Testimonials(_) => ContentType::Testimonial,
            ContentPayload::Stats(_) => ContentType::Stat,
            ContentPayload::ContactMethods(_) => ContentType::ContactMethod,
        }
    }

    /// Decodes an untyped JSON payload as the shape `kind` requires.
    pub fn from_value(kind: ContentType, value: JsonValue) -> Result<Self, ContentError> {
        let mismatch = |err: serde_json::Error| ContentError::ShapeMismatch {
            kind,
            reason: err.to_string(),
        };

        let payload = match kind {
            ContentType::Text => ContentPayload::Text(serde_json::from_value(value).map_err(mismatch)?),
            ContentType::RichText => {
                ContentPayload::RichText(serde_json::from_value(value).map_err(mismatch)?)
            }
            ContentType::Image => ContentPayload::Image(serde_json::from_value(value).map_err(mismatch)?),
            ContentType::Plan => ContentPayload::Plans(serde_json::from_value(value).map_err(mismatch)?),
            ContentType::Testimonial => {
                ContentPayload::Testimonials(serde_json::from_value(value).map_err(mismatch)?)
            }
            ContentType::Stat => ContentPayload::Stats(serde_json::from_value(value).map_err(mismatch)?),
            ContentType::ContactMethod => {
                ContentPayload::ContactMethods(serde_json::from_value(value).map_err(mismatch)?)
            }
        };
        Ok(payload)
    }

    /// Text of the `Text`/`RichText` variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPayload::Text(text) | ContentPayload::RichText(text) => Some(text),
            _ => None,
        }
    }
}

/// Current value of one editable region.
///
/// At most one `EditableContent` exists per [`id`](Self::id). A region with no
/// entry renders the default baked into the page at the call site.
///
/// # Serialization
///
/// Stored as camelCase JSON, with the payload decoded according to `type`:
///
/// ```rust
/// use callistra_content_core::content_model::{ContentPayload, EditableContent};
///
/// let json = r#"{
///     "id": "hero-title",
///     "type": "text",
///     "section": "hero",
///     "content": "Gestão jurídica simplificada",
///     "lastModified": "2024-05-01T12:00:00Z",
///     "modifiedBy": "user"
/// }"#;
///
/// let entry: EditableContent = serde_json::from_str(json)?;
/// assert_eq!(entry.content, ContentPayload::Text("Gestão jurídica simplificada".into()));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEditableContent")]
pub struct EditableContent {
    /// Stable key chosen by the page author, e.g. `"hero-title"`.
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ContentType,

    /// Grouping label for reporting only; not part of the key.
    pub section: String,

    pub content: ContentPayload,

    pub last_modified: DateTime<Utc>,

    pub modified_by: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEditableContent {
    id: String,
    #[serde(rename = "type", default)]
    kind: ContentType,
    section: String,
    content: JsonValue,
    last_modified: DateTime<Utc>,
    modified_by: String,
}

impl TryFrom<RawEditableContent> for EditableContent {
    type Error = ContentError;

    fn try_from(raw: RawEditableContent) -> Result<Self, Self::Error> {
        Ok(Self {
            content: ContentPayload::from_value(raw.kind, raw.content)?,
            id: raw.id,
            kind: raw.kind,
            section: raw.section,
            last_modified: raw.last_modified,
            modified_by: raw.modified_by,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
}

impl HistoryAction {
    pub fn label(&self) -> &'static str {
        match self {
            HistoryAction::Create => "Created",
            HistoryAction::Update => "Updated",
            HistoryAction::Delete => "Deleted",
        }
    }
}

/// Immutable log entry for one committed update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawContentHistory")]
pub struct ContentHistory {
    /// Fresh UUID per record.
    pub id: String,
    pub content_id: String,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub section: String,
    pub action: HistoryAction,
    /// Type of `previous_content`; differs from `kind` when an update changed
    /// the region's type.
    #[serde(rename = "previousType")]
    pub previous_kind: ContentType,
    pub previous_content: ContentPayload,
    pub new_content: ContentPayload,
    pub timestamp: DateTime<Utc>,
    pub modified_by: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContentHistory {
    id: String,
    content_id: String,
    #[serde(rename = "type", default)]
    kind: ContentType,
    section: String,
    action: HistoryAction,
    #[serde(rename = "previousType", default)]
    previous_kind: Option<ContentType>,
    previous_content: JsonValue,
    new_content: JsonValue,
    timestamp: DateTime<Utc>,
    modified_by: String,
}

impl TryFrom<RawContentHistory> for ContentHistory {
    type Error = ContentError;

    fn try_from(raw: RawContentHistory) -> Result<Self, Self::Error> {
        let previous_kind = raw.previous_kind.unwrap_or(raw.kind);
        Ok(Self {
            previous_content: ContentPayload::from_value(previous_kind, raw.previous_content)?,
            new_content: ContentPayload::from_value(raw.kind, raw.new_content)?,
            id: raw.id,
            content_id: raw.content_id,
            kind: raw.kind,
            previous_kind,
            section: raw.section,
            action: raw.action,
            timestamp: raw.timestamp,
            modified_by: raw.modified_by,
        })
    }
}
