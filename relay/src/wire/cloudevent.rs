//! CloudEvents context attributes and the structured-mode envelope.
//!
//! Binary-mode events carry their attributes in `ce-*` headers and the data
//! as the body; structured-mode events carry everything in one JSON object.
//! Both are reduced to a [`CloudEventContext`] plus the raw data.

use serde::Deserialize;

/// Media type of a structured-mode event.
pub const STRUCTURED_CONTENT_TYPE: &str = "application/cloudevents+json";
/// Media type of a batched structured-mode delivery.
pub const BATCH_CONTENT_TYPE: &str = "application/cloudevents-batch+json";
/// Event type emitted when a Firestore document is created.
pub const DOCUMENT_CREATED_TYPE: &str = "google.cloud.firestore.document.v1.created";
/// Variant of [`DOCUMENT_CREATED_TYPE`] that also carries the caller identity.
pub const DOCUMENT_CREATED_WITH_AUTH_TYPE: &str =
    "google.cloud.firestore.document.v1.created.withAuthContext";

/// Header prefix for binary-mode attributes.
pub const BINARY_HEADER_PREFIX: &str = "ce-";

/// Required and optional attributes of one event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloudEventContext {
    /// Producer-unique event identifier; stable across redeliveries.
    pub id: String,
    /// Event type, e.g. [`DOCUMENT_CREATED_TYPE`].
    #[serde(rename = "type")]
    pub event_type: String,
    /// Producer resource.
    pub source: String,
    /// Subject within the source, e.g. `documents/notifications/n1`.
    #[serde(default)]
    pub subject: Option<String>,
    /// Occurrence time as sent by the producer.
    #[serde(default)]
    pub time: Option<String>,
}

impl CloudEventContext {
    /// Whether this event reports a created document.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::wire::cloudevent::{CloudEventContext, DOCUMENT_CREATED_TYPE};
    ///
    /// let context = CloudEventContext {
    ///     id: "1".into(),
    ///     event_type: DOCUMENT_CREATED_TYPE.into(),
    ///     source: "//firestore.googleapis.com/projects/p/databases/(default)".into(),
    ///     subject: None,
    ///     time: None,
    /// };
    /// assert!(context.is_document_created());
    /// ```
    pub fn is_document_created(&self) -> bool {
        matches!(
            self.event_type.as_str(),
            DOCUMENT_CREATED_TYPE | DOCUMENT_CREATED_WITH_AUTH_TYPE
        )
    }

    /// Document path named by the subject, without the `documents/` prefix.
    pub fn subject_document_path(&self) -> Option<&str> {
        self.subject
            .as_deref()
            .map(|subject| subject.strip_prefix("documents/").unwrap_or(subject))
            .filter(|path| !path.is_empty())
    }
}

/// Structured-mode event: attributes and data in one JSON object.
#[derive(Debug, Clone, Deserialize)]
pub struct StructuredEventDto {
    /// Context attributes.
    #[serde(flatten)]
    pub context: CloudEventContext,
    /// Media type of `data`, when declared.
    #[serde(default)]
    pub datacontenttype: Option<String>,
    /// Event data.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Whether a declared data media type is JSON.
pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json") || essence == "text/json"
}
