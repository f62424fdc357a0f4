//! Notification records, device tokens and the push payload built from them.

use serde::Serialize;

use super::Document;

/// Title used when the notification record has none.
pub const DEFAULT_TITLE: &str = "Notification";
/// Sound requested for every relayed notification.
pub const DEFAULT_SOUND: &str = "default";

/// Field on a notification document naming the target user.
pub const USER_ID_FIELD: &str = "userId";
/// Field on a user document holding the device registration token.
pub const FCM_TOKEN_FIELD: &str = "fcmToken";

const TITLE_FIELD: &str = "title";
const MESSAGE_FIELD: &str = "message";
const ORDER_ID_FIELD: &str = "orderId";
const STATUS_FIELD: &str = "status";

/// Notification document as written by the rest of the application.
///
/// Every field is optional here; defaults are applied when the payload is
/// built, not when the record is read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationRecord {
    /// Target user identifier.
    pub user_id: Option<String>,
    /// Notification title.
    pub title: Option<String>,
    /// Notification body text.
    pub message: Option<String>,
    /// Related order identifier.
    pub order_id: Option<String>,
    /// Related order status.
    pub status: Option<String>,
}

impl NotificationRecord {
    /// Read the record fields from a notification document.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::domain::{Document, NotificationRecord};
    ///
    /// let record = NotificationRecord::from_document(&Document::from_strings([
    ///     ("userId", "u1"),
    ///     ("title", ""),
    /// ]));
    /// assert_eq!(record.user_id.as_deref(), Some("u1"));
    /// assert!(record.title.is_none());
    /// ```
    pub fn from_document(document: &Document) -> Self {
        let text = |name: &str| document.text(name).map(str::to_owned);
        Self {
            user_id: text(USER_ID_FIELD),
            title: text(TITLE_FIELD),
            message: text(MESSAGE_FIELD),
            order_id: text(ORDER_ID_FIELD),
            status: text(STATUS_FIELD),
        }
    }

    /// Build the push payload, substituting defaults for absent fields.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::domain::{NotificationRecord, DEFAULT_TITLE};
    ///
    /// let payload = NotificationRecord::default().to_payload();
    /// assert_eq!(payload.notification.title, DEFAULT_TITLE);
    /// assert_eq!(payload.notification.body, "");
    /// assert_eq!(payload.data.order_id, "");
    /// ```
    pub fn to_payload(&self) -> NotificationPayload {
        let or_empty = |value: &Option<String>| value.clone().unwrap_or_default();
        NotificationPayload {
            notification: NotificationContent {
                title: self
                    .title
                    .clone()
                    .unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
                body: or_empty(&self.message),
                sound: DEFAULT_SOUND.to_owned(),
            },
            data: NotificationData {
                order_id: or_empty(&self.order_id),
                status: or_empty(&self.status),
            },
        }
    }
}

/// Visible part of a push notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationContent {
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Sound name; always [`DEFAULT_SOUND`].
    pub sound: String,
}

/// Key/value data delivered alongside the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Related order identifier, possibly empty.
    pub order_id: String,
    /// Related order status, possibly empty.
    pub status: String,
}

/// Payload handed to the push gateway for one event.
///
/// Serialises to
/// `{"notification": {"title", "body", "sound"}, "data": {"orderId", "status"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    /// Visible notification block.
    pub notification: NotificationContent,
    /// Data block.
    pub data: NotificationData,
}

/// Device registration token addressing one device at the push gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceToken(String);

impl DeviceToken {
    /// Wrap a token, rejecting empty strings.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        (!token.is_empty()).then_some(Self(token))
    }

    /// Read the token from a user document.
    ///
    /// Returns `None` when the field is missing, null, not a string or empty.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::domain::{DeviceToken, Document};
    ///
    /// let user = Document::from_strings([("fcmToken", "tok1")]);
    /// let token = DeviceToken::from_user_document(&user).expect("token present");
    /// assert_eq!(token.as_str(), "tok1");
    /// assert!(DeviceToken::from_user_document(&Document::default()).is_none());
    /// ```
    pub fn from_user_document(user: &Document) -> Option<Self> {
        user.text(FCM_TOKEN_FIELD).and_then(Self::new)
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

// Tokens address a single device; keep them out of debug output.
impl std::fmt::Debug for DeviceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DeviceToken").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for defaulting rules and the payload wire shape.

    use super::*;
    use crate::domain::FieldValue;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn full_record_maps_every_field() {
        let doc = Document::from_strings([
            ("userId", "u1"),
            ("title", "Hi"),
            ("message", "Your order shipped"),
            ("orderId", "o1"),
            ("status", "shipped"),
        ]);

        let payload = NotificationRecord::from_document(&doc).to_payload();

        assert_eq!(
            serde_json::to_value(&payload).expect("payload serialises"),
            json!({
                "notification": {
                    "title": "Hi",
                    "body": "Your order shipped",
                    "sound": "default"
                },
                "data": { "orderId": "o1", "status": "shipped" }
            })
        );
    }

    #[test]
    fn absent_title_and_message_use_defaults() {
        let doc = Document::from_strings([("userId", "u1"), ("orderId", "o9")]);

        let payload = NotificationRecord::from_document(&doc).to_payload();

        assert_eq!(payload.notification.title, DEFAULT_TITLE);
        assert_eq!(payload.notification.body, "");
        assert_eq!(payload.notification.sound, DEFAULT_SOUND);
        assert_eq!(payload.data.order_id, "o9");
        assert_eq!(payload.data.status, "");
    }

    #[rstest]
    #[case::empty_string(FieldValue::from(""))]
    #[case::null(FieldValue::Null)]
    #[case::number(FieldValue::Integer(12))]
    fn falsy_or_non_text_title_falls_back_to_placeholder(#[case] title: FieldValue) {
        let doc: Document = [
            ("userId".to_owned(), FieldValue::from("u1")),
            ("title".to_owned(), title),
        ]
        .into_iter()
        .collect();

        let payload = NotificationRecord::from_document(&doc).to_payload();

        assert_eq!(payload.notification.title, DEFAULT_TITLE);
    }

    #[test]
    fn missing_user_id_is_preserved_as_none() {
        let record = NotificationRecord::from_document(&Document::from_strings([("title", "X")]));
        assert!(record.user_id.is_none());
    }

    #[rstest]
    #[case::missing(Document::default())]
    #[case::empty(Document::from_strings([("fcmToken", "")]))]
    #[case::null([("fcmToken".to_owned(), FieldValue::Null)].into_iter().collect())]
    #[case::not_text([("fcmToken".to_owned(), FieldValue::Boolean(true))].into_iter().collect())]
    fn absent_tokens_are_rejected(#[case] user: Document) {
        assert!(DeviceToken::from_user_document(&user).is_none());
    }

    #[test]
    fn token_debug_output_is_redacted() {
        let token = DeviceToken::new("secret-token").expect("non-empty");
        assert!(!format!("{token:?}").contains("secret-token"));
    }
}
