//! Notification relay: one push attempt per created notification document.
//!
//! The flow is strictly linear: read the notification, look up the target
//! user, bail out quietly when the user has no device token, otherwise build
//! the payload and hand it to the push gateway exactly once. Gateway failures
//! are logged and swallowed; only problems reading the inputs fail the
//! invocation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{Instrument, error, field, info, info_span};

use super::ports::{DocumentCreatedEvent, DocumentCreatedHandler, DocumentStore, PushGateway};
use super::ports::PushGatewayError;
use super::{DeviceToken, Document, NotificationRecord, RelayError, TraceId};

/// Collection holding user documents.
pub const USERS_COLLECTION: &str = "users";
/// Trigger wildcard naming the notification document.
pub const NOTIFICATION_ID_PARAM: &str = "notificationId";

/// What happened to one notification. Every variant is a successful
/// invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The user has no device token (or no user document); nothing was sent.
    Skipped {
        /// Target user.
        user_id: String,
    },
    /// The gateway accepted the message.
    Delivered {
        /// Target user.
        user_id: String,
    },
    /// The gateway rejected the message; the failure was logged.
    DeliveryFailed {
        /// Target user.
        user_id: String,
        /// Gateway failure detail.
        error: PushGatewayError,
    },
}

impl RelayOutcome {
    /// Target user of the notification.
    pub fn user_id(&self) -> &str {
        match self {
            Self::Skipped { user_id }
            | Self::Delivered { user_id }
            | Self::DeliveryFailed { user_id, .. } => user_id.as_str(),
        }
    }

    /// Short label for the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped { .. } => "skipped",
            Self::Delivered { .. } => "delivered",
            Self::DeliveryFailed { .. } => "delivery_failed",
        }
    }
}

/// Relay from notification documents to the push gateway.
pub struct NotificationRelay {
    documents: Arc<dyn DocumentStore>,
    gateway: Arc<dyn PushGateway>,
}

impl NotificationRelay {
    /// Build a relay over the given ports.
    /// ```rust,ignore
    /// let relay = NotificationRelay::new(Arc::new(store), Arc::new(gateway));
    /// ```
    pub fn new(documents: Arc<dyn DocumentStore>, gateway: Arc<dyn PushGateway>) -> Self {
        Self { documents, gateway }
    }

    /// Relay one notification document.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MissingUserId`] when the document has no usable
    /// `userId` (no lookup is attempted) and [`RelayError::UserLookup`] when
    /// the user document cannot be read. Gateway failures are not errors.
    pub async fn relay(
        &self,
        notification_id: &str,
        notification: &Document,
    ) -> Result<RelayOutcome, RelayError> {
        let record = NotificationRecord::from_document(notification);
        let Some(user_id) = record.user_id.clone() else {
            return Err(RelayError::missing_user_id(notification_id));
        };

        let user = self
            .documents
            .get_document(USERS_COLLECTION, &user_id)
            .await
            .map_err(|source| RelayError::user_lookup(&user_id, source))?;

        let Some(token) = user.as_ref().and_then(DeviceToken::from_user_document) else {
            info!(user_id = %user_id, "no device token for user; notification skipped");
            return Ok(RelayOutcome::Skipped { user_id });
        };

        let payload = record.to_payload();
        match self.gateway.send_to_device(&token, &payload).await {
            Ok(()) => {
                info!(user_id = %user_id, "notification sent to user");
                Ok(RelayOutcome::Delivered { user_id })
            }
            // Delivery failures are non-fatal: log with detail, report success.
            Err(error) => {
                error!(user_id = %user_id, error = %error, "failed to send notification");
                Ok(RelayOutcome::DeliveryFailed { user_id, error })
            }
        }
    }
}

#[async_trait]
impl DocumentCreatedHandler for NotificationRelay {
    async fn on_document_created(
        &self,
        event: &DocumentCreatedEvent,
    ) -> Result<RelayOutcome, RelayError> {
        let notification_id = event
            .params
            .get(NOTIFICATION_ID_PARAM)
            .or_else(|| event.path.rsplit('/').next())
            .unwrap_or_default();
        let span = info_span!(
            "relay_notification",
            notification_id = %notification_id,
            event_id = field::Empty,
            trace_id = field::Empty,
        );
        if let Some(event_id) = event.metadata.event_id.as_deref() {
            span.record("event_id", event_id);
        }
        if let Some(trace_id) = TraceId::current() {
            span.record("trace_id", field::display(trace_id));
        }

        self.relay(notification_id, &event.document)
            .instrument(span)
            .await
    }
}

#[cfg(test)]
mod tests;
