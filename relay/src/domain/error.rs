//! Errors that fail a relay invocation.
//!
//! Push delivery failures are deliberately absent: the relay logs and
//! swallows them, so they surface as [`crate::domain::RelayOutcome`] values
//! instead. Everything here is reported to the event source as a failed
//! invocation.

use super::ports::DocumentStoreError;

/// Invocation-level failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// The event envelope or document could not be interpreted.
    #[error("invalid event: {message}")]
    InvalidEvent {
        /// Human-readable reason.
        message: String,
    },
    /// The notification document carries no usable `userId`.
    #[error("notification {notification_id} has no userId")]
    MissingUserId {
        /// Identifier of the triggering notification document.
        notification_id: String,
    },
    /// Reading the user document failed.
    #[error("failed to look up user {user_id}: {source}")]
    UserLookup {
        /// User whose document was requested.
        user_id: String,
        /// Underlying store failure.
        #[source]
        source: DocumentStoreError,
    },
}

impl RelayError {
    /// Build an [`RelayError::InvalidEvent`].
    pub fn invalid_event(message: impl Into<String>) -> Self {
        Self::InvalidEvent {
            message: message.into(),
        }
    }

    /// Build a [`RelayError::MissingUserId`].
    pub fn missing_user_id(notification_id: impl Into<String>) -> Self {
        Self::MissingUserId {
            notification_id: notification_id.into(),
        }
    }

    /// Build a [`RelayError::UserLookup`].
    pub fn user_lookup(user_id: impl Into<String>, source: DocumentStoreError) -> Self {
        Self::UserLookup {
            user_id: user_id.into(),
            source,
        }
    }

    /// Stable machine-readable code for adapters.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::domain::RelayError;
    ///
    /// assert_eq!(RelayError::missing_user_id("n1").code(), "missing_user_id");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEvent { .. } => "invalid_event",
            Self::MissingUserId { .. } => "missing_user_id",
            Self::UserLookup { .. } => "user_lookup_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for error messages and codes.

    use super::*;
    use std::error::Error as _;

    #[test]
    fn user_lookup_exposes_store_error_as_source() {
        let err = RelayError::user_lookup("u1", DocumentStoreError::timeout("deadline"));
        assert_eq!(
            err.to_string(),
            "failed to look up user u1: document store timeout: deadline"
        );
        assert!(err.source().is_some());
        assert_eq!(err.code(), "user_lookup_failed");
    }

    #[test]
    fn missing_user_id_names_the_notification() {
        let err = RelayError::missing_user_id("n42");
        assert_eq!(err.to_string(), "notification n42 has no userId");
    }
}
