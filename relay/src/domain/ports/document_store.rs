//! Driven port for reading documents from the document store.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Document;

define_port_error! {
    /// Errors surfaced while reading from the document store.
    pub enum DocumentStoreError {
        /// Network transport failed before a usable response arrived.
        Transport => "document store transport failed",
        /// The read exceeded its deadline.
        Timeout => "document store timeout",
        /// Credentials were missing, expired or lacked access.
        Unauthorized => "document store denied access",
        /// The request was rejected before or during execution.
        InvalidRequest => "document store request invalid",
        /// The stored document could not be decoded.
        Decode => "document store response decode failed",
    }
}

/// Port for single-document lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch `collection/id`, returning `Ok(None)` when it does not exist.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use notification_relay::domain::ports::DocumentStore;
    ///
    /// let user = store.get_document("users", "u1").await?;
    /// let token = user.as_ref().and_then(|doc| doc.text("fcmToken"));
    /// # Ok::<(), notification_relay::domain::ports::DocumentStoreError>(())
    /// ```
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, DocumentStoreError>;
}

