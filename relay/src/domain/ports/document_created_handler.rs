//! Driving port invoked once per document-creation event.
//!
//! The hosting runtime (an HTTP CloudEvent receiver, a replay CLI, a test)
//! decodes its own envelope into a [`DocumentCreatedEvent`] and hands it to a
//! handler bound through [`crate::domain::DocumentTrigger`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Document, PathParams, RelayError, RelayOutcome};

/// Delivery metadata attached to an event by the hosting runtime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventMetadata {
    /// Event identifier assigned by the event source, if any.
    pub event_id: Option<String>,
    /// Creation time of the document, if the source reported one.
    pub create_time: Option<DateTime<Utc>>,
}

/// A newly created document together with its trigger context.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCreatedEvent {
    /// Document path relative to the database root, e.g. `notifications/n1`.
    pub path: String,
    /// Wildcards captured from the trigger pattern.
    pub params: PathParams,
    /// Field values of the created document.
    pub document: Document,
    /// Delivery metadata.
    pub metadata: EventMetadata,
}

/// Port implemented by event handlers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentCreatedHandler: Send + Sync {
    /// Handle one creation event.
    ///
    /// `Ok` means the invocation succeeded from the event source's point of
    /// view, whatever the outcome variant. `Err` marks the invocation failed.
    async fn on_document_created(
        &self,
        event: &DocumentCreatedEvent,
    ) -> Result<RelayOutcome, RelayError>;
}
