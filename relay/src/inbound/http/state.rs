//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the trigger binding and stay testable without I/O.

use std::sync::Arc;

use crate::domain::DocumentTrigger;

/// Dependency bundle for the event receiver.
#[derive(Clone)]
pub struct HttpState {
    /// Bound document-created trigger.
    pub trigger: Arc<DocumentTrigger>,
}

impl HttpState {
    /// Wrap a trigger for use as app data.
    pub fn new(trigger: DocumentTrigger) -> Self {
        Self {
            trigger: Arc::new(trigger),
        }
    }
}
