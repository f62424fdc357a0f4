//! Composition root shared by the service and the dispatch CLI.
//!
//! Builds one platform client from settings, wraps it in the Firestore and
//! FCM adapters, and binds the relay to the notifications trigger path.

use std::sync::Arc;

use crate::config::{RelaySettings, SettingsError};
use crate::domain::ports::DocumentCreatedHandler;
use crate::domain::{
    DocumentPathPattern, DocumentTrigger, NOTIFICATIONS_TRIGGER_PATTERN, NotificationRelay,
    PatternError,
};
use crate::outbound::fcm::FcmPushGateway;
use crate::outbound::firestore::FirestoreDocumentStore;
use crate::outbound::platform::{PlatformClient, PlatformClientError};

/// Errors raised while assembling the relay.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Settings were missing or malformed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The platform client could not be built.
    #[error(transparent)]
    Platform(#[from] PlatformClientError),
    /// The trigger pattern is invalid.
    #[error("invalid trigger pattern: {0}")]
    Pattern(#[from] PatternError),
}

/// Build the relay over the platform adapters described by `settings`.
///
/// # Errors
///
/// Returns [`BootstrapError`] when the settings are incomplete or the HTTP
/// client cannot be constructed.
pub fn build_relay(settings: &RelaySettings) -> Result<NotificationRelay, BootstrapError> {
    let platform = PlatformClient::new(settings.platform_config()?)?;
    Ok(NotificationRelay::new(
        Arc::new(FirestoreDocumentStore::new(platform.clone())),
        Arc::new(FcmPushGateway::new(platform)),
    ))
}

/// Bind `handler` to `notifications/{notificationId}`.
///
/// # Errors
///
/// Returns [`BootstrapError::Pattern`] if the trigger pattern fails to parse.
pub fn notifications_trigger(
    handler: Arc<dyn DocumentCreatedHandler>,
) -> Result<DocumentTrigger, BootstrapError> {
    let pattern = DocumentPathPattern::parse(NOTIFICATIONS_TRIGGER_PATTERN)?;
    Ok(DocumentTrigger::new(pattern, handler))
}

/// Build the fully wired notifications trigger from `settings`.
///
/// # Errors
///
/// Returns [`BootstrapError`] when any part of the relay cannot be built.
pub fn build_trigger(settings: &RelaySettings) -> Result<DocumentTrigger, BootstrapError> {
    notifications_trigger(Arc::new(build_relay(settings)?))
}
