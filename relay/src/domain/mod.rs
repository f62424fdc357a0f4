//! Domain model and orchestration for the notification relay.
//!
//! Purpose: keep the relay logic independent of the document store, the push
//! gateway and the hosting runtime. Adapters depend on this module; it never
//! depends on them.
//!
//! Public surface:
//! - Document / FieldValue: schemaless document snapshots.
//! - NotificationRecord / NotificationPayload / DeviceToken: inputs and output
//!   of one relay step.
//! - NotificationRelay / RelayOutcome / RelayError: the handler itself.
//! - DocumentPathPattern / DocumentTrigger: binding of paths to handlers.
//! - TraceId: invocation-scoped correlation identifier.

mod document;
mod error;
mod notification;
pub mod ports;
mod relay;
mod trace_id;
mod trigger;

pub use self::document::{Document, FieldValue};
pub use self::error::RelayError;
pub use self::notification::{
    DEFAULT_SOUND, DEFAULT_TITLE, DeviceToken, FCM_TOKEN_FIELD, NotificationContent,
    NotificationData, NotificationPayload, NotificationRecord, USER_ID_FIELD,
};
pub use self::relay::{NOTIFICATION_ID_PARAM, NotificationRelay, RelayOutcome, USERS_COLLECTION};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::trigger::{
    DocumentPathPattern, DocumentTrigger, NOTIFICATIONS_TRIGGER_PATTERN, PathParams, PatternError,
};
