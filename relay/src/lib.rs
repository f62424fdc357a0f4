//! Notification relay library modules.
//!
//! Turns newly created notification documents into single-device push
//! messages. The domain layer holds the relay logic and its ports; inbound
//! and outbound adapters connect it to CloudEvent delivery, the document
//! store and the push gateway.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod logging;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod wire;
pub mod wiring;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
