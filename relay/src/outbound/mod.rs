//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **platform**: shared reqwest handle, project identity and credentials
//! - **firestore**: `DocumentStore` over the Firestore REST API
//! - **fcm**: `PushGateway` over the FCM HTTP v1 API
//!
//! Adapters are thin translators that convert between domain types and
//! wire representations. They contain no business logic.

pub mod fcm;
pub mod firestore;
pub mod platform;
