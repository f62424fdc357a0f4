//! Wire formats shared by the inbound and outbound adapters.
//!
//! - **firestore**: typed-value documents and document event bodies
//! - **cloudevent**: CloudEvents context attributes and structured envelopes

pub mod cloudevent;
pub mod firestore;
