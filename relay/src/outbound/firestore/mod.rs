//! Firestore outbound adapters.
//!
//! This module provides a thin REST implementation of the `DocumentStore`
//! port.

mod document_store;

pub use document_store::FirestoreDocumentStore;
