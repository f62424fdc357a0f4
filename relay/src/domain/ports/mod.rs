//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod document_created_handler;
mod document_store;
mod push_gateway;

#[cfg(test)]
pub use document_created_handler::MockDocumentCreatedHandler;
pub use document_created_handler::{DocumentCreatedEvent, DocumentCreatedHandler, EventMetadata};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{DocumentStore, DocumentStoreError};
#[cfg(test)]
pub use push_gateway::MockPushGateway;
pub use push_gateway::{PushGateway, PushGatewayError};
