//! Reqwest-backed Firestore document store.
//!
//! This adapter owns transport details only: resource URL construction,
//! HTTP error mapping, and decoding typed Firestore JSON into domain
//! documents.

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::domain::Document;
use crate::domain::ports::{DocumentStore, DocumentStoreError};
use crate::outbound::platform::{PlatformClient, status_message};
use crate::wire::firestore::DocumentDto;

/// Document store reading single documents through the Firestore REST API.
#[derive(Debug, Clone)]
pub struct FirestoreDocumentStore {
    platform: PlatformClient,
}

impl FirestoreDocumentStore {
    /// Build an adapter over the shared platform client.
    pub fn new(platform: PlatformClient) -> Self {
        Self { platform }
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url, DocumentStoreError> {
        validate_segment("collection", collection)?;
        validate_segment("document id", id)?;
        self.platform
            .firestore_url([
                "v1",
                "projects",
                self.platform.project_id(),
                "databases",
                self.platform.database_id(),
                "documents",
                collection,
                id,
            ])
            .ok_or_else(|| {
                DocumentStoreError::invalid_request("Firestore endpoint is not a base URL")
            })
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let url = self.document_url(collection, id)?;
        let response = self
            .platform
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_document(body.as_ref()).map(Some)
    }
}

fn validate_segment(label: &str, value: &str) -> Result<(), DocumentStoreError> {
    if value.is_empty() {
        return Err(DocumentStoreError::invalid_request(format!(
            "{label} must not be empty"
        )));
    }
    if value.contains('/') {
        return Err(DocumentStoreError::invalid_request(format!(
            "{label} `{value}` must not contain `/`"
        )));
    }
    Ok(())
}

fn parse_document(body: &[u8]) -> Result<Document, DocumentStoreError> {
    DocumentDto::from_slice(body)
        .and_then(|dto| dto.to_document())
        .map_err(|error| DocumentStoreError::decode(error.to_string()))
}

fn map_transport_error(error: reqwest::Error) -> DocumentStoreError {
    if error.is_timeout() {
        DocumentStoreError::timeout(error.to_string())
    } else {
        DocumentStoreError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DocumentStoreError {
    let message = status_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DocumentStoreError::unauthorized(message)
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            DocumentStoreError::timeout(message)
        }
        _ if status.is_client_error() => DocumentStoreError::invalid_request(message),
        _ => DocumentStoreError::transport(message),
    }
}
