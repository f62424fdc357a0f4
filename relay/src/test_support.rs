//! Test doubles and log capture shared by unit and integration tests.
//!
//! Compiled for unit tests and behind the `test-support` feature, which the
//! crate enables for its own integration tests through a dev-dependency.

use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{DocumentStore, DocumentStoreError, PushGateway, PushGatewayError};
use crate::domain::{DeviceToken, Document, NotificationPayload};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Document store backed by an in-memory map.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<BTreeMap<(String, String), Document>>,
    failure: Mutex<Option<DocumentStoreError>>,
    reads: AtomicUsize,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `document` at `collection/id`, replacing any previous value.
    pub fn insert(&self, collection: &str, id: &str, document: Document) {
        lock(&self.documents).insert((collection.to_owned(), id.to_owned()), document);
    }

    /// Make every subsequent read fail with `error`.
    pub fn fail_with(&self, error: DocumentStoreError) {
        *lock(&self.failure) = Some(error);
    }

    /// Number of reads served so far, including failed ones.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, DocumentStoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = lock(&self.failure).clone() {
            return Err(error);
        }
        Ok(lock(&self.documents)
            .get(&(collection.to_owned(), id.to_owned()))
            .cloned())
    }
}

/// One call captured by [`RecordingPushGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSend {
    /// Raw device token.
    pub token: String,
    /// Payload passed to the gateway.
    pub payload: NotificationPayload,
}

/// Push gateway that records every send and optionally fails them.
#[derive(Debug, Default)]
pub struct RecordingPushGateway {
    sends: Mutex<Vec<RecordedSend>>,
    failure: Mutex<Option<PushGatewayError>>,
}

impl RecordingPushGateway {
    /// Create a gateway that accepts every send.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail with `error`.
    pub fn fail_with(&self, error: PushGatewayError) {
        *lock(&self.failure) = Some(error);
    }

    /// Sends attempted so far, in call order.
    pub fn sends(&self) -> Vec<RecordedSend> {
        lock(&self.sends).clone()
    }
}

#[async_trait]
impl PushGateway for RecordingPushGateway {
    async fn send_to_device(
        &self,
        token: &DeviceToken,
        payload: &NotificationPayload,
    ) -> Result<(), PushGatewayError> {
        lock(&self.sends).push(RecordedSend {
            token: token.as_str().to_owned(),
            payload: payload.clone(),
        });
        match lock(&self.failure).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return its plain-text log output.
///
/// Only events emitted on the calling thread are captured, so async work must
/// be driven with a same-thread executor such as `futures::executor::block_on`.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let output = String::from_utf8_lossy(&lock(&buffer.0)).into_owned();
    (result, output)
}
