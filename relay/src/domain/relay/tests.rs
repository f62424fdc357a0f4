//! Unit tests for the notification relay.

use std::sync::Arc;

use futures::executor::block_on;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    DocumentStoreError, EventMetadata, MockDocumentStore, MockPushGateway,
};
use crate::domain::{FieldValue, NotificationContent, NotificationData, NotificationPayload};
use crate::domain::{PathParams, DEFAULT_TITLE};
use crate::test_support::{InMemoryDocumentStore, RecordingPushGateway, capture_logs};

struct Harness {
    store: Arc<InMemoryDocumentStore>,
    gateway: Arc<RecordingPushGateway>,
    relay: NotificationRelay,
}

impl Harness {
    fn with_user(self, user_id: &str, user: Document) -> Self {
        self.store.insert(USERS_COLLECTION, user_id, user);
        self
    }

    fn relay(&self, notification: &Document) -> Result<RelayOutcome, RelayError> {
        block_on(self.relay.relay("n1", notification))
    }
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryDocumentStore::new());
    let gateway = Arc::new(RecordingPushGateway::new());
    let relay = NotificationRelay::new(store.clone(), gateway.clone());
    Harness {
        store,
        gateway,
        relay,
    }
}

fn user_with_token(token: &str) -> Document {
    Document::from_strings([("fcmToken", token)])
}

#[rstest]
fn sends_full_payload_to_the_users_device(harness: Harness) {
    let harness = harness.with_user("u1", user_with_token("tok1"));
    let notification = Document::from_strings([
        ("userId", "u1"),
        ("title", "Hi"),
        ("message", "Your order shipped"),
        ("orderId", "o1"),
        ("status", "shipped"),
    ]);

    let outcome = harness.relay(&notification).expect("invocation succeeds");

    assert_eq!(
        outcome,
        RelayOutcome::Delivered {
            user_id: "u1".to_owned()
        }
    );
    let sends = harness.gateway.sends();
    assert_eq!(sends.len(), 1, "exactly one send per event");
    assert_eq!(sends[0].token, "tok1");
    assert_eq!(
        sends[0].payload,
        NotificationPayload {
            notification: NotificationContent {
                title: "Hi".to_owned(),
                body: "Your order shipped".to_owned(),
                sound: "default".to_owned(),
            },
            data: NotificationData {
                order_id: "o1".to_owned(),
                status: "shipped".to_owned(),
            },
        }
    );
}

#[rstest]
fn applies_defaults_for_absent_fields(harness: Harness) {
    let harness = harness.with_user("u1", user_with_token("tok1"));

    harness
        .relay(&Document::from_strings([("userId", "u1")]))
        .expect("invocation succeeds");

    let payload = &harness.gateway.sends()[0].payload;
    assert_eq!(payload.notification.title, DEFAULT_TITLE);
    assert_eq!(payload.notification.body, "");
    assert_eq!(payload.notification.sound, "default");
    assert_eq!(payload.data.order_id, "");
    assert_eq!(payload.data.status, "");
}

#[rstest]
#[case::no_token_field(Some(Document::from_strings([("name", "Ada")])))]
#[case::empty_token(Some(user_with_token("")))]
#[case::null_token(Some([("fcmToken".to_owned(), FieldValue::Null)].into_iter().collect()))]
#[case::missing_user(None)]
fn skips_users_without_a_device_token(harness: Harness, #[case] user: Option<Document>) {
    let harness = match user {
        Some(user) => harness.with_user("u2", user),
        None => harness,
    };

    let outcome = harness
        .relay(&Document::from_strings([("userId", "u2")]))
        .expect("skip is not an error");

    assert_eq!(
        outcome,
        RelayOutcome::Skipped {
            user_id: "u2".to_owned()
        }
    );
    assert!(harness.gateway.sends().is_empty(), "gateway must not be called");
}

#[rstest]
fn swallows_gateway_failures(harness: Harness) {
    let harness = harness.with_user("u3", user_with_token("tok3"));
    harness
        .gateway
        .fail_with(PushGatewayError::unavailable("backend down"));

    let outcome = harness
        .relay(&Document::from_strings([("userId", "u3"), ("title", "X")]))
        .expect("delivery failure does not fail the invocation");

    assert_eq!(
        outcome,
        RelayOutcome::DeliveryFailed {
            user_id: "u3".to_owned(),
            error: PushGatewayError::unavailable("backend down"),
        }
    );
    assert_eq!(harness.gateway.sends().len(), 1, "no retry after failure");
}

#[rstest]
fn redelivered_events_are_sent_again(harness: Harness) {
    let harness = harness.with_user("u1", user_with_token("tok1"));
    let notification = Document::from_strings([("userId", "u1"), ("title", "Hi")]);

    harness.relay(&notification).expect("first delivery");
    harness.relay(&notification).expect("second delivery");

    let sends = harness.gateway.sends();
    assert_eq!(sends.len(), 2, "no deduplication across deliveries");
    assert_eq!(sends[0], sends[1]);
}

#[rstest]
fn missing_user_id_fails_without_lookup(harness: Harness) {
    let result = harness.relay(&Document::from_strings([("title", "orphan")]));

    assert_eq!(result, Err(RelayError::missing_user_id("n1")));
    assert_eq!(harness.store.reads(), 0);
    assert!(harness.gateway.sends().is_empty());
}

#[test]
fn lookup_failures_propagate() {
    let mut store = MockDocumentStore::new();
    store
        .expect_get_document()
        .times(1)
        .returning(|_, _| Err(DocumentStoreError::unauthorized("token expired")));
    let mut gateway = MockPushGateway::new();
    gateway.expect_send_to_device().times(0);
    let relay = NotificationRelay::new(Arc::new(store), Arc::new(gateway));

    let result = block_on(relay.relay("n1", &Document::from_strings([("userId", "u1")])));

    assert_eq!(
        result,
        Err(RelayError::user_lookup(
            "u1",
            DocumentStoreError::unauthorized("token expired")
        ))
    );
}

#[test]
fn looks_up_the_users_collection() {
    let mut store = MockDocumentStore::new();
    store
        .expect_get_document()
        .withf(|collection, id| collection == "users" && id == "u9")
        .times(1)
        .returning(|_, _| Ok(None));
    let relay = NotificationRelay::new(Arc::new(store), Arc::new(MockPushGateway::new()));

    let outcome = block_on(relay.relay("n1", &Document::from_strings([("userId", "u9")])))
        .expect("missing user is a skip");

    assert_eq!(outcome.label(), "skipped");
    assert_eq!(outcome.user_id(), "u9");
}

#[rstest]
fn skip_logs_one_info_line_naming_the_user(harness: Harness) {
    let (outcome, logs) =
        capture_logs(|| harness.relay(&Document::from_strings([("userId", "u2")])));

    assert!(outcome.is_ok());
    let lines: Vec<&str> = logs
        .lines()
        .filter(|line| line.contains("no device token for user"))
        .collect();
    assert_eq!(lines.len(), 1, "expected one skip line, got: {logs}");
    assert!(lines[0].contains("INFO"));
    assert!(lines[0].contains("u2"));
}

#[rstest]
fn success_logs_one_info_line_naming_the_user(harness: Harness) {
    let harness = harness.with_user("u1", user_with_token("tok1"));

    let (_, logs) = capture_logs(|| harness.relay(&Document::from_strings([("userId", "u1")])));

    let line = logs
        .lines()
        .find(|line| line.contains("notification sent to user"))
        .expect("success line is logged");
    assert!(line.contains("INFO"));
    assert!(line.contains("u1"));
    assert!(!logs.contains("tok1"), "device tokens must not be logged");
}

#[rstest]
fn failure_logs_one_error_line_with_detail(harness: Harness) {
    let harness = harness.with_user("u3", user_with_token("tok3"));
    harness
        .gateway
        .fail_with(PushGatewayError::unregistered("status 404: UNREGISTERED"));

    let (outcome, logs) = capture_logs(|| {
        harness.relay(&Document::from_strings([("userId", "u3"), ("title", "X")]))
    });

    assert!(outcome.is_ok());
    let errors: Vec<&str> = logs.lines().filter(|line| line.contains("ERROR")).collect();
    assert_eq!(errors.len(), 1, "expected one error line, got: {logs}");
    assert!(errors[0].contains("failed to send notification"));
    assert!(errors[0].contains("status 404: UNREGISTERED"));
    assert!(errors[0].contains("u3"));
}

#[rstest]
fn handler_uses_notification_id_from_trigger_params(harness: Harness) {
    let event = DocumentCreatedEvent {
        path: "notifications/n77".to_owned(),
        params: [(NOTIFICATION_ID_PARAM, "n77")].into_iter().collect::<PathParams>(),
        document: Document::from_strings([("title", "no user")]),
        metadata: EventMetadata::default(),
    };

    let result = block_on(harness.relay.on_document_created(&event));

    assert_eq!(result, Err(RelayError::missing_user_id("n77")));
}

#[rstest]
fn handler_falls_back_to_last_path_segment(harness: Harness) {
    let event = DocumentCreatedEvent {
        path: "notifications/n88".to_owned(),
        params: PathParams::default(),
        document: Document::default(),
        metadata: EventMetadata::default(),
    };

    let result = block_on(harness.relay.on_document_created(&event));

    assert_eq!(result, Err(RelayError::missing_user_id("n88")));
}
