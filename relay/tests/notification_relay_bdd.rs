//! Behaviour tests for relaying created notification documents.
//!
//! Each scenario drives the notifications trigger end to end over in-memory
//! doubles for the document store and the push gateway, capturing log output
//! so the operator-facing lines can be asserted.

use std::cell::RefCell;
use std::sync::Arc;

use futures::executor::block_on;
use notification_relay::domain::ports::{EventMetadata, PushGatewayError};
use notification_relay::domain::{
    Document, DocumentPathPattern, DocumentTrigger, NOTIFICATIONS_TRIGGER_PATTERN,
    NotificationRelay, RelayError, RelayOutcome,
};
use notification_relay::test_support::{InMemoryDocumentStore, RecordingPushGateway, capture_logs};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const NOTIFICATION_ID: &str = "n1";

struct RelayWorld {
    store: Arc<InMemoryDocumentStore>,
    gateway: Arc<RecordingPushGateway>,
    notification: RefCell<Document>,
    outcome: RefCell<Option<Option<Result<RelayOutcome, RelayError>>>>,
    logs: RefCell<String>,
}

impl RelayWorld {
    fn new() -> Self {
        Self {
            store: Arc::new(InMemoryDocumentStore::new()),
            gateway: Arc::new(RecordingPushGateway::new()),
            notification: RefCell::new(Document::default()),
            outcome: RefCell::new(None),
            logs: RefCell::new(String::new()),
        }
    }

    fn create_notification(&self) {
        let relay = NotificationRelay::new(self.store.clone(), self.gateway.clone());
        let pattern =
            DocumentPathPattern::parse(NOTIFICATIONS_TRIGGER_PATTERN).expect("valid pattern");
        let trigger = DocumentTrigger::new(pattern, Arc::new(relay));
        let document = self.notification.borrow().clone();
        let path = format!("notifications/{NOTIFICATION_ID}");

        let (outcome, logs) = capture_logs(|| {
            block_on(trigger.dispatch(&path, document, EventMetadata::default()))
        });
        *self.outcome.borrow_mut() = Some(outcome);
        *self.logs.borrow_mut() = logs;
    }

    fn with_result<F>(&self, f: F)
    where
        F: FnOnce(&Result<RelayOutcome, RelayError>),
    {
        let outcome = self.outcome.borrow();
        let result = outcome
            .as_ref()
            .expect("notification was created")
            .as_ref()
            .expect("path is bound to the relay");
        f(result);
    }

    fn log_lines_containing(&self, needle: &str) -> Vec<String> {
        self.logs
            .borrow()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_owned)
            .collect()
    }
}

#[fixture]
fn world() -> RelayWorld {
    RelayWorld::new()
}

#[given("user \"{user_id}\" has device token \"{token}\"")]
fn user_has_device_token(world: &RelayWorld, user_id: String, token: String) {
    world.store.insert(
        "users",
        &user_id,
        Document::from_strings([("fcmToken", token.as_str())]),
    );
}

#[given("user \"{user_id}\" has no device token")]
fn user_has_no_device_token(world: &RelayWorld, user_id: String) {
    world.store.insert(
        "users",
        &user_id,
        Document::from_strings([("displayName", "No Token")]),
    );
}

#[given("the push gateway rejects every message")]
fn the_push_gateway_rejects_every_message(world: &RelayWorld) {
    world.gateway.fail_with(PushGatewayError::unregistered(
        "status 404: UNREGISTERED",
    ));
}

#[given("a notification for user \"{user_id}\" titled \"{title}\" with message \"{message}\"")]
fn a_notification_for_user(world: &RelayWorld, user_id: String, title: String, message: String) {
    *world.notification.borrow_mut() = Document::from_strings([
        ("userId", user_id.as_str()),
        ("title", title.as_str()),
        ("message", message.as_str()),
        ("orderId", "o1"),
        ("status", "shipped"),
    ]);
}

#[given("a notification without a user id")]
fn a_notification_without_a_user_id(world: &RelayWorld) {
    *world.notification.borrow_mut() = Document::from_strings([("title", "orphan")]);
}

#[when("the notification document is created")]
fn the_notification_document_is_created(world: &RelayWorld) {
    world.create_notification();
}

#[then("exactly one push is sent to device \"{token}\"")]
fn exactly_one_push_is_sent(world: &RelayWorld, token: String) {
    let sends = world.gateway.sends();
    assert_eq!(sends.len(), 1, "expected one push, got {sends:?}");
    assert_eq!(sends[0].token, token);
}

#[then("the push has title \"{title}\" and body \"{body}\"")]
fn the_push_has_title_and_body(world: &RelayWorld, title: String, body: String) {
    let sends = world.gateway.sends();
    let notification = &sends[0].payload.notification;
    assert_eq!(notification.title, title);
    assert_eq!(notification.body, body);
}

#[then("the push sound is \"{sound}\"")]
fn the_push_sound_is(world: &RelayWorld, sound: String) {
    assert_eq!(world.gateway.sends()[0].payload.notification.sound, sound);
}

#[then("no push is sent")]
fn no_push_is_sent(world: &RelayWorld) {
    assert!(world.gateway.sends().is_empty());
}

#[then("the invocation succeeds")]
fn the_invocation_succeeds(world: &RelayWorld) {
    world.with_result(|result| {
        assert!(result.is_ok(), "expected success, got {result:?}");
    });
}

#[then("the invocation fails because the user id is missing")]
fn the_invocation_fails_because_the_user_id_is_missing(world: &RelayWorld) {
    world.with_result(|result| {
        assert!(matches!(result, Err(RelayError::MissingUserId { .. })));
    });
}

#[then("no user document is read")]
fn no_user_document_is_read(world: &RelayWorld) {
    assert_eq!(world.store.reads(), 0);
}

#[then("one info line naming user \"{user_id}\" is logged")]
fn one_info_line_naming_user_is_logged(world: &RelayWorld, user_id: String) {
    let lines = world.log_lines_containing("no device token for user");
    assert_eq!(lines.len(), 1, "expected one skip line, got {lines:?}");
    assert!(lines[0].contains("INFO"));
    assert!(lines[0].contains(&user_id));
}

#[then("one error line describing the failure is logged")]
fn one_error_line_describing_the_failure_is_logged(world: &RelayWorld) {
    let lines = world.log_lines_containing("ERROR");
    assert_eq!(lines.len(), 1, "expected one error line, got {lines:?}");
    assert!(lines[0].contains("failed to send notification"));
    assert!(lines[0].contains("UNREGISTERED"));
}

#[scenario(
    path = "tests/features/notification_relay.feature",
    name = "A notification is delivered to a user with a device token"
)]
fn a_notification_is_delivered_to_a_user_with_a_device_token(world: RelayWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/notification_relay.feature",
    name = "A notification for a user without a device token is skipped"
)]
fn a_notification_for_a_user_without_a_device_token_is_skipped(world: RelayWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/notification_relay.feature",
    name = "A rejected push does not fail the invocation"
)]
fn a_rejected_push_does_not_fail_the_invocation(world: RelayWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/notification_relay.feature",
    name = "A notification without a user id fails the invocation"
)]
fn a_notification_without_a_user_id_fails_the_invocation(world: RelayWorld) {
    drop(world);
}
