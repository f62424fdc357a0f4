//! Reqwest-backed FCM push gateway.
//!
//! This adapter owns transport details only: message serialisation, HTTP and
//! FCM error-code mapping, and timeout handling.

use async_trait::async_trait;
use reqwest::StatusCode;

use super::dto::{ErrorResponseDto, SendRequestDto};
use crate::domain::ports::{PushGateway, PushGatewayError};
use crate::domain::{DeviceToken, NotificationPayload};
use crate::outbound::platform::{PlatformClient, status_message};

/// Push gateway sending single-device messages through the FCM HTTP v1 API.
#[derive(Debug, Clone)]
pub struct FcmPushGateway {
    platform: PlatformClient,
}

impl FcmPushGateway {
    /// Build an adapter over the shared platform client.
    pub fn new(platform: PlatformClient) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl PushGateway for FcmPushGateway {
    async fn send_to_device(
        &self,
        token: &DeviceToken,
        payload: &NotificationPayload,
    ) -> Result<(), PushGatewayError> {
        let url = self
            .platform
            .fcm_url(["v1", "projects", self.platform.project_id(), "messages:send"])
            .ok_or_else(|| PushGatewayError::transport("FCM endpoint is not a base URL"))?;
        let response = self
            .platform
            .post(url)
            .json(&SendRequestDto::new(token.as_str(), payload))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(map_transport_error)?;
        Err(map_status_error(status, body.as_ref()))
    }
}

fn map_transport_error(error: reqwest::Error) -> PushGatewayError {
    if error.is_timeout() {
        PushGatewayError::timeout(error.to_string())
    } else {
        PushGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PushGatewayError {
    let message = status_message(status, body);
    let parsed = serde_json::from_slice::<ErrorResponseDto>(body).ok();

    if let Some(mapped) = parsed
        .as_ref()
        .and_then(ErrorResponseDto::error_code)
        .and_then(|code| map_error_code(code, &message))
    {
        return mapped;
    }

    match status {
        StatusCode::NOT_FOUND => PushGatewayError::unregistered(message),
        StatusCode::BAD_REQUEST => PushGatewayError::invalid_argument(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PushGatewayError::unauthorized(message)
        }
        StatusCode::TOO_MANY_REQUESTS => PushGatewayError::quota_exceeded(message),
        StatusCode::SERVICE_UNAVAILABLE => PushGatewayError::unavailable(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            PushGatewayError::timeout(message)
        }
        _ => PushGatewayError::transport(message),
    }
}

fn map_error_code(code: &str, message: &str) -> Option<PushGatewayError> {
    let error = match code {
        "UNREGISTERED" => PushGatewayError::unregistered(message),
        "INVALID_ARGUMENT" => PushGatewayError::invalid_argument(message),
        "QUOTA_EXCEEDED" | "RESOURCE_EXHAUSTED" => PushGatewayError::quota_exceeded(message),
        "UNAVAILABLE" => PushGatewayError::unavailable(message),
        "THIRD_PARTY_AUTH_ERROR" | "SENDER_ID_MISMATCH" | "UNAUTHENTICATED"
        | "PERMISSION_DENIED" => PushGatewayError::unauthorized(message),
        _ => return None,
    };
    Some(error)
}

#[cfg(test)]
mod tests {
    //! Adapter coverage against a local mock FCM endpoint.

    use std::time::Duration;

    use mockito::{Matcher, Server, ServerGuard};
    use rstest::rstest;
    use serde_json::json;
    use url::Url;
    use zeroize::Zeroizing;

    use super::*;
    use crate::domain::{Document, NotificationRecord};
    use crate::outbound::platform::PlatformConfig;

    const SEND_PATH: &str = "/v1/projects/demo/messages:send";

    fn gateway_for(server: &ServerGuard) -> FcmPushGateway {
        let mut config = PlatformConfig::for_project("demo").expect("defaults parse");
        config.fcm_endpoint = Url::parse(&server.url()).expect("mock url parses");
        config.access_token = Some(Zeroizing::new("ya29.test".to_owned()));
        config.request_timeout = Some(Duration::from_secs(5));
        FcmPushGateway::new(PlatformClient::new(config).expect("client builds"))
    }

    fn payload() -> NotificationPayload {
        NotificationRecord::from_document(&Document::from_strings([
            ("userId", "u1"),
            ("title", "Hi"),
            ("message", "Your order shipped"),
            ("orderId", "o1"),
            ("status", "shipped"),
        ]))
        .to_payload()
    }

    fn token() -> DeviceToken {
        DeviceToken::new("tok1").expect("non-empty token")
    }

    fn fcm_error(code: u16, status: &str, error_code: Option<&str>) -> String {
        let details = error_code
            .map(|error_code| {
                vec![json!({
                    "@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError",
                    "errorCode": error_code,
                })]
            })
            .unwrap_or_default();
        json!({
            "error": {
                "code": code,
                "message": "Requested entity was not found.",
                "status": status,
                "details": details,
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn posts_the_v1_message_shape() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", SEND_PATH)
            .match_header("authorization", "Bearer ya29.test")
            .match_body(Matcher::Json(json!({
                "message": {
                    "token": "tok1",
                    "notification": { "title": "Hi", "body": "Your order shipped" },
                    "data": { "orderId": "o1", "status": "shipped" },
                    "android": { "notification": { "sound": "default" } },
                    "apns": { "payload": { "aps": { "sound": "default" } } }
                }
            })))
            .with_status(200)
            .with_body(r#"{"name":"projects/demo/messages/0:1"}"#)
            .create_async()
            .await;

        gateway_for(&server)
            .send_to_device(&token(), &payload())
            .await
            .expect("send succeeds");

        mock.assert_async().await;
    }

    #[rstest]
    #[case::unregistered(404, "NOT_FOUND", Some("UNREGISTERED"), "Unregistered")]
    #[case::bare_not_found(404, "NOT_FOUND", None, "Unregistered")]
    #[case::invalid_argument(400, "INVALID_ARGUMENT", Some("INVALID_ARGUMENT"), "InvalidArgument")]
    #[case::unauthenticated(401, "UNAUTHENTICATED", None, "Unauthorized")]
    #[case::sender_mismatch(403, "PERMISSION_DENIED", Some("SENDER_ID_MISMATCH"), "Unauthorized")]
    #[case::quota(429, "RESOURCE_EXHAUSTED", Some("QUOTA_EXCEEDED"), "QuotaExceeded")]
    #[case::unavailable(503, "UNAVAILABLE", Some("UNAVAILABLE"), "Unavailable")]
    #[case::internal(500, "INTERNAL", Some("INTERNAL"), "Transport")]
    #[tokio::test]
    async fn maps_fcm_errors(
        #[case] code: u16,
        #[case] status: &str,
        #[case] error_code: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", SEND_PATH)
            .with_status(usize::from(code))
            .with_body(fcm_error(code, status, error_code))
            .create_async()
            .await;

        let error = gateway_for(&server)
            .send_to_device(&token(), &payload())
            .await
            .expect_err("send must fail");

        let actual = match &error {
            PushGatewayError::Transport { .. } => "Transport",
            PushGatewayError::Timeout { .. } => "Timeout",
            PushGatewayError::Unauthorized { .. } => "Unauthorized",
            PushGatewayError::Unregistered { .. } => "Unregistered",
            PushGatewayError::InvalidArgument { .. } => "InvalidArgument",
            PushGatewayError::QuotaExceeded { .. } => "QuotaExceeded",
            PushGatewayError::Unavailable { .. } => "Unavailable",
        };
        assert_eq!(actual, expected, "unexpected mapping: {error}");
        assert!(
            error.to_string().contains(&format!("status {code}")),
            "message should carry the status: {error}"
        );
    }

    #[test]
    fn error_code_wins_over_http_status() {
        let body = fcm_error(400, "INVALID_ARGUMENT", Some("UNREGISTERED"));
        let error = map_status_error(StatusCode::BAD_REQUEST, body.as_bytes());
        assert!(matches!(error, PushGatewayError::Unregistered { .. }));
    }

    #[test]
    fn non_json_bodies_fall_back_to_status() {
        let error = map_status_error(StatusCode::GATEWAY_TIMEOUT, b"<html>upstream timeout</html>");
        assert_eq!(
            error,
            PushGatewayError::timeout("status 504: <html>upstream timeout</html>")
        );
    }
}
