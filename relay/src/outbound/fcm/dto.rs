//! FCM HTTP v1 request and error DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::NotificationPayload;

/// Body of `POST /v1/projects/{project}/messages:send`.
#[derive(Debug, Serialize)]
pub(super) struct SendRequestDto<'a> {
    pub(super) message: MessageDto<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct MessageDto<'a> {
    token: &'a str,
    notification: NotificationDto<'a>,
    data: DataDto<'a>,
    android: AndroidConfigDto<'a>,
    apns: ApnsConfigDto<'a>,
}

#[derive(Debug, Serialize)]
struct NotificationDto<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataDto<'a> {
    order_id: &'a str,
    status: &'a str,
}

#[derive(Debug, Serialize)]
struct AndroidConfigDto<'a> {
    notification: AndroidNotificationDto<'a>,
}

#[derive(Debug, Serialize)]
struct AndroidNotificationDto<'a> {
    sound: &'a str,
}

#[derive(Debug, Serialize)]
struct ApnsConfigDto<'a> {
    payload: ApnsPayloadDto<'a>,
}

#[derive(Debug, Serialize)]
struct ApnsPayloadDto<'a> {
    aps: ApsDto<'a>,
}

#[derive(Debug, Serialize)]
struct ApsDto<'a> {
    sound: &'a str,
}

impl<'a> SendRequestDto<'a> {
    /// Map a domain payload onto the v1 message shape. The v1 notification
    /// block has no sound, so it is routed to the Android and APNs blocks.
    pub(super) fn new(token: &'a str, payload: &'a NotificationPayload) -> Self {
        let sound = payload.notification.sound.as_str();
        Self {
            message: MessageDto {
                token,
                notification: NotificationDto {
                    title: &payload.notification.title,
                    body: &payload.notification.body,
                },
                data: DataDto {
                    order_id: &payload.data.order_id,
                    status: &payload.data.status,
                },
                android: AndroidConfigDto {
                    notification: AndroidNotificationDto { sound },
                },
                apns: ApnsConfigDto {
                    payload: ApnsPayloadDto {
                        aps: ApsDto { sound },
                    },
                },
            },
        }
    }
}

/// Google API error envelope.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponseDto {
    error: ErrorStatusDto,
}

#[derive(Debug, Deserialize)]
struct ErrorStatusDto {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetailDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetailDto {
    #[serde(default)]
    error_code: Option<String>,
}

impl ErrorResponseDto {
    /// FCM-specific error code, falling back to the canonical status.
    pub(super) fn error_code(&self) -> Option<&str> {
        self.error
            .details
            .iter()
            .find_map(|detail| detail.error_code.as_deref())
            .or(self.error.status.as_deref())
    }
}
