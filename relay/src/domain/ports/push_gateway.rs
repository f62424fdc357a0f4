//! Driven port for delivering push notifications to a single device.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{DeviceToken, NotificationPayload};

define_port_error! {
    /// Errors surfaced by the push gateway.
    pub enum PushGatewayError {
        /// Network transport failed before a usable response arrived.
        Transport => "push gateway transport failed",
        /// The send exceeded its deadline.
        Timeout => "push gateway timeout",
        /// Credentials were missing, expired or lacked access.
        Unauthorized => "push gateway denied access",
        /// The device token is no longer registered.
        Unregistered => "device token is not registered",
        /// The gateway rejected the message contents.
        InvalidArgument => "push gateway rejected message",
        /// Sending quota for the project or device was exhausted.
        QuotaExceeded => "push gateway quota exceeded",
        /// The gateway is temporarily unavailable.
        Unavailable => "push gateway unavailable",
    }
}

/// Port for single-device push delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Send `payload` to the device addressed by `token`.
    ///
    /// Success means the gateway accepted the message; it says nothing about
    /// whether the device received it.
    async fn send_to_device(
        &self,
        token: &DeviceToken,
        payload: &NotificationPayload,
    ) -> Result<(), PushGatewayError>;
}

