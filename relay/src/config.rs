//! Relay configuration loaded via OrthoConfig.
//!
//! Values come from `RELAY_*` environment variables, matching CLI flags and
//! configuration files. `json_logs` carries a loader default so an empty
//! environment still merges; every other field is optional and accessors apply
//! defaults and validation, failing with a typed error.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::outbound::platform::{
    DEFAULT_DATABASE_ID, DEFAULT_FCM_ENDPOINT, DEFAULT_FIRESTORE_ENDPOINT, PlatformConfig,
    parse_endpoint,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while validating relay settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// Sources could not be read or merged.
    #[error("failed to load relay settings: {message}")]
    Load {
        /// Loader detail.
        message: String,
    },
    /// No project identifier was configured.
    #[error("RELAY_PROJECT_ID must be set to a non-blank value")]
    MissingProjectId,
    /// An endpoint URL is malformed.
    #[error("{setting} `{value}` is not a valid base URL")]
    InvalidEndpoint {
        /// Setting name.
        setting: &'static str,
        /// Raw value.
        value: String,
    },
    /// The bind address is malformed.
    #[error("bind address `{value}` is not a valid socket address")]
    InvalidBindAddr {
        /// Raw value.
        value: String,
    },
}

/// Configuration values for the relay service and the dispatch CLI.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RELAY")]
pub struct RelaySettings {
    /// Cloud project owning the database and messaging sender.
    pub project_id: Option<String>,
    /// Bearer token for the platform APIs; requests are unauthenticated
    /// without one.
    pub access_token: Option<String>,
    /// Socket address for the event receiver.
    pub bind_addr: Option<String>,
    /// Firestore REST endpoint override.
    pub firestore_endpoint: Option<String>,
    /// FCM REST endpoint override.
    pub fcm_endpoint: Option<String>,
    /// Firestore database identifier override.
    pub database_id: Option<String>,
    /// Per-request timeout for platform calls, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Emit JSON log lines; plain text when disabled.
    #[ortho_config(default = true)]
    pub json_logs: bool,
}

impl fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySettings")
            .field("project_id", &self.project_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("bind_addr", &self.bind_addr)
            .field("firestore_endpoint", &self.firestore_endpoint)
            .field("fcm_endpoint", &self.fcm_endpoint)
            .field("database_id", &self.database_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl RelaySettings {
    /// Load settings from the environment, config files and `args`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] when a source cannot be parsed.
    pub fn load<I, T>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::load_from_iter(args).map_err(|error| SettingsError::Load {
            message: error.to_string(),
        })
    }

    /// Return the configured project id.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::MissingProjectId`] when unset or blank.
    pub fn project_id(&self) -> Result<&str, SettingsError> {
        self.project_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(SettingsError::MissingProjectId)
    }

    /// Return the configured bind address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value is not a
    /// socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::InvalidBindAddr {
            value: raw.to_owned(),
        })
    }

    /// Return the configured database id, falling back to `(default)`.
    pub fn database_id(&self) -> &str {
        self.database_id.as_deref().unwrap_or(DEFAULT_DATABASE_ID)
    }

    /// Return the per-request timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Build the platform client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the project id is missing or an endpoint is
    /// malformed.
    pub fn platform_config(&self) -> Result<PlatformConfig, SettingsError> {
        Ok(PlatformConfig {
            project_id: self.project_id()?.to_owned(),
            access_token: self
                .access_token
                .as_deref()
                .filter(|token| !token.is_empty())
                .map(|token| Zeroizing::new(token.to_owned())),
            firestore_endpoint: endpoint(
                "firestore_endpoint",
                self.firestore_endpoint.as_deref(),
                DEFAULT_FIRESTORE_ENDPOINT,
            )?,
            fcm_endpoint: endpoint(
                "fcm_endpoint",
                self.fcm_endpoint.as_deref(),
                DEFAULT_FCM_ENDPOINT,
            )?,
            database_id: self.database_id().to_owned(),
            request_timeout: self.request_timeout(),
        })
    }
}

fn endpoint(
    setting: &'static str,
    value: Option<&str>,
    default: &str,
) -> Result<url::Url, SettingsError> {
    let raw = value.unwrap_or(default);
    parse_endpoint(raw).map_err(|_| SettingsError::InvalidEndpoint {
        setting,
        value: raw.to_owned(),
    })
}
