//! Shared HTTP handle for the Firestore and FCM REST APIs.
//!
//! One [`PlatformClient`] is built per process and cloned into both outbound
//! adapters. It owns the connection pool, the project identity and the
//! optional bearer token; the adapters own request shapes and error mapping.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use url::Url;
use zeroize::Zeroizing;

/// Default Firestore REST endpoint.
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com";
/// Default FCM REST endpoint.
pub const DEFAULT_FCM_ENDPOINT: &str = "https://fcm.googleapis.com";
/// Default Firestore database identifier.
pub const DEFAULT_DATABASE_ID: &str = "(default)";

const USER_AGENT: &str = concat!("notification-relay/", env!("CARGO_PKG_VERSION"));

/// Errors raised while building the platform client.
#[derive(Debug, thiserror::Error)]
pub enum PlatformClientError {
    /// The endpoint cannot carry path segments (e.g. `mailto:`).
    #[error("endpoint `{endpoint}` is not a valid base URL")]
    InvalidEndpoint {
        /// Offending endpoint.
        endpoint: String,
    },
    /// The project identifier is blank.
    #[error("project id must not be blank")]
    BlankProjectId,
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Connection settings shared by both adapters.
pub struct PlatformConfig {
    /// Cloud project owning the database and the messaging sender.
    pub project_id: String,
    /// Bearer token attached to every request, when present.
    pub access_token: Option<Zeroizing<String>>,
    /// Firestore REST base URL.
    pub firestore_endpoint: Url,
    /// FCM REST base URL.
    pub fcm_endpoint: Url,
    /// Firestore database identifier.
    pub database_id: String,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
}

impl PlatformConfig {
    /// Settings for `project_id` against the public endpoints, without a token.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformClientError::InvalidEndpoint`] if a default endpoint
    /// fails to parse, which only happens if the constants are edited.
    pub fn for_project(project_id: impl Into<String>) -> Result<Self, PlatformClientError> {
        Ok(Self {
            project_id: project_id.into(),
            access_token: None,
            firestore_endpoint: parse_endpoint(DEFAULT_FIRESTORE_ENDPOINT)?,
            fcm_endpoint: parse_endpoint(DEFAULT_FCM_ENDPOINT)?,
            database_id: DEFAULT_DATABASE_ID.to_owned(),
            request_timeout: None,
        })
    }
}

impl fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("project_id", &self.project_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("firestore_endpoint", &self.firestore_endpoint.as_str())
            .field("fcm_endpoint", &self.fcm_endpoint.as_str())
            .field("database_id", &self.database_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Parse an endpoint URL and check it can carry path segments.
///
/// # Errors
///
/// Returns [`PlatformClientError::InvalidEndpoint`] for unparsable or
/// non-base URLs.
pub fn parse_endpoint(raw: &str) -> Result<Url, PlatformClientError> {
    Url::parse(raw)
        .ok()
        .filter(|url| !url.cannot_be_a_base())
        .ok_or_else(|| PlatformClientError::InvalidEndpoint {
            endpoint: raw.to_owned(),
        })
}

/// Process-wide handle to the platform REST APIs.
#[derive(Clone, Debug)]
pub struct PlatformClient {
    http: Client,
    config: Arc<PlatformConfig>,
}

impl PlatformClient {
    /// Build the shared client.
    /// ```rust,ignore
    /// let platform = PlatformClient::new(PlatformConfig::for_project("demo")?)?;
    /// ```
    /// # Errors
    ///
    /// Returns an error when the project id is blank, an endpoint cannot be
    /// used as a base URL, or the reqwest client cannot be constructed.
    pub fn new(config: PlatformConfig) -> Result<Self, PlatformClientError> {
        if config.project_id.trim().is_empty() {
            return Err(PlatformClientError::BlankProjectId);
        }
        for endpoint in [&config.firestore_endpoint, &config.fcm_endpoint] {
            if endpoint.cannot_be_a_base() {
                return Err(PlatformClientError::InvalidEndpoint {
                    endpoint: endpoint.to_string(),
                });
            }
        }

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config: Arc::new(config),
        })
    }

    /// Cloud project identifier.
    pub fn project_id(&self) -> &str {
        &self.config.project_id
    }

    /// Firestore database identifier.
    pub fn database_id(&self) -> &str {
        &self.config.database_id
    }

    /// Resolve `segments` below the Firestore endpoint.
    pub(crate) fn firestore_url<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Option<Url> {
        join_segments(&self.config.firestore_endpoint, segments)
    }

    /// Resolve `segments` below the FCM endpoint.
    pub(crate) fn fcm_url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Option<Url> {
        join_segments(&self.config.fcm_endpoint, segments)
    }

    /// Start a GET request carrying the shared credentials.
    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.authorise(self.http.get(url))
    }

    /// Start a POST request carrying the shared credentials.
    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.authorise(self.http.post(url))
    }

    fn authorise(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(reqwest::header::ACCEPT, "application/json");
        match self.config.access_token.as_ref() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }
}

fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}

/// Format an HTTP failure as `status N` or `status N: <preview>`.
pub(crate) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    }
}

/// Whitespace-compacted prefix of a response body.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
