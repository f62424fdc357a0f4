//! Correlation id carried by one relay invocation.
//!
//! The HTTP receiver puts a `TraceId` in task-local storage before running the
//! trigger; the relay span reads it back, so adapters never see it. Spawned
//! tasks do not inherit the value: wrap them in [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Header used to receive and echo the trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// UUID-backed identifier shared by every log line of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Mint a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Accept an identifier supplied by a caller, ignoring blank or non-UUID
    /// values.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::domain::TraceId;
    ///
    /// assert!(TraceId::from_header(" 6f1c2d3e-4b5a-4c6d-8e7f-0123456789ab ").is_some());
    /// assert!(TraceId::from_header("retry-7").is_none());
    /// ```
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    /// Identifier of the enclosing invocation, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current identifier.
    ///
    /// # Examples
    /// ```
    /// use notification_relay::domain::TraceId;
    ///
    /// # futures::executor::block_on(async {
    /// let trace_id = TraceId::generate();
    /// assert_eq!(TraceId::scope(trace_id, async { TraceId::current() }).await, Some(trace_id));
    /// # });
    /// ```
    pub async fn scope<F: Future>(trace_id: Self, fut: F) -> F::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
