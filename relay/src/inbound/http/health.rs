//! Receiver probes.
//!
//! Readiness reports whether the listener is bound and the trigger wired;
//! the event router holds deliveries until then. Liveness only proves the
//! worker answers, so it never depends on downstream platform APIs.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, HttpResponseBuilder, get, http::header, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Probe response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ProbeStatus {
    /// The worker answers requests.
    Live,
    /// The receiver is accepting events.
    Ready,
    /// The receiver is still starting up.
    Starting,
}

/// Readiness flag flipped by the server bootstrap.
#[derive(Debug, Default)]
pub struct HealthState {
    accepting_events: AtomicBool,
}

impl HealthState {
    /// Start in the `starting` phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the listener is bound and events can be relayed.
    pub fn mark_ready(&self) {
        self.accepting_events.store(true, Ordering::Release);
    }

    /// Whether events can be relayed.
    pub fn is_ready(&self) -> bool {
        self.accepting_events.load(Ordering::Acquire)
    }
}

fn probe(mut response: HttpResponseBuilder, status: ProbeStatus) -> HttpResponse {
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(status)
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Receiver is accepting events", body = ProbeStatus),
        (status = 503, description = "Receiver is still starting", body = ProbeStatus)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    if state.is_ready() {
        probe(HttpResponse::Ok(), ProbeStatus::Ready)
    } else {
        probe(HttpResponse::ServiceUnavailable(), ProbeStatus::Starting)
    }
}

/// Liveness probe; always 200 while the worker answers.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses((status = 200, description = "Worker is answering", body = ProbeStatus))
)]
#[get("/health/live")]
pub async fn live() -> HttpResponse {
    probe(HttpResponse::Ok(), ProbeStatus::Live)
}
