//! OpenAPI documentation for the event receiver.
//!
//! Registers the CloudEvent endpoint, the health probes, the error body and
//! the probe status schemas. Exported via `cargo run --bin openapi-dump` for
//! platform tooling.

use utoipa::OpenApi;

use crate::inbound::http::ErrorBody;
use crate::inbound::http::health::ProbeStatus;

/// OpenAPI document for the receiver.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notification relay",
        description = "Receives document-created CloudEvents and relays them as push notifications."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::events::receive_event,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorBody, ProbeStatus)),
    tags(
        (name = "events", description = "CloudEvent delivery"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
