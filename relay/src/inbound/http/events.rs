//! CloudEvent receiver for document-created events.
//!
//! ```text
//! POST /
//! ce-id: 4f6c...
//! ce-type: google.cloud.firestore.document.v1.created
//! ce-source: //firestore.googleapis.com/projects/p/databases/(default)
//! ce-subject: documents/notifications/n1
//!
//! {"value": {"name": ".../documents/notifications/n1", "fields": {...}}}
//! ```
//!
//! Events the relay does not handle (other types, unbound paths) are
//! acknowledged with 204 so the router does not retry them.

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, post, web};
use tracing::{debug, warn};

use crate::domain::RelayError;
use crate::domain::ports::EventMetadata;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::state::HttpState;
use crate::wire::cloudevent::{
    BATCH_CONTENT_TYPE, BINARY_HEADER_PREFIX, CloudEventContext, STRUCTURED_CONTENT_TYPE,
    StructuredEventDto, is_json_media_type,
};
use crate::wire::firestore::DocumentEventDto;

enum EventData {
    Body(web::Bytes),
    Json(Option<serde_json::Value>),
}

/// Receive one document event and run the bound trigger.
#[utoipa::path(
    post,
    path = "/",
    tags = ["events"],
    params(
        ("ce-id" = Option<String>, Header, description = "Event id (binary mode)"),
        ("ce-type" = Option<String>, Header, description = "Event type (binary mode)"),
        ("ce-source" = Option<String>, Header, description = "Event source (binary mode)"),
        ("ce-subject" = Option<String>, Header, description = "Document subject (binary mode)")
    ),
    request_body(
        content = serde_json::Value,
        description = "Document event data, or a structured-mode CloudEvent",
        content_type = "application/json"
    ),
    responses(
        (status = 204, description = "Event handled, or acknowledged without handling"),
        (status = 400, description = "Malformed event", body = ErrorBody),
        (status = 422, description = "Notification has no userId", body = ErrorBody),
        (status = 500, description = "User lookup failed", body = ErrorBody)
    )
)]
#[post("/")]
pub async fn receive_event(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, RelayError> {
    let (context, data) = read_event(&request, body)?;
    if !context.is_document_created() {
        warn!(
            event_type = %context.event_type,
            event_id = %context.id,
            "ignoring unsupported event type"
        );
        return Ok(HttpResponse::NoContent().finish());
    }

    let event = decode_data(data)?;
    let value = event
        .value
        .ok_or_else(|| RelayError::invalid_event("event carries no created document"))?;
    let path = value
        .document_path()
        .or_else(|| context.subject_document_path())
        .map(str::to_owned)
        .ok_or_else(|| RelayError::invalid_event("event does not name a document"))?;
    let document = value
        .to_document()
        .map_err(|error| RelayError::invalid_event(error.to_string()))?;
    let metadata = EventMetadata {
        event_id: Some(context.id.clone()),
        create_time: value
            .create_time()
            .map_err(|error| RelayError::invalid_event(error.to_string()))?,
    };

    match state.trigger.dispatch(&path, document, metadata).await {
        None => {
            warn!(
                path = %path,
                pattern = state.trigger.pattern().as_str(),
                event_id = %context.id,
                "no trigger bound to document path; event acknowledged"
            );
            Ok(HttpResponse::NoContent().finish())
        }
        Some(Ok(outcome)) => {
            debug!(outcome = outcome.label(), event_id = %context.id, "event handled");
            Ok(HttpResponse::NoContent().finish())
        }
        Some(Err(error)) => Err(error),
    }
}

fn read_event(
    request: &HttpRequest,
    body: web::Bytes,
) -> Result<(CloudEventContext, EventData), RelayError> {
    let content_type = header(request, CONTENT_TYPE.as_str());
    match content_type.as_deref() {
        Some(media) if media.starts_with(BATCH_CONTENT_TYPE) => Err(RelayError::invalid_event(
            "batched CloudEvents are not supported",
        )),
        Some(media) if media.starts_with(STRUCTURED_CONTENT_TYPE) => {
            let envelope: StructuredEventDto = serde_json::from_slice(&body).map_err(|error| {
                RelayError::invalid_event(format!("malformed structured CloudEvent: {error}"))
            })?;
            ensure_json(envelope.datacontenttype.as_deref())?;
            Ok((envelope.context, EventData::Json(envelope.data)))
        }
        media => {
            ensure_json(media)?;
            let context = CloudEventContext {
                id: required_attribute(request, "id")?,
                event_type: required_attribute(request, "type")?,
                source: required_attribute(request, "source")?,
                subject: attribute(request, "subject"),
                time: attribute(request, "time"),
            };
            Ok((context, EventData::Body(body)))
        }
    }
}

fn decode_data(data: EventData) -> Result<DocumentEventDto, RelayError> {
    let decoded = match data {
        EventData::Body(body) => DocumentEventDto::from_slice(&body),
        EventData::Json(Some(value)) => DocumentEventDto::from_value(value),
        EventData::Json(None) => return Err(RelayError::invalid_event("event carries no data")),
    };
    decoded.map_err(|error| RelayError::invalid_event(error.to_string()))
}

fn ensure_json(media_type: Option<&str>) -> Result<(), RelayError> {
    match media_type {
        Some(media) if !is_json_media_type(media) => Err(RelayError::invalid_event(format!(
            "unsupported event data content type `{media}`"
        ))),
        _ => Ok(()),
    }
}

fn header(request: &HttpRequest, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

fn attribute(request: &HttpRequest, name: &str) -> Option<String> {
    header(request, &format!("{BINARY_HEADER_PREFIX}{name}"))
}

fn required_attribute(request: &HttpRequest, name: &str) -> Result<String, RelayError> {
    attribute(request, name).ok_or_else(|| {
        RelayError::invalid_event(format!(
            "missing CloudEvent header `{BINARY_HEADER_PREFIX}{name}`"
        ))
    })
}
