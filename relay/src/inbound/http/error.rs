//! HTTP mapping for relay failures.
//!
//! The event router treats any non-2xx response as a failed delivery, so the
//! status code is what reports an invocation as failed. Bodies carry a stable
//! machine-readable code for operators.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{RelayError, TRACE_ID_HEADER, TraceId};

/// JSON error body returned by the event receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Stable error code, e.g. `missing_user_id`.
    #[schema(example = "missing_user_id")]
    pub code: String,
    /// Human-readable description.
    #[schema(example = "notification n1 has no userId")]
    pub message: String,
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidEvent { .. } => StatusCode::BAD_REQUEST,
            RelayError::MissingUserId { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RelayError::UserLookup { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, code = self.code(), "event handling failed");
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = TraceId::current() {
            builder.insert_header((TRACE_ID_HEADER, id.to_string()));
        }
        builder.json(ErrorBody {
            code: self.code().to_owned(),
            message: self.to_string(),
        })
    }
}
