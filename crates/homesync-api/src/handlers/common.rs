//! Shared handler plumbing: the result alias and the error-to-response
//! mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use homesync_devices::GatewayError;

/// Result type for handlers.
pub type HandlerResult<T = Value> = std::result::Result<Json<T>, ApiError>;

/// Success helper.
pub fn ok<T>(data: T) -> HandlerResult<T> {
    Ok(Json(data))
}

/// An error response with a status code and a JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    /// Error with a custom body, used for the sentinel not-found responses
    /// the dashboard expects.
    pub fn with_body(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        let status = match &e {
            GatewayError::DeviceNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::InvalidAction(_)
            | GatewayError::InvalidMode(_)
            | GatewayError::MissingField(_) => StatusCode::BAD_REQUEST,
            GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, e.to_string())
    }
}

impl From<homesync_storage::Error> for ApiError {
    fn from(e: homesync_storage::Error) -> Self {
        let status = match &e {
            homesync_storage::Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, e.to_string())
    }
}
