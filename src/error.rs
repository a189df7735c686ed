use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures that abort a webhook invocation.
///
/// Per-recipient delivery failures are not represented here; they are
/// recorded in the invocation's `NotificationOutcome` set and never fail
/// the request.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("{0}")]
    Validation(String),

    #[error("token exchange failed: {0}")]
    Token(String),
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::Validation(_) => StatusCode::BAD_REQUEST,
            DispatchError::Lookup(_) | DispatchError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// A single push send that the gateway rejected or that never reached it.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);
