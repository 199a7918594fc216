use std::fmt::{self, Display};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// An error answered with a status code and a `{"detail": ...}` body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiError {
    /// The path or body of the request is invalid.
    Validation(String),
    /// The requested agent cannot be constructed.
    NotFound(String),
    /// The agent failed while running.
    Internal(String),
}

impl ApiError {
    /// Returns the status code the error is answered with.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message sent to the client.
    pub fn detail(&self) -> &str {
        match self {
            ApiError::Validation(detail)
            | ApiError::NotFound(detail)
            | ApiError::Internal(detail) => detail,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status(), self.detail())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self.detail());
        } else {
            debug!("request rejected: {self}");
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
