use std::fmt::Display;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Error answered to the front end.
///
/// Only a fixed, human readable message leaves the server. The underlying
/// provider error is logged when the `ApiError` is built and never serialized.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
}

impl ApiError {
    /// A 500 carrying `message`, after logging `err` with its context.
    pub fn internal(message: &'static str, err: impl Display) -> Self {
        tracing::error!(error = %err, "{message}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Maps a failed call onto an [`ApiError`] with a fixed public message.
pub(crate) trait OrApiError<T> {
    fn or_api_error(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T, E: Display> OrApiError<T> for Result<T, E> {
    fn or_api_error(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::internal(message, err))
    }
}
