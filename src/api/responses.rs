// Response types for the web layer

use crate::chain::responder::Disposition;
use crate::core::errors::IdentityError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// API error type that converts domain errors to HTTP responses
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            request_id: None,
        }
    }

    pub fn with_request_id(status: StatusCode, message: String, request_id: String) -> Self {
        Self {
            status,
            message,
            request_id: Some(request_id),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: err.user_message(),
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            request_id: self.request_id,
        });
        (self.status, body).into_response()
    }
}

impl IntoResponse for Disposition {
    fn into_response(self) -> Response {
        match self {
            Disposition::Redirect(url) => Redirect::to(&url).into_response(),
            Disposition::Send(err) => ApiError::from(err).into_response(),
            Disposition::Error(err) => {
                // Pipeline error channel: logged in full, masked on the wire
                error!(error = %err, "identity resolution error");
                ApiError::from(err).into_response()
            }
        }
    }
}
