//! Handler errors and their HTTP representation.
//!
//! # Design
//! This is the only module that knows status codes. Service errors are
//! translated by an exhaustive match in `ApiError::from_service`, so a new
//! `TodoError` variant fails to compile here until it is given a mapping.
//! Unexpected failures are logged with the operation that produced them and
//! answered with a generic body; their detail never reaches the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use todo_core::TodoError;
use tracing::{error, warn};

use crate::body::BodyError;

/// JSON shape of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("todo not found")]
    NotFound,

    /// Input rejected by the service; the message is shown as-is.
    #[error("{0}")]
    Validation(String),

    /// `/todos/` with nothing after the prefix.
    #[error("invalid path")]
    InvalidPath,

    #[error("invalid id")]
    InvalidId,

    #[error("invalid query string")]
    InvalidQuery,

    #[error(transparent)]
    Body(#[from] BodyError),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("not found")]
    RouteNotFound,

    #[error("request timed out")]
    Timeout { operation: &'static str },

    #[error("internal server error")]
    Internal {
        operation: &'static str,
        detail: String,
    },
}

impl ApiError {
    /// Translate a service error raised while running `operation`.
    pub fn from_service(operation: &'static str, err: TodoError) -> Self {
        match err {
            TodoError::NotFound => ApiError::NotFound,
            TodoError::TitleRequired
            | TodoError::TitleTooLong
            | TodoError::DescriptionTooLong
            | TodoError::InvalidId => ApiError::Validation(err.to_string()),
            TodoError::Cancelled | TodoError::Storage(_) => ApiError::Internal {
                operation,
                detail: err.to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_)
            | ApiError::InvalidPath
            | ApiError::InvalidId
            | ApiError::InvalidQuery
            | ApiError::Body(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { operation, detail } => {
                error!(operation, error = %detail, "request failed unexpectedly");
            }
            ApiError::Timeout { operation } => {
                warn!(operation, "request deadline exceeded");
            }
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
