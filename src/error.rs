// Error types for the backend clients and their mapping onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{admin_api::ValidationError, filters::FilterError};

/// Failure talking to the dealership backend or the prediction service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Backend { status: StatusCode, message: String },
    #[error("malformed response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid endpoint url: {0}")]
    Url(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ClientError {
    /// Text suitable for showing to a visitor: the backend's own message when there is one.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Backend { message, .. } => message.clone(),
            ClientError::Transport(_) => "The inventory service is unreachable right now.".to_string(),
            other => other.to_string(),
        }
    }
}

// Define a custom application error type
#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    // Backend answered with an error; its message is passed through
    Upstream { status: StatusCode, message: String },
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::InternalServerError(error)
    }
}

impl From<ClientError> for AppError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Backend { status, message } if status == StatusCode::NOT_FOUND => {
                AppError::NotFound(message)
            }
            ClientError::Backend { status, message } if status == StatusCode::UNAUTHORIZED => {
                AppError::Unauthorized(message)
            }
            ClientError::Backend { status, message } => AppError::Upstream { status, message },
            ClientError::Validation(e) => AppError::BadRequest(e.to_string()),
            other => AppError::InternalServerError(other.into()),
        }
    }
}

impl From<FilterError> for AppError {
    fn from(error: FilterError) -> Self {
        AppError::BadRequest(error.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        AppError::BadRequest(error.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                // Don't expose internal details to the client
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Unauthorized(message) => {
                tracing::warn!("Unauthorized access attempt: {}", message);
                (StatusCode::UNAUTHORIZED, message)
            }
            AppError::BadRequest(message) => {
                tracing::debug!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { status, message } => {
                tracing::warn!(%status, "Backend error: {}", message);
                (StatusCode::BAD_GATEWAY, message)
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
