use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use courier_db::StoreError;
use courier_types::api::ErrorResponse;

use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("User does not exist")]
    UserNotFound,
    #[error("Wrong password")]
    InvalidCredentials,
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("ID in token doesn't match the acting user. Stop pretending to be someone else :(")]
    ActorMismatch,
}

/// Every failure a handler can return. All of them render as `{"error": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(ValidationError),
    /// Unknown message type or video source.
    #[error(transparent)]
    NotSupported(ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Username taken")]
    Conflict,
    #[error("Sender or recipient does not exist")]
    UnknownUser,
    #[error("{0}")]
    Unavailable(&'static str),
    #[error("storage failure: {0}")]
    Storage(StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Auth failures are 400, not 401/403; clients only distinguish 400 from 500.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::NotSupported(_)
            | Self::Auth(_)
            | Self::Conflict
            | Self::UnknownUser => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnsupportedType | ValidationError::UnsupportedSource => {
                Self::NotSupported(err)
            }
            other => Self::Validation(other),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists => Self::Conflict,
            StoreError::NotFound => Self::Auth(AuthError::UserNotFound),
            StoreError::UnknownUser => Self::UnknownUser,
            other => Self::Storage(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationError::MalformedRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(ValidationError::MalformedRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self);
        } else {
            warn!("request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.client_message(),
            }),
        )
            .into_response()
    }
}
