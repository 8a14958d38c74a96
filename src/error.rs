//! Error taxonomy shared by the store, the auth layer, and the HTTP surface.
//!
//! Every failure a request can produce maps to one variant; the variant
//! decides the HTTP status and the machine-readable `errorCode` in the
//! response envelope. Display strings are the client-facing messages.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required input was absent. Carries the endpoint's field list.
    #[error("Missing required fields: {0}")]
    MissingFields(&'static str),

    #[error("Title must be between 1 and 500 characters")]
    InvalidTitle,

    /// Shape failure ("Date must be in YYYY-MM-DD format") or a date that
    /// does not exist on the calendar ("Invalid date").
    #[error("{0}")]
    InvalidDate(&'static str),

    #[error("Start date must be before or equal to end date")]
    InvalidDateRange,

    #[error("Priority must be between 1 and 999999")]
    InvalidPriority,

    #[error("Invalid status parameter. Allowed values: active, completed, deleted")]
    InvalidFilter,

    #[error("Invalid email format")]
    InvalidEmail,

    /// Carries the specific rule the password failed.
    #[error("{0}")]
    InvalidPassword(&'static str),

    #[error("Name must be between 2 and 50 characters")]
    InvalidName,

    #[error("Email already exists")]
    EmailExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format. Expected: Bearer <token>")]
    InvalidAuthFormat,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Todo not found")]
    NotFound,

    #[error("You do not have permission to access this resource")]
    Forbidden,

    /// A state-transition precondition failed; carries the exact message
    /// (e.g. "Cannot modify a deleted todo").
    #[error("{0}")]
    BadRequest(&'static str),

    /// Unexpected storage or runtime failure. The cause is logged at the
    /// boundary but never serialized to the client.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFields(_)
            | Self::InvalidTitle
            | Self::InvalidDate(_)
            | Self::InvalidDateRange
            | Self::InvalidPriority
            | Self::InvalidFilter
            | Self::InvalidEmail
            | Self::InvalidPassword(_)
            | Self::InvalidName
            | Self::EmailExists
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials
            | Self::MissingAuthHeader
            | Self::InvalidAuthFormat
            | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "MISSING_FIELDS",
            Self::InvalidTitle => "INVALID_TITLE",
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::InvalidPriority => "INVALID_PRIORITY",
            Self::InvalidFilter => "INVALID_STATUS",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidPassword(_) => "INVALID_PASSWORD",
            Self::InvalidName => "INVALID_NAME",
            Self::EmailExists => "EMAIL_ALREADY_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingAuthHeader => "MISSING_AUTH_HEADER",
            Self::InvalidAuthFormat => "INVALID_AUTH_FORMAT",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            tracing::error!(error = %cause, "internal error");
        }
        (
            self.status_code(),
            Json(serde_json::json!({
                "status": "error",
                "message": self.to_string(),
                "errorCode": self.error_code(),
            })),
        )
            .into_response()
    }
}
