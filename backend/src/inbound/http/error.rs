//! HTTP mapping for domain errors.
//!
//! Keeps the domain transport agnostic by translating [`Error`] into Actix
//! responses here. The JSON envelope is the serialized domain error.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::domain::error::{Error, ErrorCode};

/// Domain error carried through an Actix handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError(Error);

impl ApiError {
    /// The wrapped domain error.
    #[must_use]
    pub fn inner(&self) -> &Error {
        &self.0
    }

    fn to_status_code(&self) -> StatusCode {
        match self.0.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Transport => StatusCode::BAD_GATEWAY,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.to_status_code()
    }

    fn error_response(&self) -> HttpResponse {
        // Internal failure text stays in the logs, not on the wire.
        if matches!(self.0.code(), ErrorCode::InternalError) {
            let redacted = Error::internal("Internal server error");
            return HttpResponse::build(self.status_code()).json(redacted);
        }
        HttpResponse::build(self.status_code()).json(&self.0)
    }
}

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;
