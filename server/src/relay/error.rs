//! Relay Error Types

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use super::telegram::TelegramError;
use super::types::RelayResponse;

/// Reasons a submission body is rejected before formatting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Body is not a JSON object.
    #[error("Invalid data format")]
    MalformedBody,

    /// `type` is absent or blank.
    #[error("Form type not specified")]
    MissingType,

    /// `type` names no known form.
    #[error("Unknown form type")]
    UnknownType(String),
}

/// Errors surfaced at the request boundary.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Method other than POST/OPTIONS.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Client submitted within the rate limit interval.
    #[error("Too many requests. Please wait.")]
    RateLimited { retry_after: u64 },

    /// Missing/unknown type or malformed body.
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    /// Rendered notification exceeds the messaging limit.
    #[error("Message too long")]
    MessageTooLong { length: usize },

    /// Messaging API failed or refused the message.
    #[error("Failed to deliver notification")]
    Delivery(#[from] TelegramError),

    /// Unexpected failure; detail is logged, not returned.
    #[error("Internal server error")]
    Internal(String),
}

impl RelayError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidInput(_) | Self::MessageTooLong { .. } => StatusCode::BAD_REQUEST,
            Self::Delivery(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!(detail = %detail, "Internal relay error");
        }

        let status = self.status();
        let retry_after = match &self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        };

        let mut response = (status, Json(RelayResponse::failure(self.to_string()))).into_response();
        if let Some(secs) = retry_after {
            if let Ok(v) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, v);
            }
        }
        response
    }
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            RelayError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            RelayError::RateLimited { retry_after: 5 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            RelayError::from(InputError::UnknownType("other".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::MessageTooLong { length: 4001 }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_hide_detail() {
        assert_eq!(
            RelayError::Internal("redis exploded".into()).to_string(),
            "Internal server error"
        );
        assert_eq!(
            RelayError::from(InputError::UnknownType("other".into())).to_string(),
            "Unknown form type"
        );
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = RelayError::RateLimited { retry_after: 4 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "4");
    }
}
