//! Structured errors returned by the YouTube Data API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The envelope the API wraps every failed response in.
///
/// See: <https://developers.google.com/youtube/v3/docs/errors>
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    reason: String,
}

/// The first structured error entry of a failed API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status code of the failed call.
    pub code: u16,
    /// Machine-readable reason, e.g. `quotaExceeded` or `authError`.
    pub reason: String,
    /// Human-readable explanation.
    pub message: String,
}

impl ApiError {
    /// Decodes the error body of a failed call with HTTP status `status`.
    ///
    /// Bodies that are not the standard envelope are kept verbatim as the message, and an
    /// envelope without detail entries falls back to its top-level message.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(ErrorResponse { error }) => match error.errors.into_iter().next() {
                Some(first) => Self {
                    code: error.code,
                    reason: first.reason,
                    message: first.message,
                },
                None => Self {
                    code: error.code,
                    reason: "unknown".to_string(),
                    message: error.message,
                },
            },
            Err(_) => Self {
                code: status,
                reason: "unknown".to_string(),
                message: body.to_string(),
            },
        }
    }

    /// The error reported when no usable access token can be obtained.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            code: 401,
            reason: "authError".to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.reason, self.message)
    }
}

impl std::error::Error for ApiError {}
