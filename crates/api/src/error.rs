//! Errors returned by the backend client.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Longest backend message carried into an error.
const MAX_MESSAGE_CHARS: usize = 200;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be sent or the response body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL cannot address the endpoint.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// 401: missing, expired or rejected credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403: authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404 for `resource`. `message` is the backend's wording, or a generic
    /// phrase when it sent none.
    #[error("Not found: {resource}: {message}")]
    NotFound { resource: String, message: String },

    /// 429 from the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    /// Build the error for a non-success response.
    pub(crate) fn from_response(status: StatusCode, body: &str, resource: &str) -> Self {
        let message = extract_message(body);
        match status {
            StatusCode::UNAUTHORIZED => {
                Self::Unauthorized(message.unwrap_or_else(|| "Please sign in again".to_string()))
            }
            StatusCode::FORBIDDEN => {
                Self::Forbidden(message.unwrap_or_else(|| "Access denied".to_string()))
            }
            StatusCode::NOT_FOUND => Self::NotFound {
                resource: resource.to_string(),
                message: message.unwrap_or_else(|| "Not found".to_string()),
            },
            _ => Self::Status {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                }),
            },
        }
    }

    /// Message suitable for a toast.
    ///
    /// Backend-provided messages are shown verbatim (they are written for
    /// end users); transport and parse failures get a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            Self::Http(_) => "Could not reach the server".to_string(),
            Self::Parse(_) | Self::InvalidUrl(_) => "Unexpected response from the server".to_string(),
            Self::RateLimited(secs) => format!("Too many requests, try again in {secs}s"),
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound { message: msg, .. }
            | Self::Status { message: msg, .. } => msg.clone(),
        }
    }

    /// Whether the session token should be discarded.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the failure is on our side of the request (4xx other than
    /// auth), so the form that caused it should be shown again.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 400 && *status < 500)
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"message": "..."}`, `{"message": ["a", "b"]}` (validation
/// errors) and `{"error": "..."}`; falls back to the raw text.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let message = match serde_json::from_str::<Value>(body) {
        Ok(json) => match (json.get("message"), json.get("error")) {
            (Some(Value::String(s)), _) => s.clone(),
            (Some(Value::Array(items)), _) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            (_, Some(Value::String(s))) => s.clone(),
            _ => return None,
        },
        Err(_) => body.to_string(),
    };

    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    Some(message.chars().take(MAX_MESSAGE_CHARS).collect())
}
