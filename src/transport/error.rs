use crate::oauth::OAuthError;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::fmt;

/// Classifies a non-2xx response. Swappable per client so providers with
/// unusual error bodies can plug in their own interpretation.
pub type ErrorHandler = fn(StatusCode, &HeaderMap, &[u8]) -> HttpError;

/// Request-time transport errors
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// 401: token expired, revoked or malformed
    AccessTokenInvalid(String),
    /// 403
    Forbidden(String),
    /// 404
    NotFound(String),
    /// 429, with the server's Retry-After in seconds when given
    RateLimited {
        retry_after: Option<u64>,
        message: String,
    },
    /// Any other 4xx
    Caller { status: u16, message: String },
    /// 5xx
    Server { status: u16, message: String },
    /// Request could not be built or sent
    Request(String),
    /// Response body was not the expected JSON
    Decode(String),
    /// Credentials could not be obtained for the request
    Auth(OAuthError),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::AccessTokenInvalid(msg) => {
                write!(f, "access token invalid or expired: {}", msg)
            }
            HttpError::Forbidden(msg) => write!(f, "forbidden: {}", msg),
            HttpError::NotFound(msg) => write!(f, "not found: {}", msg),
            HttpError::RateLimited {
                retry_after,
                message,
            } => match retry_after {
                Some(secs) => write!(f, "rate limited (retry after {}s): {}", secs, message),
                None => write!(f, "rate limited: {}", message),
            },
            HttpError::Caller { status, message } => {
                write!(f, "request rejected with status {}: {}", status, message)
            }
            HttpError::Server { status, message } => {
                write!(f, "server error {}: {}", status, message)
            }
            HttpError::Request(msg) => write!(f, "request failed: {}", msg),
            HttpError::Decode(msg) => write!(f, "failed to decode response: {}", msg),
            HttpError::Auth(err) => write!(f, "authentication failed: {}", err),
        }
    }
}

impl std::error::Error for HttpError {}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        HttpError::Request(err.to_string())
    }
}

impl From<OAuthError> for HttpError {
    fn from(err: OAuthError) -> Self {
        HttpError::Auth(err)
    }
}

/// Default error interpreter.
///
/// The message is taken from a JSON `message`, `error_description` or
/// `error` field when the body has one, otherwise from the raw body, and
/// finally from the status reason.
pub fn interpret_error(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> HttpError {
    let message = error_message(status, body);

    match status {
        StatusCode::UNAUTHORIZED => HttpError::AccessTokenInvalid(message),
        StatusCode::FORBIDDEN => HttpError::Forbidden(message),
        StatusCode::NOT_FOUND => HttpError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            HttpError::RateLimited {
                retry_after,
                message,
            }
        }
        s if s.is_server_error() => HttpError::Server {
            status: s.as_u16(),
            message,
        },
        s => HttpError::Caller {
            status: s.as_u16(),
            message,
        },
    }
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        for field in ["message", "error_description", "error"] {
            if let Some(msg) = json.get(field).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}
