use serde_json::Value;
use std::fmt;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Returned when the Drive or Sheets API answers with a non-2xx status.
///
/// The error body is kept so that callers can render a short user-facing
/// message without re-fetching anything. Use `anyhow`'s `downcast_ref` to
/// recover this type from an error chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("remote API call failed with status {status}: {context}")]
pub struct RemoteApiError {
    status: u16,
    context: ErrorContext,
}

impl RemoteApiError {
    /// Builds the error from a response status and body. A body that parses
    /// as JSON is kept structured, anything else is kept as raw text.
    pub(crate) fn from_response(status: u16, body: String) -> Self {
        let context = match serde_json::from_str::<Value>(&body) {
            Ok(json) if body.trim_start().starts_with('{') => ErrorContext::Json(json),
            _ => ErrorContext::Text(body),
        };
        Self { status, context }
    }

    /// The HTTP status code reported by the provider.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The parsed (or raw) error body.
    pub fn context(&self) -> &ErrorContext {
        &self.context
    }
}

/// The error body of a failed remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    /// The provider returned a JSON error document.
    Json(Value),
    /// The provider returned something that is not JSON.
    Text(String),
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorContext::Json(value) => write!(f, "{value}"),
            ErrorContext::Text(text) => write!(f, "{text}"),
        }
    }
}
