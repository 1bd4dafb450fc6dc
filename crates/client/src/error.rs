//! Errors from talking to the accounting API.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got an HTTP answer (DNS, refused, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// 401: the session token was missing or rejected. The session has
    /// already been cleared when this is returned.
    #[error("unauthorized")]
    Unauthorized,

    /// Any other non-2xx answer. `message` is the server's reason when the
    /// body carried one.
    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Api { status: u16, message: Option<String> },

    /// 2xx answer whose body did not match the expected shape.
    #[error("unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Setup(String),
}

impl ApiError {
    /// Text for an inline form message: the server's reason when there is
    /// one, `fallback` otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

/// Pull a human-readable reason out of an error body.
///
/// Understands `{"message": "..."}`, `{"message": ["...", "..."]}` and
/// `{"error": "..."}`; a short plain-text body is used as-is.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => {
            let field = map.get("message").or_else(|| map.get("error"))?;
            match field {
                Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                Value::Array(items) => {
                    let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                    (!parts.is_empty()).then(|| parts.join("; "))
                }
                _ => None,
            }
        }
        Ok(_) => None,
        Err(_) if trimmed.len() <= 200 && !trimmed.starts_with('<') => Some(trimmed.to_string()),
        Err(_) => None,
    }
}
