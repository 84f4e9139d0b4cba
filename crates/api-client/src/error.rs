//! Error type shared by the service wrappers.

use session::{AuthError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure talking to a service.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The refresh token was rejected or missing: the session is over and
    /// the caller must send the user back through sign-in.
    #[error("session expired, sign in required")]
    SessionExpired(#[source] AuthError),

    /// The refresh attempt failed for a recoverable reason (network or
    /// storage trouble); the session may still be valid.
    #[error("token refresh failed: {0}")]
    Refresh(#[source] AuthError),

    /// The service answered with a non-success status.
    #[error("{method} {path} returned status {status}: {message}")]
    Status {
        method: reqwest::Method,
        path: String,
        status: u16,
        message: String,
    },

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Pulls a human-readable message out of an error response body.
///
/// The services answer with `{"message": ...}` or `{"error": ...}`; 400
/// responses may instead carry a field-validation map, which is flattened
/// into `field: problem` pairs.
pub(crate) fn extract_error_message(status: u16, body: &str) -> String {
    let value = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value,
        Err(_) => return fallback(status, body),
    };

    if status == 400 {
        if let Some(map) = value.as_object() {
            let fields: Vec<String> = map
                .iter()
                .filter(|(key, _)| key.as_str() != "message" && key.as_str() != "error")
                .filter_map(|(key, v)| v.as_str().map(|s| format!("{}: {}", key, s)))
                .collect();
            if !fields.is_empty() {
                return fields.join(", ");
            }
        }
    }

    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        return message.to_string();
    }
    if let Some(message) = value.get("error").and_then(|m| m.as_str()) {
        return message.to_string();
    }

    fallback(status, body)
}

fn fallback(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        trimmed.to_string()
    }
}
