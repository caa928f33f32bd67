//! Error types for image generation and history persistence.

use std::time::Duration;

/// Maximum length of an upstream error body kept in an error message.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Errors that can occur while generating, storing or saving images.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized error body.
        message: String,
    },

    /// Quota exhausted for now.
    #[error("rate limited (retry after {retry_after:?}): {message}")]
    RateLimited {
        /// Server-suggested wait, if given.
        retry_after: Option<Duration>,
        /// Sanitized error body.
        message: String,
    },

    /// Billing is not enabled for the API key.
    #[error("billing error: {0}")]
    Billing(String),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered but none of the response parts carried an image.
    #[error("no image produced: {0}")]
    NoImageProduced(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to decode base64 data or a data URI.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// Stored history could not be read back.
    #[error("failed to load history: {0}")]
    PersistenceLoad(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`StudioError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The API call succeeded but returned no usable image part.
    NoImageProduced,
    /// The API call itself failed (network, auth, quota, status).
    UpstreamFailure,
    /// Stored history was malformed; recovered by starting empty.
    PersistenceLoadFailure,
    /// A local failure (file I/O, decoding, bad arguments).
    Local,
}

impl StudioError {
    /// Classifies this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NoImageProduced(_) => FailureKind::NoImageProduced,
            Self::Auth(_)
            | Self::Api { .. }
            | Self::RateLimited { .. }
            | Self::Billing(_)
            | Self::ContentBlocked(_)
            | Self::Network(_) => FailureKind::UpstreamFailure,
            Self::PersistenceLoad(_) => FailureKind::PersistenceLoadFailure,
            Self::InvalidRequest(_) | Self::Decode(_) | Self::Io(_) | Self::Json(_) => {
                FailureKind::Local
            }
        }
    }
}

/// Result type alias for studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;

/// Reads a `Retry-After` header given in whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Cleans an upstream error body before it is surfaced.
///
/// Prefers the `error.message` field of a Google-style JSON error body,
/// collapses whitespace and truncates long bodies.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| text.to_owned());

    let collapsed = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_ERROR_BODY_LEN {
        let truncated: String = collapsed.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{truncated}...")
    } else {
        collapsed
    }
}

/// Replaces every occurrence of `secret` in `text`.
pub(crate) fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_owned();
    }
    text.replace(secret, "[REDACTED]")
}
