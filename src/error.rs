//! Error types for greeting generation.

use std::time::Duration;

/// Marker the Gemini API puts in the message when the selected key does not
/// belong to a project that can reach the model.
pub const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

/// Maximum length of an upstream error body kept in an error message.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Errors that can occur while talking to the image service.
#[derive(Debug, thiserror::Error)]
pub enum GreetVizError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The service no longer accepts the selected key (expired session,
    /// key from the wrong project).
    #[error("API key rejected: {0}")]
    KeyRejected(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Billing is not enabled for the key's project.
    #[error("billing required: {0}")]
    Billing(String),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The service answered but the payload was not usable.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GreetVizError {
    /// Returns true if the service refused the credential.
    ///
    /// Only a rejected key counts. A plain 401/403 is reported as an
    /// ordinary failure; the message substring is kept for errors that reach
    /// us without a structured kind.
    pub fn is_authorization(&self) -> bool {
        match self {
            Self::KeyRejected(_) => true,
            other => other.to_string().contains(ENTITY_NOT_FOUND),
        }
    }
}

/// Result type alias for greeting generation operations.
pub type Result<T> = std::result::Result<T, GreetVizError>;

/// Redacts key-like query parameters and truncates long upstream bodies.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    const REDACTED: &str = "[REDACTED]";

    let mut cleaned = text.trim().to_string();
    let mut search_from = 0;
    // Also covers `api_key=`.
    while let Some(pos) = cleaned[search_from..].find("key=") {
        let start = search_from + pos + "key=".len();
        let end = cleaned[start..]
            .find(|c: char| c == '&' || c == '"' || c.is_whitespace())
            .map_or(cleaned.len(), |i| start + i);
        cleaned.replace_range(start..end, REDACTED);
        search_from = start + REDACTED.len();
    }
    if cleaned.chars().count() > MAX_ERROR_MESSAGE_LEN {
        cleaned = cleaned.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
        cleaned.push_str("...");
    }
    cleaned
}

/// Reads a `Retry-After` header given in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
