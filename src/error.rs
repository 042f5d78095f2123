// Error surface for the client. Failures are preserved as close to the raw
// cause as the typed boundary allows; nothing here retries or recovers.
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS, timeout, or any other transport-level failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any non-success HTTP status. `message` is a compacted preview of the
    /// response body, in the server's own wording.
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// A response body that is not the expected shape. Produced instead of
    /// a partially-populated model.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The injected session store failed to read or write.
    #[error("session store failed: {0}")]
    Session(#[from] SessionError),

    /// `User::restore_session` found no stored credentials.
    #[error("no stored session to restore")]
    MissingSession,

    /// The configured base URL cannot carry path segments.
    #[error("base URL cannot carry path segments: {0}")]
    InvalidBaseUrl(Url),
}

// Custom result type
pub type ApiResult<T> = Result<T, ApiError>;

// Collapse whitespace and cap length so a status message stays a single line.
pub(crate) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
