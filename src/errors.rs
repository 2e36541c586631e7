use thiserror::Error;

/// Top-level application error. All variants carry a human-readable message
/// for the JSON error body and server-side logging.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Request errors ───────────────────────────────────────────────────────
    #[error("Invalid request body: {message}")]
    InvalidRequest { message: String },

    // ── Upstream errors ──────────────────────────────────────────────────────
    #[error("Upstream request failed: {0}")]
    UpstreamTransport(#[source] reqwest::Error),

    #[error("Upstream rejected the request with status {status}: {body}")]
    UpstreamRejected { status: u16, body: String },

    #[error("Upstream stream failed: {message}")]
    Stream { message: String },

    // ── Configuration errors ─────────────────────────────────────────────────
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl AppError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        AppError::InvalidRequest { message: message.into() }
    }

    pub fn stream(message: impl Into<String>) -> Self {
        AppError::Stream { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config { message: message.into() }
    }
}
