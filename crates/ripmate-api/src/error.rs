use thiserror::Error;

/// Top-level error type for the `ripmate-api` crate.
///
/// Covers every failure mode of the backend HTTP surface. `ripmate-core`
/// decides which of these are surfaced to the user and which are only logged.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Structured error from the server (non-2xx with a `message` body).
    #[error("Server error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// The message to show a user, verbatim from the server when it supplied
    /// one, otherwise the error's own description.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns `true` if this is a transient transport failure worth a
    /// manual retry (the client itself never retries).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
