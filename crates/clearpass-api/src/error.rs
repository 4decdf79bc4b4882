use thiserror::Error;

/// Top-level error type for the `clearpass-api` crate.
///
/// Only caller mistakes and transport failures are errors. A response that
/// arrives but is not what an operator expected (wrong status, missing
/// envelope) is reported as `Ok(None)` by the operator instead, so that it
/// can never be confused with an empty result.
#[derive(Debug, Error)]
pub enum Error {
    // ── Caller ──────────────────────────────────────────────────────
    /// A documented precondition was violated. Raised before any request
    /// is sent.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// The server could not be reached (connection refused, DNS failure, ...).
    #[error("Connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    /// Connect or read phase exceeded the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The redirect policy gave up.
    #[error("Too many redirects: {0}")]
    TooManyRedirects(#[source] reqwest::Error),

    /// Any other HTTP transport error.
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be built with the requested TLS settings.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// A success response whose body lacks required fields, with the raw
    /// body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns `true` if the caller passed a value violating a precondition.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` if the failure happened below HTTP (no response).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connect(_)
                | Self::Timeout(_)
                | Self::TooManyRedirects(_)
                | Self::Transport(_)
                | Self::InvalidUrl(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else if err.is_connect() {
            Self::Connect(err)
        } else if err.is_redirect() {
            Self::TooManyRedirects(err)
        } else {
            Self::Transport(err)
        }
    }
}
