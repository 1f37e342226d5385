//! Error types for pages-github

/// Result type for pages-github operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the hosting provider
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network-level failure before an HTTP status was obtained.
    /// Safe to retry; no partial remote state was created.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The API answered with an error status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The access token was rejected by the identity endpoint.
    #[error("Access token is invalid or has been revoked")]
    InvalidToken,

    /// Token revocation needs OAuth application credentials that were
    /// not configured on this client.
    #[error("Token revocation is not configured for this client")]
    RevocationUnavailable,
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport {
            message: e.to_string(),
        }
    }
}
