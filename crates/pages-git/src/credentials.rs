//! Remote authentication for token-based HTTPS transports

use git2::{Cred, RemoteCallbacks};

/// Credentials for authenticated remotes.
///
/// GitHub accepts a personal access token as the username with the
/// fixed `x-oauth-basic` password over HTTPS. Local-path remotes (used
/// by the test fixtures) need no credentials at all.
#[derive(Debug, Clone, Default)]
pub struct TokenCredentials {
    token: Option<String>,
}

impl TokenCredentials {
    /// Credentials carrying an access token.
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// No credentials; transports that demand authentication will fail.
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// Build git2 callbacks that answer credential requests with the
    /// token, if one is present.
    ///
    /// The returned callbacks own a copy of the token, so they satisfy
    /// any caller-chosen lifetime.
    pub fn callbacks<'a>(&self) -> RemoteCallbacks<'a> {
        let mut callbacks = RemoteCallbacks::new();
        if let Some(token) = self.token.clone() {
            callbacks.credentials(move |_url, _username_from_url, _allowed| {
                Cred::userpass_plaintext(&token, "x-oauth-basic")
            });
        }
        callbacks
    }
}
