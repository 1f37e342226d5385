//! Error types for pages-core
//!
//! The taxonomy follows the engine's propagation policy: auth failures
//! abort before any disk or network effect, sync conflicts are never
//! auto-resolved, remote/API failures are safe to retry, generation
//! failures leave the artifact in its pre-build state, and
//! hosting-activation failures never fail a deploy (they are logged at
//! the call site and swallowed, so they have no variant here).

use crate::deploy::DeployStage;

/// Result type for pages-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pages-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No identity, or the stored token failed validation.
    #[error("Not logged in: {message}")]
    Auth { message: String },

    /// Database push rejected because the remote advanced past local.
    #[error("Sync conflict: {message}")]
    SyncConflict { message: String },

    /// The generator build step failed.
    #[error("Generation failed: {message}")]
    Generation { message: String },

    /// A named site has no directory on disk.
    #[error("Site '{name}' does not exist")]
    SiteNotFound { name: String },

    /// A site directory is already present.
    #[error("Site '{name}' already exists")]
    SiteExists { name: String },

    /// A deployment stage failed; the remaining pipeline was aborted.
    #[error("Deploy failed at stage '{stage}': {source}")]
    Deploy {
        stage: DeployStage,
        #[source]
        source: Box<Error>,
    },

    /// Hosting-provider API failure; safe to retry the operation.
    #[error("Remote unavailable: {0}")]
    Remote(#[from] pages_github::Error),

    /// Git error from pages-git
    #[error(transparent)]
    Git(#[from] pages_git::Error),

    /// Filesystem error from pages-fs
    #[error(transparent)]
    Fs(#[from] pages_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }
}
