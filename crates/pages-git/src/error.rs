//! Error types for pages-git

use std::path::PathBuf;

/// Result type for pages-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pages-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Push rejected by remote: {message}")]
    PushRejected { message: String },

    #[error("Merge produced conflicts: {message}")]
    MergeConflict { message: String },
}
