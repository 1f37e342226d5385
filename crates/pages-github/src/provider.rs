//! Hosting-provider trait for remote repository management
//!
//! The engine only ever talks to this trait; the real GitHub binding
//! lives in [`crate::client`], and tests substitute a local fake backed
//! by bare repositories on disk.

use crate::Result;

/// Summary of a remote repository owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub name: String,
    pub private: bool,
}

/// Remote-side repository and hosting operations.
pub trait HostingProvider {
    /// The login name the token authenticates as.
    fn authenticated_login(&self) -> Result<String>;

    /// Every repository owned by the authenticated user.
    fn list_repositories(&self) -> Result<Vec<RepoInfo>>;

    /// Create a repository under the authenticated user.
    fn create_repository(&self, name: &str, private: bool) -> Result<()>;

    /// Delete a repository.
    fn delete_repository(&self, owner: &str, name: &str) -> Result<()>;

    /// Enable Pages serving for `branch`/`path` of a repository.
    /// Must be idempotent: enabling twice is not an error.
    fn enable_pages(&self, owner: &str, repo: &str, branch: &str, path: &str) -> Result<()>;

    /// Enforce HTTPS for a repository's Pages site.
    fn enforce_https(&self, owner: &str, repo: &str) -> Result<()>;

    /// Revoke the access token this provider authenticates with.
    fn revoke_token(&self) -> Result<()>;

    /// Whether the authenticated user owns a repository named `name`.
    ///
    /// Recomputed on every call; callers must not cache the answer
    /// across operations.
    fn repository_exists(&self, name: &str) -> Result<bool> {
        Ok(self.list_repositories()?.iter().any(|r| r.name == name))
    }
}
