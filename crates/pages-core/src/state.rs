//! Repository roles, references, and the reconciliation directive matrix
//!
//! The directive space is closed and total: every `(local_exists,
//! remote_exists)` pair maps to exactly one directive. Existence flags
//! are recomputed fresh on every call; caching them across calls would
//! risk data loss.

use pages_fs::NormalizedPath;
use pages_git::{LocalRepo, MergeFavor};
use pages_github::HostingProvider;

use crate::Result;
use crate::config::DATABASE_REPO_NAME;
use crate::identity::Session;

/// The two kinds of repository the engine manages.
///
/// The role carries its reconciliation policy as data. The database
/// repository holds authored content: remote wins conflicting merges
/// (local is a stale mirror, not a second author) and history is never
/// force-overwritten. Pages repositories hold disposable build output:
/// a fresh build wins conflicting merges and the publish is a force
/// push, because only the tip state matters to hosted consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryRole {
    Database,
    Pages,
}

impl RepositoryRole {
    /// Which side wins when a pull hits conflicting hunks.
    pub fn merge_favor(self) -> MergeFavor {
        match self {
            Self::Database => MergeFavor::Theirs,
            Self::Pages => MergeFavor::Ours,
        }
    }

    /// Whether publishes to this role may overwrite remote history.
    pub fn force_push(self) -> bool {
        match self {
            Self::Database => false,
            Self::Pages => true,
        }
    }
}

/// One managed repository: a role, its remote coordinates, and the
/// local working copy bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub role: RepositoryRole,
    pub owner: String,
    pub name: String,
    pub local_path: NormalizedPath,
}

impl RepositoryRef {
    /// The session's single database repository.
    pub fn database(session: &Session) -> Self {
        Self {
            role: RepositoryRole::Database,
            owner: session.login().to_string(),
            name: DATABASE_REPO_NAME.to_string(),
            local_path: session.user_dir(),
        }
    }

    /// A site's publish repository, bound to its artifact directory.
    pub fn pages(session: &Session, site_name: &str, artifact_dir: NormalizedPath) -> Self {
        Self {
            role: RepositoryRole::Pages,
            owner: session.login().to_string(),
            name: site_name.to_string(),
            local_path: artifact_dir,
        }
    }

    /// Remote URL under the session's base.
    pub fn remote_url(&self, session: &Session) -> String {
        session.remote_url(&self.owner, &self.name)
    }
}

/// Fresh existence snapshot for one repository reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoState {
    pub local_exists: bool,
    pub remote_exists: bool,
}

/// The deterministic action selected from the existence matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationDirective {
    /// Both copies exist: fetch and merge under the role's favor.
    Pull,
    /// Local missing: initialize empty, attach remote, import `main`.
    InitFromRemote,
    /// Remote missing: create it and push local content as-is.
    CreateRemoteAndPush,
    /// Cold start: scaffold defaults, commit, create remote, push.
    InitLocalAndPush,
}

/// Map an existence pair to its directive.
///
/// Pure and total; there is no "unknown" branch to fall into.
pub fn resolve(local_exists: bool, remote_exists: bool) -> ReconciliationDirective {
    match (local_exists, remote_exists) {
        (true, true) => ReconciliationDirective::Pull,
        (false, true) => ReconciliationDirective::InitFromRemote,
        (true, false) => ReconciliationDirective::CreateRemoteAndPush,
        (false, false) => ReconciliationDirective::InitLocalAndPush,
    }
}

/// Compute a fresh existence snapshot.
///
/// Local existence is the `.git` probe on the working copy path; remote
/// existence is a live provider lookup. This function is the only place
/// the engine inspects either.
pub fn probe_state(
    provider: &dyn HostingProvider,
    repo_ref: &RepositoryRef,
) -> Result<RepoState> {
    let local_exists = LocalRepo::is_repository(&repo_ref.local_path);
    let remote_exists = provider.repository_exists(&repo_ref.name)?;
    Ok(RepoState {
        local_exists,
        remote_exists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, true, ReconciliationDirective::Pull)]
    #[case(false, true, ReconciliationDirective::InitFromRemote)]
    #[case(true, false, ReconciliationDirective::CreateRemoteAndPush)]
    #[case(false, false, ReconciliationDirective::InitLocalAndPush)]
    fn test_directive_matrix_is_total(
        #[case] local_exists: bool,
        #[case] remote_exists: bool,
        #[case] expected: ReconciliationDirective,
    ) {
        assert_eq!(resolve(local_exists, remote_exists), expected);
    }

    /// The per-role policy mapping is easy to get backwards and
    /// swapping it silently discards authored content. Pin it.
    #[test]
    fn test_role_policy_mapping() {
        assert_eq!(
            RepositoryRole::Database.merge_favor(),
            MergeFavor::Theirs,
            "database merges must favor the remote"
        );
        assert_eq!(
            RepositoryRole::Pages.merge_favor(),
            MergeFavor::Ours,
            "artifact merges must favor the fresh build"
        );
        assert!(!RepositoryRole::Database.force_push());
        assert!(RepositoryRole::Pages.force_push());
    }
}
