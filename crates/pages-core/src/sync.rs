//! Database repository synchronization
//!
//! The database repository is the durable source of truth: one private
//! repository per identity holding every site's source tree plus shared
//! assets. Pull converges the local mirror on the remote; push publishes
//! local changes and is never forced. If the remote advanced again
//! between pull and push, the rejection surfaces as a conflict instead
//! of overwriting shared history.

use pages_git::LocalRepo;
use pages_github::HostingProvider;

use crate::config::{
    DATABASE_REPO_NAME, DEFAULT_BRANCH, INITIAL_COMMIT_MESSAGE, ORIGIN_REMOTE,
    SYNC_COMMIT_MESSAGE,
};
use crate::identity::Session;
use crate::scaffold;
use crate::state::{ReconciliationDirective, RepositoryRef, probe_state, resolve};
use crate::{Error, Result};

/// What a pull did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullReport {
    /// The directive the existence matrix selected.
    pub directive: ReconciliationDirective,
    /// True on a cold start: the database repository was created from
    /// nothing, so the identity's root pages site must be provisioned.
    pub cold_start: bool,
}

/// Owns synchronization of the session's database repository.
pub struct ContentSyncEngine<'a> {
    session: &'a Session,
    provider: &'a dyn HostingProvider,
}

impl<'a> ContentSyncEngine<'a> {
    pub fn new(session: &'a Session, provider: &'a dyn HostingProvider) -> Self {
        Self { session, provider }
    }

    /// Converge the local database working copy and the remote.
    ///
    /// Safe to call repeatedly: every invocation re-probes existence and
    /// a converged pair is a no-op pull.
    pub fn pull(&self) -> Result<PullReport> {
        let db_ref = RepositoryRef::database(self.session);
        let state = probe_state(self.provider, &db_ref)?;
        let directive = resolve(state.local_exists, state.remote_exists);
        let url = db_ref.remote_url(self.session);
        let creds = self.session.credentials();
        let mut cold_start = false;

        tracing::debug!(?directive, repo = %db_ref.name, "Resolved database directive");

        match directive {
            ReconciliationDirective::Pull => {
                let repo = LocalRepo::open(&db_ref.local_path, self.session.git_identity())?;
                repo.set_remote(ORIGIN_REMOTE, &url)?;
                // Checkpoint drafts first so the merge can never discard
                // uncommitted authored content
                if repo.is_dirty()? {
                    repo.commit_all(SYNC_COMMIT_MESSAGE)?;
                }
                repo.pull(
                    ORIGIN_REMOTE,
                    DEFAULT_BRANCH,
                    db_ref.role.merge_favor(),
                    &creds,
                )?;
            }
            ReconciliationDirective::InitFromRemote => {
                let repo = LocalRepo::init(&db_ref.local_path, self.session.git_identity())?;
                repo.set_remote(ORIGIN_REMOTE, &url)?;
                repo.fetch(ORIGIN_REMOTE, DEFAULT_BRANCH, &creds)?;
                repo.adopt_fetched_branch(DEFAULT_BRANCH)?;
            }
            ReconciliationDirective::CreateRemoteAndPush => {
                let repo = LocalRepo::open(&db_ref.local_path, self.session.git_identity())?;
                repo.ensure_local_branch(DEFAULT_BRANCH)?;
                repo.commit_all(SYNC_COMMIT_MESSAGE)?;
                self.provider.create_repository(DATABASE_REPO_NAME, true)?;
                repo.set_remote(ORIGIN_REMOTE, &url)?;
                repo.push(ORIGIN_REMOTE, DEFAULT_BRANCH, db_ref.role.force_push(), &creds)?;
            }
            ReconciliationDirective::InitLocalAndPush => {
                scaffold::seed_database_dir(&db_ref.local_path)?;
                let repo = LocalRepo::init(&db_ref.local_path, self.session.git_identity())?;
                repo.ensure_local_branch(DEFAULT_BRANCH)?;
                repo.commit_all(INITIAL_COMMIT_MESSAGE)?;
                self.provider.create_repository(DATABASE_REPO_NAME, true)?;
                repo.set_remote(ORIGIN_REMOTE, &url)?;
                repo.push(ORIGIN_REMOTE, DEFAULT_BRANCH, db_ref.role.force_push(), &creds)?;
                cold_start = true;
            }
        }

        Ok(PullReport {
            directive,
            cold_start,
        })
    }

    /// Publish local database changes.
    ///
    /// Pulls first to converge on any concurrent remote change, then
    /// stages everything, commits with the provenance message, and
    /// pushes without force.
    pub fn push(&self) -> Result<PullReport> {
        let report = self.pull()?;

        let db_ref = RepositoryRef::database(self.session);
        let repo = LocalRepo::open(&db_ref.local_path, self.session.git_identity())?;
        repo.commit_all(SYNC_COMMIT_MESSAGE)?;

        repo.push(
            ORIGIN_REMOTE,
            DEFAULT_BRANCH,
            db_ref.role.force_push(),
            &self.session.credentials(),
        )
        .map_err(map_push_error)?;

        tracing::info!(repo = %db_ref.name, "Pushed database repository");
        Ok(report)
    }
}

/// A non-fast-forward rejection on the database repository means the
/// remote advanced past local; that is a conflict for the user to
/// resolve by pulling again, never something to overwrite.
fn map_push_error(e: pages_git::Error) -> Error {
    match e {
        pages_git::Error::PushRejected { message } => Error::SyncConflict { message },
        other => Error::Git(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_push_maps_to_sync_conflict() {
        let mapped = map_push_error(pages_git::Error::PushRejected {
            message: "refs/heads/main: non-fast-forward".into(),
        });
        assert!(matches!(mapped, Error::SyncConflict { .. }));
    }

    #[test]
    fn test_other_push_errors_stay_git_errors() {
        let mapped = map_push_error(pages_git::Error::PushFailed {
            message: "connection reset".into(),
        });
        assert!(matches!(mapped, Error::Git(_)));
    }
}
