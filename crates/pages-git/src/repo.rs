//! Working-copy operations over git2
//!
//! `LocalRepo` owns one working copy (the database repository or a
//! site's generated-artifact directory) and exposes the exact capability
//! set the engine needs. Commit signatures always come from the
//! identity handed in at open/init time; global git configuration is
//! never consulted, so behavior is identical across machines and tests.

use std::cell::RefCell;
use std::fs;

use git2::{
    BranchType, FetchOptions, IndexAddOption, MergeOptions, Oid, PushOptions, Repository,
    build::CheckoutBuilder,
};

use pages_fs::NormalizedPath;

use crate::credentials::TokenCredentials;
use crate::{Error, Result};

/// Author identity applied to every commit made through this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

impl GitIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Which side wins when a merge hits conflicting hunks.
///
/// The database repository merges with [`MergeFavor::Theirs`] (remote is
/// authoritative, local is a stale mirror); artifact repositories merge
/// with [`MergeFavor::Ours`] (a fresh build supersedes any divergent
/// remote history). Swapping these silently discards authored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeFavor {
    Ours,
    Theirs,
}

impl MergeFavor {
    fn to_git2(self) -> git2::FileFavor {
        match self {
            Self::Ours => git2::FileFavor::Ours,
            Self::Theirs => git2::FileFavor::Theirs,
        }
    }
}

/// How a pull converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// Local already contained the remote tip; nothing changed.
    UpToDate,
    /// Local branch had no history; the remote tip was adopted wholesale.
    Imported,
    /// Remote was strictly ahead; local fast-forwarded.
    FastForwarded,
    /// Histories diverged; a merge commit was created under the favor.
    Merged,
}

/// One git working copy.
pub struct LocalRepo {
    root: NormalizedPath,
    repo: Repository,
    author: GitIdentity,
}

impl LocalRepo {
    /// Whether `path` holds a working copy (a `.git` directory exists).
    ///
    /// This probe is the sole source of truth for local existence; no
    /// state record is kept alongside it.
    pub fn is_repository(path: &NormalizedPath) -> bool {
        path.join(".git").exists()
    }

    /// Initialize a new repository at `path`, creating the directory if
    /// needed, and record the author in its local config.
    pub fn init(path: &NormalizedPath, author: GitIdentity) -> Result<Self> {
        let native = path.to_native();
        fs::create_dir_all(&native).map_err(git2_io)?;
        let repo = Repository::init(&native)?;
        {
            let mut config = repo.config()?;
            config.set_str("user.name", &author.name)?;
            config.set_str("user.email", &author.email)?;
        }
        tracing::debug!(path = %path, "Initialized repository");
        Ok(Self {
            root: path.clone(),
            repo,
            author,
        })
    }

    /// Open an existing repository at `path`.
    pub fn open(path: &NormalizedPath, author: GitIdentity) -> Result<Self> {
        if !Self::is_repository(path) {
            return Err(Error::NotARepository {
                path: path.to_native(),
            });
        }
        let repo = Repository::open(path.to_native())?;
        Ok(Self {
            root: path.clone(),
            repo,
            author,
        })
    }

    /// The working copy root.
    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Attach (or repoint) a named remote.
    pub fn set_remote(&self, name: &str, url: &str) -> Result<()> {
        if self.repo.find_remote(name).is_ok() {
            self.repo.remote_set_url(name, url)?;
        } else {
            self.repo.remote(name, url)?;
        }
        Ok(())
    }

    /// Fetch one branch from a named remote.
    pub fn fetch(&self, remote: &str, branch: &str, creds: &TokenCredentials) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|_| Error::RemoteNotFound {
                name: remote.to_string(),
            })?;

        let mut opts = FetchOptions::new();
        opts.remote_callbacks(creds.callbacks());

        remote
            .fetch(&[branch], Some(&mut opts), None)
            .map_err(|e| Error::FetchFailed {
                message: e.message().to_string(),
            })?;
        Ok(())
    }

    /// Adopt the just-fetched remote tip as the local `branch`.
    ///
    /// Used when a local working copy is created fresh against an
    /// existing remote: no content synthesis, the remote history becomes
    /// the local history.
    pub fn adopt_fetched_branch(&self, branch: &str) -> Result<()> {
        let fetch_commit = self.fetched_commit()?;
        let refname = format!("refs/heads/{branch}");
        self.repo
            .reference(&refname, fetch_commit.id(), true, "import remote branch")?;
        self.repo.set_head(&refname)?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::default().force()))?;
        Ok(())
    }

    /// Make `branch` the checked-out branch, creating it if necessary.
    ///
    /// On a repository with no commits yet, HEAD is pointed at the
    /// unborn branch so the first commit creates it.
    pub fn ensure_local_branch(&self, branch: &str) -> Result<()> {
        let refname = format!("refs/heads/{branch}");

        if self.repo.find_branch(branch, BranchType::Local).is_ok() {
            self.repo.set_head(&refname)?;
            self.repo
                .checkout_head(Some(CheckoutBuilder::default().force()))?;
        } else if let Ok(head) = self.repo.head() {
            let commit = head.peel_to_commit()?;
            self.repo.branch(branch, &commit, false)?;
            self.repo.set_head(&refname)?;
            self.repo
                .checkout_head(Some(CheckoutBuilder::default().force()))?;
        } else {
            self.repo.set_head(&refname)?;
        }
        Ok(())
    }

    /// The current branch name, or `None` on a detached or unborn HEAD.
    pub fn current_branch(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => {
                Ok(Some(head.shorthand().unwrap_or("HEAD").to_string()))
            }
            Ok(_) => Ok(None),
            Err(_) => Ok(None),
        }
    }

    /// Whether the working copy has uncommitted or untracked changes.
    pub fn is_dirty(&self) -> Result<bool> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(!statuses.is_empty())
    }

    /// The commit id HEAD resolves to, or `None` on an unborn branch.
    pub fn head_id(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(_) => Ok(None),
        }
    }

    /// Fetch `branch` from `remote` and converge the local branch on it.
    ///
    /// Divergent histories are merged with `favor` deciding conflicting
    /// hunks; unrelated histories are tolerated. Local state is left
    /// unchanged when the fetch fails.
    pub fn pull(
        &self,
        remote: &str,
        branch: &str,
        favor: MergeFavor,
        creds: &TokenCredentials,
    ) -> Result<PullOutcome> {
        self.fetch(remote, branch, creds)?;

        let fetch_commit = self.fetched_commit()?;
        let annotated = self.repo.find_annotated_commit(fetch_commit.id())?;
        let (analysis, _) = self.repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            return Ok(PullOutcome::UpToDate);
        }

        if analysis.is_unborn() {
            self.adopt_fetched_branch(branch)?;
            return Ok(PullOutcome::Imported);
        }

        if analysis.is_fast_forward() {
            let refname = format!("refs/heads/{branch}");
            let mut reference = self.repo.find_reference(&refname)?;
            reference.set_target(
                fetch_commit.id(),
                &format!("pull: fast-forward to {}", fetch_commit.id()),
            )?;
            self.repo.set_head(&refname)?;
            self.repo
                .checkout_head(Some(CheckoutBuilder::default().force()))?;
            return Ok(PullOutcome::FastForwarded);
        }

        // Diverged: merge, letting the favor decide conflicting hunks
        let mut merge_opts = MergeOptions::new();
        merge_opts.file_favor(favor.to_git2());
        let mut checkout = CheckoutBuilder::new();
        checkout.force().allow_conflicts(true);
        self.repo
            .merge(&[&annotated], Some(&mut merge_opts), Some(&mut checkout))?;

        let mut index = self.repo.index()?;
        if index.has_conflicts() {
            self.repo.cleanup_state()?;
            return Err(Error::MergeConflict {
                message: format!("merge of {remote}/{branch} left unresolved conflicts"),
            });
        }

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let head_commit = self.repo.head()?.peel_to_commit()?;
        let signature = self.signature()?;
        let message = format!("Merge remote branch '{remote}/{branch}'");
        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &message,
            &tree,
            &[&head_commit, &fetch_commit],
        )?;
        self.repo.cleanup_state()?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::default().force()))?;

        tracing::debug!(remote, branch, ?favor, "Merged divergent histories");
        Ok(PullOutcome::Merged)
    }

    /// Stage everything and commit.
    ///
    /// Returns `None` without committing when the staged tree is
    /// identical to HEAD's tree, so repeated syncs with no changes
    /// produce no commits.
    pub fn commit_all(&self, message: &str) -> Result<Option<Oid>> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.signature()?;

        match self.repo.head() {
            Ok(head) => {
                let parent = head.peel_to_commit()?;
                if parent.tree_id() == tree_id {
                    return Ok(None);
                }
                let oid = self.repo.commit(
                    Some("HEAD"),
                    &signature,
                    &signature,
                    message,
                    &tree,
                    &[&parent],
                )?;
                Ok(Some(oid))
            }
            Err(_) => {
                let oid =
                    self.repo
                        .commit(Some("HEAD"), &signature, &signature, message, &tree, &[])?;
                Ok(Some(oid))
            }
        }
    }

    /// Push `branch` to a named remote.
    ///
    /// With `force` the refspec is prefixed with `+`, overwriting any
    /// divergent remote history. Without it a non-fast-forward push is
    /// surfaced as [`Error::PushRejected`] and the remote is left
    /// untouched.
    pub fn push(
        &self,
        remote: &str,
        branch: &str,
        force: bool,
        creds: &TokenCredentials,
    ) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|_| Error::RemoteNotFound {
                name: remote.to_string(),
            })?;

        let refspec = if force {
            format!("+refs/heads/{branch}:refs/heads/{branch}")
        } else {
            format!("refs/heads/{branch}:refs/heads/{branch}")
        };

        let rejection: RefCell<Option<String>> = RefCell::new(None);
        let outcome = {
            let mut callbacks = creds.callbacks();
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    *rejection.borrow_mut() = Some(format!("{refname}: {message}"));
                }
                Ok(())
            });
            let mut opts = PushOptions::new();
            opts.remote_callbacks(callbacks);
            remote.push(&[refspec.as_str()], Some(&mut opts))
        };

        if let Some(message) = rejection.into_inner() {
            return Err(Error::PushRejected { message });
        }

        outcome.map_err(|e| {
            // Transports differ in how they surface a non-fast-forward
            // rejection: some set the error code, some only the message
            if e.code() == git2::ErrorCode::NotFastForward
                || e.message().contains("non-fastforward")
            {
                Error::PushRejected {
                    message: e.message().to_string(),
                }
            } else {
                Error::PushFailed {
                    message: e.message().to_string(),
                }
            }
        })?;
        Ok(())
    }

    fn fetched_commit(&self) -> Result<git2::Commit<'_>> {
        let fetch_head = self
            .repo
            .find_reference("FETCH_HEAD")
            .map_err(|e| Error::FetchFailed {
                message: format!("could not find FETCH_HEAD: {}", e.message()),
            })?;
        fetch_head.peel_to_commit().map_err(|e| Error::FetchFailed {
            message: format!("could not resolve FETCH_HEAD: {}", e.message()),
        })
    }

    fn signature(&self) -> Result<git2::Signature<'static>> {
        Ok(git2::Signature::now(&self.author.name, &self.author.email)?)
    }
}

fn git2_io(e: std::io::Error) -> Error {
    Error::Git(git2::Error::from_str(&e.to_string()))
}
