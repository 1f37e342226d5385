//! In-memory hosting provider backed by bare repositories on disk.
//!
//! `create_repository` materialises a bare repository under the fixture
//! root, so engine code that pushes to `{remote_base}/{owner}/{name}.git`
//! works end-to-end over git's local transport with no network.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use pages_github::{Error, HostingProvider, RepoInfo, Result};

/// Fake hosting provider for engine tests.
pub struct MockHostingProvider {
    login: String,
    root: PathBuf,
    repos: RefCell<BTreeMap<String, bool>>,
    pages_enabled: RefCell<Vec<String>>,
    https_enforced: RefCell<Vec<String>>,
    revoked: Cell<bool>,
    fail_hosting: Cell<bool>,
}

impl MockHostingProvider {
    /// # Panics
    /// Panics if the fixture root cannot be created.
    pub fn new(login: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        fs::create_dir_all(&root)
            .unwrap_or_else(|e| panic!("MockHostingProvider: failed to create root: {e}"));
        Self {
            login: login.into(),
            root,
            repos: RefCell::new(BTreeMap::new()),
            pages_enabled: RefCell::new(Vec::new()),
            https_enforced: RefCell::new(Vec::new()),
            revoked: Cell::new(false),
            fail_hosting: Cell::new(false),
        }
    }

    /// The URL base engine sessions should use so remote refs resolve to
    /// this fixture's bare repositories.
    pub fn remote_base(&self) -> String {
        self.root.display().to_string()
    }

    /// Filesystem path of a hosted bare repository.
    pub fn repo_path(&self, owner: &str, name: &str) -> PathBuf {
        self.root.join(owner).join(format!("{name}.git"))
    }

    /// Seed a repository as already existing remotely (bare, empty).
    pub fn seed_repository(&self, name: &str, private: bool) -> PathBuf {
        let path = self.repo_path(&self.login, name);
        crate::git::bare_remote(&path);
        self.repos.borrow_mut().insert(name.to_string(), private);
        path
    }

    /// Whether Pages hosting was activated for `repo`.
    pub fn pages_enabled_for(&self, repo: &str) -> bool {
        self.pages_enabled.borrow().iter().any(|r| r == repo)
    }

    /// Whether HTTPS enforcement was requested for `repo`.
    pub fn https_enforced_for(&self, repo: &str) -> bool {
        self.https_enforced.borrow().iter().any(|r| r == repo)
    }

    /// How many times Pages activation was requested for `repo`.
    pub fn pages_enable_count(&self, repo: &str) -> usize {
        self.pages_enabled.borrow().iter().filter(|r| *r == repo).count()
    }

    /// Whether the token was revoked.
    pub fn token_revoked(&self) -> bool {
        self.revoked.get()
    }

    /// Make hosting-activation calls fail, for non-fatality tests.
    pub fn fail_hosting_calls(&self, fail: bool) {
        self.fail_hosting.set(fail);
    }

    /// Whether `name` is recorded as a private repository.
    pub fn is_private(&self, name: &str) -> Option<bool> {
        self.repos.borrow().get(name).copied()
    }

    fn bare_repo_exists(&self, owner: &str, name: &str) -> bool {
        self.repo_path(owner, name).join("HEAD").exists()
    }
}

impl HostingProvider for MockHostingProvider {
    fn authenticated_login(&self) -> Result<String> {
        if self.revoked.get() {
            return Err(Error::InvalidToken);
        }
        Ok(self.login.clone())
    }

    fn list_repositories(&self) -> Result<Vec<RepoInfo>> {
        Ok(self
            .repos
            .borrow()
            .iter()
            .map(|(name, private)| RepoInfo {
                name: name.clone(),
                private: *private,
            })
            .collect())
    }

    fn create_repository(&self, name: &str, private: bool) -> Result<()> {
        if self.bare_repo_exists(&self.login, name) {
            return Err(Error::Api {
                status: 422,
                message: format!("name already exists on this account: {name}"),
            });
        }
        crate::git::bare_remote(&self.repo_path(&self.login, name));
        self.repos.borrow_mut().insert(name.to_string(), private);
        Ok(())
    }

    fn delete_repository(&self, owner: &str, name: &str) -> Result<()> {
        let path = self.repo_path(owner, name);
        if path.exists() {
            fs::remove_dir_all(&path).map_err(|e| Error::Transport {
                message: e.to_string(),
            })?;
        }
        self.repos.borrow_mut().remove(name);
        Ok(())
    }

    fn enable_pages(&self, _owner: &str, repo: &str, _branch: &str, _path: &str) -> Result<()> {
        if self.fail_hosting.get() {
            return Err(Error::Api {
                status: 500,
                message: "pages activation unavailable".into(),
            });
        }
        self.pages_enabled.borrow_mut().push(repo.to_string());
        Ok(())
    }

    fn enforce_https(&self, _owner: &str, repo: &str) -> Result<()> {
        if self.fail_hosting.get() {
            return Err(Error::Api {
                status: 500,
                message: "https enforcement unavailable".into(),
            });
        }
        self.https_enforced.borrow_mut().push(repo.to_string());
        Ok(())
    }

    fn revoke_token(&self) -> Result<()> {
        self.revoked.set(true);
        Ok(())
    }
}

/// Convenience: a provider rooted in a fresh temp directory.
///
/// Returns the provider together with the TempDir guard keeping the
/// fixture alive.
pub fn temp_provider(login: &str) -> (MockHostingProvider, tempfile::TempDir) {
    let temp = tempfile::TempDir::new().expect("temp_provider: tempdir");
    let provider = MockHostingProvider::new(login, temp.path().join("remotes"));
    (provider, temp)
}

/// Check whether a bare fixture repository has a `main` branch, i.e.
/// something was actually pushed to it.
pub fn remote_has_main(path: &Path) -> bool {
    match git2::Repository::open_bare(path) {
        Ok(repo) => repo.find_reference("refs/heads/main").is_ok(),
        Err(_) => false,
    }
}
