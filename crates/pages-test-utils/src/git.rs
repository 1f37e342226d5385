//! Git repository fixtures.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs;
//! fakes are faster and have fewer external dependencies.

use std::fs;
use std::path::Path;

/// Creates a minimal `.git` directory structure **without** initialising
/// a real git repository.
///
/// Realism level: **FAKE**, directory structure only, no object store.
/// Use for tests that only need the local-existence probe to fire.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir(path.join(".git"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
    fs::create_dir_all(path.join(".git/refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create refs/heads: {e}"));
    fs::write(path.join(".git/refs/heads/main"), "")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write refs/heads/main: {e}"));
}

/// Initialises a bare repository to stand in for a hosted remote.
///
/// Realism level: **REAL**, a valid push/fetch target over the local
/// transport, empty history.
///
/// # Panics
/// Panics if `git2::Repository::init_bare` fails.
pub fn bare_remote(path: &Path) -> git2::Repository {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("bare_remote: failed to create {}: {e}", path.display()));
    git2::Repository::init_bare(path).unwrap_or_else(|e| {
        panic!("bare_remote: failed to init bare repo at {}: {e}", path.display())
    })
}

/// Initialises a real working-copy repository with a test author
/// configured, so commits never depend on global git config.
///
/// # Panics
/// Panics if initialisation fails.
pub fn workdir_repo(path: &Path) -> git2::Repository {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("workdir_repo: failed to create {}: {e}", path.display()));
    let repo = git2::Repository::init(path).unwrap_or_else(|e| {
        panic!("workdir_repo: failed to init repository at {}: {e}", path.display())
    });
    {
        let mut config = repo.config().expect("workdir_repo: repo config");
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    repo
}

/// Writes `content` to `rel_path` inside the repository's workdir,
/// stages everything, and commits on the current branch.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_file(repo: &git2::Repository, rel_path: &str, content: &str, message: &str) -> git2::Oid {
    let workdir = repo.workdir().expect("commit_file: bare repository");
    let file_path = workdir.join(rel_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&file_path, content).unwrap();

    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = repo.signature().unwrap();

    match repo.head() {
        Ok(head) => {
            let parent = head.peel_to_commit().unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
                .unwrap()
        }
        Err(_) => repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
            .unwrap(),
    }
}
