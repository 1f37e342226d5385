//! Fixed names and messages used across the engine.

/// Name of the per-identity private database repository.
pub const DATABASE_REPO_NAME: &str = "pages-manager-db";

/// The only branch the engine reads or publishes.
pub const DEFAULT_BRANCH: &str = "main";

/// Remote name every working copy is attached under.
pub const ORIGIN_REMOTE: &str = "origin";

/// Provenance message for database repository commits.
pub const SYNC_COMMIT_MESSAGE: &str = "Update by https://github.com/user/pages-manager";

/// Provenance message for artifact repository commits.
pub const DEPLOY_COMMIT_MESSAGE: &str = "Deploy by https://github.com/user/pages-manager";

/// Commit message used when seeding a brand-new database repository.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial repository";

/// Top-level files in the user directory that are internal to the
/// manager and never overlaid into published artifacts.
pub const RESERVED_TOP_LEVEL_FILES: &[&str] = &[".gitignore", "config.json"];

/// Project link written into rewritten attribution anchors.
pub const PROJECT_URL: &str = "https://github.com/user/pages-manager";

/// Project name written into rewritten attribution anchors.
pub const PROJECT_NAME: &str = "Pages Manager";

/// Matches the generator's own attribution anchor in generated HTML.
/// Groups: 1 = opening tag through `href="`, 2 = protocol (dropped),
/// 3 = rest of the opening tag, 4 = closing tag.
pub const ATTRIBUTION_PATTERN: &str =
    r#"(?i)(<a[^>]+?href=")(https?://)?hexo\.io/?("[^>]*>)Hexo(</a>)"#;

/// Replacement for the final attribution anchor of each page.
pub const ATTRIBUTION_REPLACEMENT: &str =
    "${1}https://github.com/user/pages-manager${3}Pages Manager${4}";

/// The auto-provisioned root hosting repository for a login.
pub fn root_site_name(login: &str) -> String {
    format!("{login}.github.io")
}
