//! On-disk layout of the manager home directory
//!
//! ```text
//! ~/.pages-manager/
//!   config.json            identity document: login -> { accessToken }
//!   {login}/               the user's database repository working copy
//!     config.json          per-user document: site -> { cname }
//!     .gitignore
//!     README.md
//!     {site}/              one directory per site (source tree)
//!       _config.yml
//!       source/
//!       public/            generated artifact, its own git working copy
//! ```
//!
//! Everything in the engine resolves paths through this type; nothing
//! else concatenates home-relative paths by hand.

use crate::constants::HomePath;
use crate::path::NormalizedPath;
use crate::{Error, Result};

/// Resolves paths under the manager's home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeLayout {
    root: NormalizedPath,
}

impl HomeLayout {
    /// Create a layout rooted at an explicit directory.
    ///
    /// Tests use this to point the layout at a temp directory.
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    /// Create the default layout under the user's home directory.
    pub fn discover() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDirectory)?;
        Ok(Self::new(
            NormalizedPath::new(home).join(HomePath::HomeDir.as_str()),
        ))
    }

    /// The manager home directory itself.
    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// The identity document mapping login name to access token.
    pub fn identity_config(&self) -> NormalizedPath {
        self.root.join(HomePath::IdentityConfig.as_str())
    }

    /// A user's directory: the database repository working copy.
    pub fn user_dir(&self, login: &str) -> NormalizedPath {
        self.root.join(login)
    }

    /// A user's site document mapping site name to CNAME.
    pub fn user_config(&self, login: &str) -> NormalizedPath {
        self.user_dir(login).join(HomePath::UserConfig.as_str())
    }

    /// A site's source directory.
    pub fn site_dir(&self, login: &str, site: &str) -> NormalizedPath {
        self.user_dir(login).join(site)
    }

    /// Ensure the manager home directory exists.
    pub fn ensure_root(&self) -> Result<()> {
        let native = self.root.to_native();
        std::fs::create_dir_all(&native).map_err(|e| Error::io(&native, e))
    }

    /// Ensure a user's directory exists.
    pub fn ensure_user_dir(&self, login: &str) -> Result<NormalizedPath> {
        let dir = self.user_dir(login);
        let native = dir.to_native();
        std::fs::create_dir_all(&native).map_err(|e| Error::io(&native, e))?;
        Ok(dir)
    }
}
