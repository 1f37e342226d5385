//! Filesystem name constants for the manager's home directory.

use std::path::Path;

/// Well-known file and directory names under the manager home.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomePath {
    /// The manager home directory under the user's home (`.pages-manager`)
    HomeDir,
    /// The identity document mapping login name to access token
    IdentityConfig,
    /// The per-user site document mapping site name to CNAME
    UserConfig,
    /// The `.git` directory marking a repository working copy
    GitDir,
}

impl HomePath {
    /// Get the string representation of the path component.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HomeDir => ".pages-manager",
            Self::IdentityConfig => "config.json",
            Self::UserConfig => "config.json",
            Self::GitDir => ".git",
        }
    }
}

impl AsRef<Path> for HomePath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for HomePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for HomePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
