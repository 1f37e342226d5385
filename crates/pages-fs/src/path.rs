//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// All paths that cross crate boundaries in Pages Manager are stored in
/// this form and converted to platform-native format only at I/O
/// boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: path_str.replace('\\', "/"),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Resolve symlinks and relative components.
    ///
    /// Falls back to the unresolved path when the target does not exist
    /// yet (canonicalization requires an existing path).
    pub fn canonicalize(&self) -> Self {
        match dunce::canonicalize(self.to_native()) {
            Ok(resolved) => Self::new(resolved),
            Err(_) => self.clone(),
        }
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment)
        } else {
            format!("{}/{}", self.inner, segment)
        };
        Self { inner: joined }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next()
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_parent() {
        let base = NormalizedPath::new("/home/user");
        let child = base.join("site");
        assert_eq!(child.as_str(), "/home/user/site");
        assert_eq!(child.parent().unwrap().as_str(), "/home/user");
    }

    #[test]
    fn test_backslashes_are_normalized() {
        let p = NormalizedPath::new(r"C:\Users\me\blog");
        assert_eq!(p.as_str(), "C:/Users/me/blog");
    }

    #[test]
    fn test_file_name_and_extension() {
        let p = NormalizedPath::new("/srv/site/index.html");
        assert_eq!(p.file_name(), Some("index.html"));
        assert_eq!(p.extension(), Some("html"));

        let hidden = NormalizedPath::new("/srv/site/.gitignore");
        assert_eq!(hidden.extension(), None);
    }

    #[test]
    fn test_parent_of_root_component() {
        let p = NormalizedPath::new("/top");
        assert_eq!(p.parent().unwrap().as_str(), "/");
        assert!(NormalizedPath::new("relative").parent().is_none());
    }
}
