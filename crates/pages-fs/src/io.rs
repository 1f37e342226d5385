//! Atomic I/O and directory primitives
//!
//! Whole-document writes go through write-to-temp-then-rename so a
//! crashed process never leaves a partially written file behind.

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename to prevent partial writes. Acquires an
/// advisory lock on the temp file to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file in the same directory so the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Remove a file if it exists; absence is not an error.
pub fn remove_file_if_exists(path: &NormalizedPath) -> Result<bool> {
    let native_path = path.to_native();
    if native_path.is_file() {
        fs::remove_file(&native_path).map_err(|e| Error::io(&native_path, e))?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Remove every entry of `dir` except the names listed in `keep`.
///
/// Used to reset a generated-artifact directory while preserving its
/// `.git` binding. The directory itself is left in place.
pub fn clear_directory(dir: &NormalizedPath, keep: &[&str]) -> Result<()> {
    let native_dir = dir.to_native();
    if !native_dir.is_dir() {
        return Err(Error::NotADirectory { path: native_dir });
    }

    for entry in fs::read_dir(&native_dir).map_err(|e| Error::io(&native_dir, e))? {
        let entry = entry.map_err(|e| Error::io(&native_dir, e))?;
        let name = entry.file_name();
        if keep.iter().any(|k| name.to_string_lossy() == *k) {
            continue;
        }

        let entry_path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&entry_path, e))?;
        if file_type.is_dir() {
            fs::remove_dir_all(&entry_path).map_err(|e| Error::io(&entry_path, e))?;
        } else {
            fs::remove_file(&entry_path).map_err(|e| Error::io(&entry_path, e))?;
        }
    }

    tracing::debug!(dir = %dir, keep = ?keep, "Cleared directory");
    Ok(())
}

/// Copy every plain file directly under `src_dir` into `dest_dir`,
/// skipping directories and the names listed in `exclude`.
///
/// This is the "shared top-level files" overlay: assets placed at the
/// root of a user's home directory are inherited by every published
/// site without being duplicated per-site.
pub fn overlay_top_level_files(
    src_dir: &NormalizedPath,
    dest_dir: &NormalizedPath,
    exclude: &[&str],
) -> Result<Vec<String>> {
    let native_src = src_dir.to_native();
    if !native_src.is_dir() {
        return Err(Error::NotADirectory { path: native_src });
    }

    let native_dest = dest_dir.to_native();
    fs::create_dir_all(&native_dest).map_err(|e| Error::io(&native_dest, e))?;

    let mut copied = Vec::new();
    for entry in fs::read_dir(&native_src).map_err(|e| Error::io(&native_src, e))? {
        let entry = entry.map_err(|e| Error::io(&native_src, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if exclude.iter().any(|x| *x == name) {
            continue;
        }

        let entry_path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&entry_path, e))?;
        if !file_type.is_file() {
            continue;
        }

        let dest_path = native_dest.join(&name);
        fs::copy(&entry_path, &dest_path).map_err(|e| Error::io(&dest_path, e))?;
        copied.push(name);
    }

    tracing::debug!(src = %src_dir, dest = %dest_dir, count = copied.len(), "Overlaid top-level files");
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_parents() {
        let temp = TempDir::new().unwrap();
        let target = NormalizedPath::new(temp.path().join("nested/dir/file.json"));

        write_atomic(&target, b"{}").unwrap();

        assert_eq!(fs::read_to_string(target.to_native()).unwrap(), "{}");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let temp = TempDir::new().unwrap();
        let target = NormalizedPath::new(temp.path().join("state.json"));

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        let entries: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["state.json"]);
        assert_eq!(read_text(&target).unwrap(), "second");
    }

    #[test]
    fn test_clear_directory_keeps_listed_entries() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        fs::create_dir(root.join("assets")).unwrap();
        fs::write(root.join("assets/app.css"), "body {}").unwrap();

        clear_directory(&NormalizedPath::new(root), &[".git"]).unwrap();

        assert!(root.join(".git/HEAD").exists());
        assert!(!root.join("index.html").exists());
        assert!(!root.join("assets").exists());
    }

    #[test]
    fn test_clear_directory_rejects_files() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        let result = clear_directory(&NormalizedPath::new(&file), &[]);
        assert!(matches!(result, Err(Error::NotADirectory { .. })));
    }

    #[test]
    fn test_overlay_skips_directories_and_excluded_names() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("home");
        let dest = temp.path().join("public");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("favicon.ico"), "icon").unwrap();
        fs::write(src.join("config.json"), "{}").unwrap();
        fs::create_dir(src.join("my-site")).unwrap();

        let copied = overlay_top_level_files(
            &NormalizedPath::new(&src),
            &NormalizedPath::new(&dest),
            &["config.json"],
        )
        .unwrap();

        assert_eq!(copied, vec!["favicon.ico"]);
        assert!(dest.join("favicon.ico").exists());
        assert!(!dest.join("config.json").exists());
        assert!(!dest.join("my-site").exists());
    }
}
