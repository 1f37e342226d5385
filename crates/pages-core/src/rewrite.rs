//! Attribution link rewriting over generated HTML
//!
//! Rewrites the *last* generator-attribution anchor of each page to
//! point at this project. Only the final occurrence is touched; earlier
//! matches are legitimate in-document attributions and stay as they
//! are.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use pages_fs::NormalizedPath;

use crate::config::{ATTRIBUTION_PATTERN, ATTRIBUTION_REPLACEMENT};
use crate::{Error, Result};

static ATTRIBUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(ATTRIBUTION_PATTERN).expect("attribution pattern must compile")
});

/// Replace the last match of `pattern` in `text` with the expanded
/// `replacement`. Returns `None` when nothing matches.
pub fn rewrite_last_match(text: &str, pattern: &Regex, replacement: &str) -> Option<String> {
    let caps = pattern.captures_iter(text).last()?;
    let matched = caps.get(0).expect("capture group 0 always exists");

    let mut expanded = String::new();
    caps.expand(replacement, &mut expanded);

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..matched.start()]);
    out.push_str(&expanded);
    out.push_str(&text[matched.end()..]);
    Some(out)
}

/// Rewrite the trailing attribution anchor in every `.html` file under
/// `dir`, recursively, skipping `.git`. Returns how many files changed.
pub fn rewrite_attribution_links(dir: &NormalizedPath) -> Result<usize> {
    let mut rewritten = 0;
    rewrite_in_dir(&dir.to_native(), &mut rewritten)?;
    tracing::debug!(dir = %dir, rewritten, "Rewrote attribution links");
    Ok(rewritten)
}

fn rewrite_in_dir(dir: &Path, rewritten: &mut usize) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(|e| Error::Fs(pages_fs::Error::io(dir, e)))? {
        let entry = entry.map_err(|e| Error::Fs(pages_fs::Error::io(dir, e)))?;
        let path = entry.path();
        let name = entry.file_name();

        if path.is_dir() {
            if name.to_string_lossy() == ".git" {
                continue;
            }
            rewrite_in_dir(&path, rewritten)?;
            continue;
        }

        if path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }

        let content =
            fs::read_to_string(&path).map_err(|e| Error::Fs(pages_fs::Error::io(&path, e)))?;
        if let Some(updated) = rewrite_last_match(&content, &ATTRIBUTION, ATTRIBUTION_REPLACEMENT)
        {
            if updated != content {
                fs::write(&path, updated)
                    .map_err(|e| Error::Fs(pages_fs::Error::io(&path, e)))?;
                *rewritten += 1;
            }
        }
    }
    Ok(())
}
