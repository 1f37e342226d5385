//! Default content for brand-new repositories and sites

use pages_fs::{NormalizedPath, io};

use crate::{Error, Result};

const DATABASE_README: &str = "\
# Pages Manager Database\n\n\
Source of truth for every site published with \
[pages-manager](https://github.com/user/pages-manager).\n";

const DATABASE_GITIGNORE: &str = "node_modules/\npublic/\n";

const SITE_CONFIG: &str = "\
# Generator configuration for this site.\n\
title: New Site\n\
command: hexo\n\
source_dir: source\n\
public_dir: public\n\
port: 4000\n";

const SITE_GITIGNORE: &str = "node_modules/\npublic/\n";

const FIRST_POST: &str = "\
---\n\
title: Hello World\n\
---\n\n\
Welcome! This is your first post. Edit or delete it, then publish with\n\
a deploy.\n";

/// Seed a cold-start database directory with its default files.
///
/// Only writes files that are missing; an existing README or ignore
/// file is the user's and stays untouched.
pub fn seed_database_dir(user_dir: &NormalizedPath) -> Result<()> {
    std::fs::create_dir_all(user_dir.to_native())?;

    let readme = user_dir.join("README.md");
    if !readme.exists() {
        io::write_text(&readme, DATABASE_README)?;
    }

    let gitignore = user_dir.join(".gitignore");
    if !gitignore.exists() {
        io::write_text(&gitignore, DATABASE_GITIGNORE)?;
    }

    Ok(())
}

/// Write a minimal generator-ready site skeleton.
///
/// Refuses to overwrite: a site's existence is defined by its directory
/// existing, so an existing directory is an existing site.
pub fn scaffold_site(site_dir: &NormalizedPath) -> Result<()> {
    if site_dir.exists() {
        return Err(Error::SiteExists {
            name: site_dir.file_name().unwrap_or_default().to_string(),
        });
    }

    std::fs::create_dir_all(site_dir.join("source/_posts").to_native())?;
    io::write_text(&site_dir.join("_config.yml"), SITE_CONFIG)?;
    io::write_text(&site_dir.join(".gitignore"), SITE_GITIGNORE)?;
    io::write_text(&site_dir.join("source/_posts/hello-world.md"), FIRST_POST)?;

    tracing::info!(site = %site_dir, "Scaffolded site");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_seed_database_dir_is_idempotent_and_preserving() {
        let temp = TempDir::new().unwrap();
        let dir = NormalizedPath::new(temp.path().join("octocat"));

        seed_database_dir(&dir).unwrap();
        assert!(dir.join("README.md").is_file());
        assert!(dir.join(".gitignore").is_file());

        std::fs::write(dir.join("README.md").to_native(), "custom").unwrap();
        seed_database_dir(&dir).unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.join("README.md").to_native()).unwrap(),
            "custom"
        );
    }

    #[test]
    fn test_scaffold_site_layout() {
        let temp = TempDir::new().unwrap();
        let dir = NormalizedPath::new(temp.path().join("blog"));

        scaffold_site(&dir).unwrap();

        assert!(dir.join("_config.yml").is_file());
        assert!(dir.join("source/_posts/hello-world.md").is_file());
    }

    #[test]
    fn test_scaffold_refuses_existing_directory() {
        let temp = TempDir::new().unwrap();
        let dir = NormalizedPath::new(temp.path().join("blog"));
        std::fs::create_dir_all(dir.to_native()).unwrap();

        let result = scaffold_site(&dir);
        assert!(matches!(result, Err(Error::SiteExists { .. })));
    }
}
