//! High-level facade over the engines
//!
//! Ties credential-backed sessions, database synchronization, and
//! per-site deployment together: ensuring a session is ready implies a
//! database pull, and a cold start auto-provisions the identity's root
//! `{login}.github.io` site so a brand-new identity always has at least
//! one hosting target.

use std::fs;

use pages_fs::NormalizedPath;
use pages_github::HostingProvider;

use crate::config::root_site_name;
use crate::deploy::{DeployReport, SiteDeploymentEngine};
use crate::hosting::PagesConfigManager;
use crate::identity::Session;
use crate::scaffold;
use crate::sync::{ContentSyncEngine, PullReport};
use crate::{Error, Result};

/// One static site: a named source directory owned by an identity.
///
/// A site's existence is defined by its directory existing on disk; it
/// has no record anywhere else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub owner: String,
    pub name: String,
    pub dir: NormalizedPath,
}

impl Site {
    /// Whether this is the identity's root `{login}.github.io` site.
    pub fn is_root(&self) -> bool {
        self.name == root_site_name(&self.owner)
    }
}

/// Facade coordinating sync and deployment for one session.
pub struct Workspace<'a> {
    session: &'a Session,
    provider: &'a dyn HostingProvider,
}

impl<'a> Workspace<'a> {
    pub fn new(session: &'a Session, provider: &'a dyn HostingProvider) -> Self {
        Self { session, provider }
    }

    /// The database sync engine for this session.
    pub fn sync(&self) -> ContentSyncEngine<'a> {
        ContentSyncEngine::new(self.session, self.provider)
    }

    /// The deployment engine for this session.
    pub fn deployer(&self) -> SiteDeploymentEngine<'a> {
        SiteDeploymentEngine::new(self.session, self.provider)
    }

    /// Pull the database repository, provisioning the root site on a
    /// cold start.
    ///
    /// After this returns, the identity has a database repository both
    /// locally and remotely, and at least one hosting target exists.
    pub fn ensure_ready(&self) -> Result<PullReport> {
        let report = self.sync().pull()?;
        if report.cold_start {
            self.provision_root_site()?;
        }
        Ok(report)
    }

    /// Bring the identity's root site into existence: scaffold its
    /// directory when missing and publish it when it has no remote yet.
    ///
    /// A root site that already exists on both sides needs nothing and
    /// is left alone.
    pub fn provision_root_site(&self) -> Result<Option<DeployReport>> {
        let name = root_site_name(self.session.login());
        let dir = self.session.site_dir(&name);

        let scaffolded = if dir.exists() {
            false
        } else {
            scaffold::scaffold_site(&dir)?;
            true
        };

        if !scaffolded && self.provider.repository_exists(&name)? {
            return Ok(None);
        }

        tracing::info!(site = %name, "Provisioning root site");
        let site = Site {
            owner: self.session.login().to_string(),
            name,
            dir,
        };
        let report = self.deployer().deploy(&site)?;
        Ok(Some(report))
    }

    /// Look up a site by name.
    pub fn site(&self, name: &str) -> Result<Site> {
        let dir = self.session.site_dir(name);
        if !dir.is_dir() {
            return Err(Error::SiteNotFound {
                name: name.to_string(),
            });
        }
        Ok(Site {
            owner: self.session.login().to_string(),
            name: name.to_string(),
            dir,
        })
    }

    /// Create a new site from the default scaffold.
    pub fn create_site(&self, name: &str) -> Result<Site> {
        let dir = self.session.site_dir(name);
        scaffold::scaffold_site(&dir)?;
        Ok(Site {
            owner: self.session.login().to_string(),
            name: name.to_string(),
            dir,
        })
    }

    /// Every site the identity owns: the directories directly under the
    /// user directory, excluding the repository metadata.
    pub fn list_sites(&self) -> Result<Vec<Site>> {
        let user_dir = self.session.user_dir();
        if !user_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut sites = Vec::new();
        for entry in fs::read_dir(user_dir.to_native())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == ".git" {
                continue;
            }
            sites.push(Site {
                owner: self.session.login().to_string(),
                name: name.clone(),
                dir: user_dir.join(&name),
            });
        }
        sites.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sites)
    }

    /// The public URL a site is served under: its custom domain when a
    /// CNAME is configured, otherwise the default Pages address.
    pub fn site_url(&self, site_name: &str) -> Result<String> {
        let manager = PagesConfigManager::new(self.session.layout().clone());
        if let Some(cname) = manager.cname(self.session.login(), site_name)? {
            return Ok(format!("http://{cname}"));
        }

        let login = self.session.login();
        if site_name == root_site_name(login) {
            Ok(format!("https://{login}.github.io"))
        } else {
            Ok(format!("https://{login}.github.io/{site_name}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use pages_fs::HomeLayout;
    use pages_test_utils::provider::temp_provider;
    use tempfile::TempDir;

    fn session(temp: &TempDir) -> Session {
        Session::new(
            Identity {
                login: "octocat".into(),
                token: "tok".into(),
            },
            HomeLayout::new(NormalizedPath::new(temp.path().join("home"))),
        )
    }

    #[test]
    fn test_site_lookup_requires_directory() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        let (provider, _guard) = temp_provider("octocat");
        let workspace = Workspace::new(&session, &provider);

        assert!(matches!(
            workspace.site("blog"),
            Err(Error::SiteNotFound { .. })
        ));

        std::fs::create_dir_all(session.site_dir("blog").to_native()).unwrap();
        let site = workspace.site("blog").unwrap();
        assert_eq!(site.name, "blog");
        assert!(!site.is_root());
    }

    #[test]
    fn test_list_sites_skips_git_and_files() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        let (provider, _guard) = temp_provider("octocat");
        let workspace = Workspace::new(&session, &provider);

        let user_dir = session.user_dir().to_native();
        std::fs::create_dir_all(user_dir.join(".git")).unwrap();
        std::fs::create_dir_all(user_dir.join("blog")).unwrap();
        std::fs::create_dir_all(user_dir.join("octocat.github.io")).unwrap();
        std::fs::write(user_dir.join("config.json"), "{}").unwrap();

        let sites = workspace.list_sites().unwrap();
        let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["blog", "octocat.github.io"]);
        assert!(sites[1].is_root());
    }

    #[test]
    fn test_site_url_prefers_cname() {
        let temp = TempDir::new().unwrap();
        let session = session(&temp);
        let (provider, _guard) = temp_provider("octocat");
        let workspace = Workspace::new(&session, &provider);

        assert_eq!(
            workspace.site_url("octocat.github.io").unwrap(),
            "https://octocat.github.io"
        );
        assert_eq!(
            workspace.site_url("blog").unwrap(),
            "https://octocat.github.io/blog"
        );

        PagesConfigManager::new(session.layout().clone())
            .set_cname("octocat", "blog", Some("blog.example.com"))
            .unwrap();
        assert_eq!(
            workspace.site_url("blog").unwrap(),
            "http://blog.example.com"
        );
    }
}
