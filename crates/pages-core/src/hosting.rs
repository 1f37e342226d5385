//! Hosting activation and per-site custom-domain configuration
//!
//! CNAME mappings live in a per-user JSON sidecar keyed by site name,
//! outside the site's own tree, so they survive artifact regeneration.
//! `set_cname` never touches an artifact directory; the `CNAME` file
//! effect is applied on the next deploy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pages_fs::{ConfigStore, HomeLayout};
use pages_github::HostingProvider;

use crate::Result;

/// Per-user sidecar document: site name -> settings.
#[derive(Debug, Default, Serialize, Deserialize)]
struct UserDocument {
    #[serde(default)]
    sites: BTreeMap<String, SiteEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SiteEntry {
    #[serde(default)]
    cname: String,
}

/// Manages Pages hosting activation and custom-domain mappings.
pub struct PagesConfigManager {
    layout: HomeLayout,
    store: ConfigStore,
}

impl PagesConfigManager {
    pub fn new(layout: HomeLayout) -> Self {
        Self {
            layout,
            store: ConfigStore::new(),
        }
    }

    /// The CNAME configured for `(login, site)`, if any.
    ///
    /// An empty string in the document counts as unset.
    pub fn cname(&self, login: &str, site: &str) -> Result<Option<String>> {
        let doc: Option<UserDocument> = self.store.load_optional(&self.layout.user_config(login))?;
        Ok(doc
            .and_then(|d| d.sites.get(site).map(|s| s.cname.clone()))
            .filter(|c| !c.is_empty()))
    }

    /// Set or clear the CNAME for `(login, site)`.
    ///
    /// Pure sidecar update; publishing the change is the next deploy's
    /// job.
    pub fn set_cname(&self, login: &str, site: &str, cname: Option<&str>) -> Result<()> {
        let path = self.layout.user_config(login);
        let mut doc: UserDocument = self.store.load_optional(&path)?.unwrap_or_default();
        doc.sites.entry(site.to_string()).or_default().cname =
            cname.unwrap_or_default().to_string();
        self.store.save(&path, &doc)?;
        Ok(())
    }

    /// Enable Pages serving for `branch`/`path` of a repository.
    ///
    /// Activation failures must not roll back an otherwise-successful
    /// deploy; the content is already published and re-running deploy
    /// retries activation. Failures are logged and swallowed.
    pub fn enable_hosting(
        &self,
        provider: &dyn HostingProvider,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) {
        if let Err(e) = provider.enable_pages(owner, repo, branch, path) {
            tracing::warn!(repo, error = %e, "Pages activation failed; deploy unaffected");
        }
    }

    /// Enforce HTTPS for a repository's Pages site. Same non-fatal
    /// policy as [`Self::enable_hosting`].
    pub fn enforce_https(&self, provider: &dyn HostingProvider, owner: &str, repo: &str) {
        if let Err(e) = provider.enforce_https(owner, repo) {
            tracing::warn!(repo, error = %e, "HTTPS enforcement failed; deploy unaffected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pages_fs::NormalizedPath;
    use tempfile::TempDir;

    fn manager(temp: &TempDir) -> PagesConfigManager {
        PagesConfigManager::new(HomeLayout::new(NormalizedPath::new(temp.path())))
    }

    #[test]
    fn test_cname_round_trip() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);

        assert_eq!(manager.cname("octocat", "blog").unwrap(), None);

        manager
            .set_cname("octocat", "blog", Some("example.com"))
            .unwrap();
        assert_eq!(
            manager.cname("octocat", "blog").unwrap().as_deref(),
            Some("example.com")
        );

        manager.set_cname("octocat", "blog", None).unwrap();
        assert_eq!(manager.cname("octocat", "blog").unwrap(), None);
    }

    #[test]
    fn test_cname_is_scoped_per_site() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);

        manager
            .set_cname("octocat", "blog", Some("blog.example.com"))
            .unwrap();
        manager
            .set_cname("octocat", "docs", Some("docs.example.com"))
            .unwrap();

        assert_eq!(
            manager.cname("octocat", "blog").unwrap().as_deref(),
            Some("blog.example.com")
        );
        assert_eq!(
            manager.cname("octocat", "docs").unwrap().as_deref(),
            Some("docs.example.com")
        );
    }

    #[test]
    fn test_empty_cname_counts_as_unset() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);

        manager.set_cname("octocat", "blog", Some("")).unwrap();
        assert_eq!(manager.cname("octocat", "blog").unwrap(), None);
    }
}
