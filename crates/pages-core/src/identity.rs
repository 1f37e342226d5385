//! Identity lifecycle and the engine session
//!
//! Exactly one identity is active per session. The credential store is
//! the only code that creates or destroys identities; every engine
//! operation receives an explicit [`Session`] instead of reading
//! process-wide state, so multiple identities can coexist in tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pages_fs::{ConfigStore, HomeLayout, NormalizedPath};
use pages_git::{GitIdentity, TokenCredentials};
use pages_github::HostingProvider;

use crate::Result;

const DEFAULT_REMOTE_BASE: &str = "https://github.com";

/// One authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login: String,
    pub token: String,
}

/// On-disk identity document: login name -> access token.
#[derive(Debug, Default, Serialize, Deserialize)]
struct IdentityDocument(BTreeMap<String, IdentityEntry>);

#[derive(Debug, Serialize, Deserialize)]
struct IdentityEntry {
    #[serde(rename = "accessToken")]
    access_token: String,
}

/// Persists the single user identity under the manager home.
pub struct CredentialStore {
    layout: HomeLayout,
    store: ConfigStore,
}

impl CredentialStore {
    pub fn new(layout: HomeLayout) -> Self {
        Self {
            layout,
            store: ConfigStore::new(),
        }
    }

    /// The stored identity, unvalidated. `None` on first run.
    pub fn stored(&self) -> Result<Option<Identity>> {
        let doc: Option<IdentityDocument> =
            self.store.load_optional(&self.layout.identity_config())?;
        let Some(doc) = doc else {
            return Ok(None);
        };
        Ok(doc.0.into_iter().next().map(|(login, entry)| Identity {
            login,
            token: entry.access_token,
        }))
    }

    /// Persist an identity and create its user directory.
    pub fn save(&self, identity: &Identity) -> Result<()> {
        let mut doc: IdentityDocument = self
            .store
            .load_optional(&self.layout.identity_config())?
            .unwrap_or_default();
        doc.0.insert(
            identity.login.clone(),
            IdentityEntry {
                access_token: identity.token.clone(),
            },
        );
        self.store.save(&self.layout.identity_config(), &doc)?;
        self.layout.ensure_user_dir(&identity.login)?;
        Ok(())
    }

    /// Remove a login from the identity document.
    pub fn remove(&self, login: &str) -> Result<()> {
        let doc: Option<IdentityDocument> =
            self.store.load_optional(&self.layout.identity_config())?;
        let Some(mut doc) = doc else {
            return Ok(());
        };
        if doc.0.remove(login).is_some() {
            self.store.save(&self.layout.identity_config(), &doc)?;
        }
        Ok(())
    }

    /// Validate the stored token against the identity endpoint.
    ///
    /// An invalid token is purged before returning, upholding the
    /// invariant that no repository operation ever runs with a dead
    /// identity. The validated login may differ in spelling from the
    /// stored key (renames, case changes); the canonical one wins.
    pub fn validate(&self, provider: &dyn HostingProvider) -> Result<Option<Identity>> {
        let Some(stored) = self.stored()? else {
            return Ok(None);
        };

        match provider.authenticated_login() {
            Ok(login) => {
                if login != stored.login {
                    self.remove(&stored.login)?;
                }
                let identity = Identity {
                    login,
                    token: stored.token,
                };
                self.save(&identity)?;
                Ok(Some(identity))
            }
            Err(pages_github::Error::InvalidToken) => {
                tracing::warn!(login = %stored.login, "Stored token rejected; purging identity");
                self.remove(&stored.login)?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Explicit context for every engine operation.
///
/// Carries the identity, the home layout, and the remote URL base.
/// Tests point `remote_base` at a directory of bare repositories so the
/// whole engine runs against git's local transport.
#[derive(Debug, Clone)]
pub struct Session {
    identity: Identity,
    layout: HomeLayout,
    remote_base: String,
}

impl Session {
    pub fn new(identity: Identity, layout: HomeLayout) -> Self {
        Self {
            identity,
            layout,
            remote_base: DEFAULT_REMOTE_BASE.to_string(),
        }
    }

    /// Override where remote repositories live.
    pub fn with_remote_base(mut self, base: impl Into<String>) -> Self {
        self.remote_base = base.into();
        self
    }

    pub fn login(&self) -> &str {
        &self.identity.login
    }

    pub fn token(&self) -> &str {
        &self.identity.token
    }

    pub fn layout(&self) -> &HomeLayout {
        &self.layout
    }

    /// The user's database repository working copy.
    pub fn user_dir(&self) -> NormalizedPath {
        self.layout.user_dir(&self.identity.login)
    }

    /// A site's source directory under the user directory.
    pub fn site_dir(&self, site: &str) -> NormalizedPath {
        self.layout.site_dir(&self.identity.login, site)
    }

    /// Remote URL for a repository under this session's base.
    pub fn remote_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/{owner}/{repo}.git", self.remote_base)
    }

    /// Author identity for commits made on behalf of this session.
    pub fn git_identity(&self) -> GitIdentity {
        GitIdentity::new(
            self.identity.login.clone(),
            format!("{}@users.noreply.github.com", self.identity.login),
        )
    }

    /// Transport credentials for authenticated remotes.
    pub fn credentials(&self) -> TokenCredentials {
        TokenCredentials::token(self.identity.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pages_test_utils::provider::temp_provider;
    use tempfile::TempDir;

    fn temp_layout(temp: &TempDir) -> HomeLayout {
        HomeLayout::new(NormalizedPath::new(temp.path().join("home")))
    }

    #[test]
    fn test_store_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_layout(&temp));

        assert!(store.stored().unwrap().is_none());

        let identity = Identity {
            login: "octocat".into(),
            token: "tok".into(),
        };
        store.save(&identity).unwrap();

        assert_eq!(store.stored().unwrap(), Some(identity));
        assert!(temp_layout(&temp).user_dir("octocat").is_dir());
    }

    #[test]
    fn test_remove_purges_login() {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_layout(&temp));
        store
            .save(&Identity {
                login: "octocat".into(),
                token: "tok".into(),
            })
            .unwrap();

        store.remove("octocat").unwrap();
        assert!(store.stored().unwrap().is_none());
    }

    #[test]
    fn test_validate_purges_invalid_token() {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_layout(&temp));
        store
            .save(&Identity {
                login: "octocat".into(),
                token: "expired".into(),
            })
            .unwrap();

        let (provider, _guard) = temp_provider("octocat");
        provider.revoke_token().unwrap();

        let validated = store.validate(&provider).unwrap();
        assert!(validated.is_none());
        assert!(store.stored().unwrap().is_none());
    }

    #[test]
    fn test_validate_adopts_canonical_login() {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp_layout(&temp));
        store
            .save(&Identity {
                login: "OctoCat".into(),
                token: "tok".into(),
            })
            .unwrap();

        let (provider, _guard) = temp_provider("octocat");
        let validated = store.validate(&provider).unwrap().unwrap();

        assert_eq!(validated.login, "octocat");
        assert_eq!(store.stored().unwrap().unwrap().login, "octocat");
    }

    #[test]
    fn test_session_remote_url() {
        let temp = TempDir::new().unwrap();
        let session = Session::new(
            Identity {
                login: "octocat".into(),
                token: "tok".into(),
            },
            temp_layout(&temp),
        );

        assert_eq!(
            session.remote_url("octocat", "pages-manager-db"),
            "https://github.com/octocat/pages-manager-db.git"
        );

        let local = session.with_remote_base("/tmp/remotes");
        assert_eq!(
            local.remote_url("octocat", "blog"),
            "/tmp/remotes/octocat/blog.git"
        );
    }
}
