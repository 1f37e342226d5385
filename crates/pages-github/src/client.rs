//! Blocking GitHub REST v3 binding

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::provider::{HostingProvider, RepoInfo};
use crate::{Error, Result};

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "pages-manager";
const ACCEPT_JSON: &str = "application/vnd.github+json";

/// OAuth application credentials, needed only for token revocation.
#[derive(Debug, Clone)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: String,
}

/// GitHub REST client authenticated with a personal access token.
pub struct GitHubClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
    oauth_app: Option<OAuthApp>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiRepo {
    name: String,
    private: bool,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: Option<String>,
}

impl GitHubClient {
    /// Build a client against the public GitHub API.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    /// Build a client against an explicit API base URL (GitHub
    /// Enterprise, or a local stub in tests).
    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            oauth_app: None,
        })
    }

    /// Attach OAuth application credentials, enabling token revocation.
    pub fn with_oauth_app(mut self, app: OAuthApp) -> Self {
        self.oauth_app = Some(app);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::blocking::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("token {}", self.token),
            )
    }

    /// Map an error response to [`Error::Api`], extracting the API's own
    /// message when the body carries one.
    fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let code = status.as_u16();
        let message = response
            .json::<ApiMessage>()
            .ok()
            .and_then(|m| m.message)
            .unwrap_or_else(|| status.to_string());
        Err(Error::Api {
            status: code,
            message,
        })
    }
}

impl HostingProvider for GitHubClient {
    fn authenticated_login(&self) -> Result<String> {
        let response = self.request(reqwest::Method::GET, "/user").send()?;
        if response.status().as_u16() == 401 {
            return Err(Error::InvalidToken);
        }
        let user: ApiUser = Self::check(response)?.json()?;
        Ok(user.login)
    }

    fn list_repositories(&self) -> Result<Vec<RepoInfo>> {
        let mut repos = Vec::new();
        let mut page = 1u32;
        loop {
            let response = self
                .request(reqwest::Method::GET, "/user/repos")
                .query(&[
                    ("type", "all".to_string()),
                    ("per_page", "100".to_string()),
                    ("page", page.to_string()),
                ])
                .send()?;
            let batch: Vec<ApiRepo> = Self::check(response)?.json()?;
            if batch.is_empty() {
                break;
            }
            let done = batch.len() < 100;
            repos.extend(batch.into_iter().map(|r| RepoInfo {
                name: r.name,
                private: r.private,
            }));
            if done {
                break;
            }
            page += 1;
        }
        Ok(repos)
    }

    fn create_repository(&self, name: &str, private: bool) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, "/user/repos")
            .json(&json!({ "name": name, "private": private }))
            .send()?;
        Self::check(response)?;
        tracing::info!(repo = name, private, "Created repository");
        Ok(())
    }

    fn delete_repository(&self, owner: &str, name: &str) -> Result<()> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/repos/{owner}/{name}"),
            )
            .send()?;
        Self::check(response)?;
        tracing::info!(repo = name, "Deleted repository");
        Ok(())
    }

    fn enable_pages(&self, owner: &str, repo: &str, branch: &str, path: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::POST, &format!("/repos/{owner}/{repo}/pages"))
            .json(&json!({ "source": { "branch": branch, "path": path } }))
            .send()?;

        // 409 means Pages is already enabled; activation is idempotent
        if response.status().as_u16() == 409 {
            return Ok(());
        }
        Self::check(response)?;
        tracing::info!(repo, branch, path, "Enabled Pages hosting");
        Ok(())
    }

    fn enforce_https(&self, owner: &str, repo: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/repos/{owner}/{repo}/pages"))
            .json(&json!({ "https_enforced": true }))
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    fn revoke_token(&self) -> Result<()> {
        let app = self
            .oauth_app
            .as_ref()
            .ok_or(Error::RevocationUnavailable)?;

        let response = self
            .http
            .delete(self.url(&format!("/applications/{}/token", app.client_id)))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .basic_auth(&app.client_id, Some(&app.client_secret))
            .json(&json!({ "access_token": self.token }))
            .send()?;
        Self::check(response)?;
        tracing::info!("Revoked access token");
        Ok(())
    }
}
