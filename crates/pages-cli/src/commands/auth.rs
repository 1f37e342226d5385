//! Login and logout command implementations

use std::env;

use colored::Colorize;
use dialoguer::Confirm;

use pages_core::{CredentialStore, Identity, Session, Workspace};
use pages_fs::HomeLayout;
use pages_github::client::OAuthApp;
use pages_github::{GitHubClient, HostingProvider};

use crate::error::{CliError, Result};

/// Validate a personal access token, store the identity, and bring the
/// account to a ready state (database pulled, root site provisioned).
pub fn run_login(token: &str) -> Result<()> {
    let client = GitHubClient::new(token)?;
    let login = match client.authenticated_login() {
        Ok(login) => login,
        Err(pages_github::Error::InvalidToken) => {
            return Err(CliError::user(
                "GitHub rejected this token; check its scopes and expiry",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let layout = HomeLayout::discover()?;
    layout.ensure_root()?;
    let store = CredentialStore::new(layout.clone());
    let identity = Identity {
        login: login.clone(),
        token: token.to_string(),
    };
    store.save(&identity)?;

    println!("{} Logged in as {}", "OK".green().bold(), login.cyan());

    let session = Session::new(identity, layout);
    let report = Workspace::new(&session, &client).ensure_ready()?;
    if report.cold_start {
        println!(
            "{} Provisioned {} and your root site",
            "OK".green().bold(),
            "pages-manager-db".cyan()
        );
    } else {
        println!("{} Database repository is up to date", "OK".green().bold());
    }
    Ok(())
}

/// Revoke the stored token (best effort) and purge the identity.
pub fn run_logout(yes: bool) -> Result<()> {
    let layout = HomeLayout::discover()?;
    let store = CredentialStore::new(layout);

    let Some(identity) = store.stored()? else {
        println!("Not logged in.");
        return Ok(());
    };

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Revoke the token for {} and forget the identity?",
                identity.login
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            return Ok(());
        }
    }

    // Revocation needs OAuth app credentials; absence or API failure
    // must not block the local purge
    let mut client = GitHubClient::new(&identity.token)?;
    if let (Ok(id), Ok(secret)) = (
        env::var("PAGES_MANAGER_CLIENT_ID"),
        env::var("PAGES_MANAGER_CLIENT_SECRET"),
    ) {
        client = client.with_oauth_app(OAuthApp {
            client_id: id,
            client_secret: secret,
        });
    }
    if let Err(e) = client.revoke_token() {
        tracing::warn!(error = %e, "Token revocation failed; purging identity anyway");
    }

    store.remove(&identity.login)?;
    println!(
        "{} Logged out {}",
        "OK".green().bold(),
        identity.login.cyan()
    );
    Ok(())
}
