//! Session construction for authenticated commands
//!
//! Every command that touches a repository needs a validated identity
//! first: the stored token is checked against the API and purged when
//! rejected, so no git or network operation ever runs with a dead
//! credential.

use pages_core::{CredentialStore, Session};
use pages_fs::HomeLayout;
use pages_github::GitHubClient;

use crate::error::Result;

/// Build a validated session and an API client for it.
pub fn open_session() -> Result<(Session, GitHubClient)> {
    let layout = HomeLayout::discover()?;
    let store = CredentialStore::new(layout.clone());

    let Some(stored) = store.stored()? else {
        return Err(pages_core::Error::auth("run `pages login --token <TOKEN>` first").into());
    };

    let client = GitHubClient::new(&stored.token)?;
    let Some(identity) = store.validate(&client)? else {
        return Err(
            pages_core::Error::auth("the stored token is no longer valid; run `pages login` again")
                .into(),
        );
    };

    Ok((Session::new(identity, layout), client))
}
