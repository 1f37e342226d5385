//! Database pull/push command implementations

use colored::Colorize;

use pages_core::Workspace;

use crate::context::open_session;
use crate::error::Result;

/// Pull the database repository, provisioning on first run.
pub fn run_pull() -> Result<()> {
    let (session, client) = open_session()?;
    let workspace = Workspace::new(&session, &client);

    let report = workspace.ensure_ready()?;
    if report.cold_start {
        println!(
            "{} Created the database repository and your root site",
            "OK".green().bold()
        );
    } else {
        println!("{} Database repository is up to date", "OK".green().bold());
    }
    Ok(())
}

/// Publish local database changes.
pub fn run_push() -> Result<()> {
    let (session, client) = open_session()?;
    let workspace = Workspace::new(&session, &client);

    workspace.sync().push()?;
    println!("{} Pushed database repository", "OK".green().bold());
    Ok(())
}
