//! Site management command implementations

use std::io::{BufRead, Write};

use colored::Colorize;

use pages_core::{GeneratorAdapter, PagesConfigManager, Workspace};

use crate::context::open_session;
use crate::error::{CliError, Result};

/// Create a new site from the default scaffold.
pub fn run_new(name: &str) -> Result<()> {
    let (session, client) = open_session()?;
    let workspace = Workspace::new(&session, &client);
    workspace.ensure_ready()?;

    let site = workspace.create_site(name)?;
    println!(
        "{} Created site {} at {}",
        "OK".green().bold(),
        site.name.cyan(),
        site.dir
    );
    println!("Publish it with {}.", format!("pages deploy {name}").cyan());
    Ok(())
}

/// Deploy one site, or every site with `--all`.
pub fn run_deploy(name: Option<&str>, all: bool) -> Result<()> {
    let (session, client) = open_session()?;
    let workspace = Workspace::new(&session, &client);
    workspace.ensure_ready()?;

    let sites = match name {
        Some(name) => vec![workspace.site(name)?],
        None if all => workspace.list_sites()?,
        None => {
            return Err(CliError::user(
                "name a site to deploy, or pass --all for every site",
            ));
        }
    };

    if sites.is_empty() {
        println!("No sites to deploy.");
        return Ok(());
    }

    let deployer = workspace.deployer();
    for site in &sites {
        println!("{} Deploying {}...", "=>".blue().bold(), site.name.cyan());
        let report = deployer.deploy(site)?;
        println!(
            "{} Published {} ({} pages rewritten)",
            "OK".green().bold(),
            workspace.site_url(&site.name)?.cyan(),
            report.rewritten_pages
        );
    }

    // Persist any source changes alongside the publish
    workspace.sync().push()?;
    Ok(())
}

/// Serve a local preview of a site until Enter is pressed.
pub fn run_server(name: &str) -> Result<()> {
    let (session, client) = open_session()?;
    let workspace = Workspace::new(&session, &client);

    let site = workspace.site(name)?;
    let handle = GeneratorAdapter::new().server(&site.dir)?;

    println!(
        "{} Previewing {} at {}",
        "OK".green().bold(),
        site.name.cyan(),
        handle.address().cyan()
    );
    print!("Press Enter to stop... ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    handle.stop()?;
    Ok(())
}

/// Show, set, or clear a site's custom domain.
///
/// Changing the mapping only updates the sidecar; the `CNAME` file in
/// the published artifact follows on the next deploy.
pub fn run_cname(name: &str, set: Option<&str>, clear: bool) -> Result<()> {
    let (session, client) = open_session()?;
    let workspace = Workspace::new(&session, &client);
    let site = workspace.site(name)?;

    let manager = PagesConfigManager::new(session.layout().clone());

    if clear {
        manager.set_cname(session.login(), &site.name, None)?;
        println!(
            "{} Cleared custom domain for {}; run {} to publish the change",
            "OK".green().bold(),
            site.name.cyan(),
            format!("pages deploy {name}").cyan()
        );
        return Ok(());
    }

    if let Some(domain) = set {
        manager.set_cname(session.login(), &site.name, Some(domain))?;
        println!(
            "{} Set custom domain {} for {}; run {} to publish the change",
            "OK".green().bold(),
            domain.cyan(),
            site.name.cyan(),
            format!("pages deploy {name}").cyan()
        );
        return Ok(());
    }

    match manager.cname(session.login(), &site.name)? {
        Some(domain) => println!("{domain}"),
        None => println!("No custom domain configured for {}.", site.name.cyan()),
    }
    Ok(())
}

/// List sites and the URLs they are served under.
pub fn run_list() -> Result<()> {
    let (session, client) = open_session()?;
    let workspace = Workspace::new(&session, &client);

    let sites = workspace.list_sites()?;
    if sites.is_empty() {
        println!(
            "No sites yet. Create one with {}.",
            "pages new <name>".cyan()
        );
        return Ok(());
    }

    for site in sites {
        let marker = if site.is_root() { "*" } else { " " };
        println!(
            "{marker} {}  {}",
            site.name.cyan(),
            workspace.site_url(&site.name)?.dimmed()
        );
    }
    Ok(())
}
