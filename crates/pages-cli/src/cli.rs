//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};

/// Pages Manager - Publish generated static sites to GitHub Pages
#[derive(Parser, Debug)]
#[command(name = "pages")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Log in with a GitHub personal access token
    ///
    /// The token needs the repo, delete_repo, and user scopes. It is
    /// validated against the API and stored under ~/.pages-manager.
    Login {
        /// Personal access token
        #[arg(long, env = "PAGES_MANAGER_TOKEN")]
        token: String,
    },

    /// Revoke the stored token (best effort) and forget the identity
    Logout {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Pull the database repository from GitHub
    Pull,

    /// Publish local database changes to GitHub
    Push,

    /// Create a new site from the default scaffold
    New {
        /// Site name (becomes the publish repository name)
        name: String,
    },

    /// Regenerate and publish one site, or all of them
    Deploy {
        /// Site to deploy
        name: Option<String>,

        /// Deploy every site
        #[arg(long, conflicts_with = "name")]
        all: bool,
    },

    /// Serve a local preview of a site
    Server {
        /// Site to preview
        name: String,
    },

    /// Show or change a site's custom domain
    Cname {
        /// Site name
        name: String,

        /// Set the custom domain
        #[arg(long, conflicts_with = "clear")]
        set: Option<String>,

        /// Remove the custom domain
        #[arg(long)]
        clear: bool,
    },

    /// List sites and the URLs they are served under
    List,
}
