//! Pages Manager CLI
//!
//! The command-line interface for publishing generated static sites to
//! GitHub Pages from a single private database repository.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Pages Manager CLI", "pages".green().bold());
            println!();
            println!("Run {} for available commands.", "pages --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Login { token } => commands::run_login(&token),
        Commands::Logout { yes } => commands::run_logout(yes),
        Commands::Pull => commands::run_pull(),
        Commands::Push => commands::run_push(),
        Commands::New { name } => commands::run_new(&name),
        Commands::Deploy { name, all } => commands::run_deploy(name.as_deref(), all),
        Commands::Server { name } => commands::run_server(&name),
        Commands::Cname { name, set, clear } => commands::run_cname(&name, set.as_deref(), clear),
        Commands::List => commands::run_list(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_deploy_rejects_name_with_all() {
        let result = Cli::try_parse_from(["pages", "deploy", "blog", "--all"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cname_set_and_clear_conflict() {
        let result = Cli::try_parse_from(["pages", "cname", "blog", "--set", "x.com", "--clear"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }
}
