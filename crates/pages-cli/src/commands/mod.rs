//! Command implementations for pages-cli

pub mod auth;
pub mod db;
pub mod site;

pub use auth::{run_login, run_logout};
pub use db::{run_pull, run_push};
pub use site::{run_cname, run_deploy, run_list, run_new, run_server};
