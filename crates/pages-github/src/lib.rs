//! GitHub REST client for Pages Manager
//!
//! Exposes the hosting-provider capability set the engine consumes:
//! authenticated-user lookup, repository list/create/delete, Pages
//! activation, HTTPS enforcement, and token revocation. The
//! [`HostingProvider`] trait is the seam; [`GitHubClient`] is the real
//! binding over blocking HTTP.

pub mod client;
pub mod error;
pub mod provider;

pub use client::GitHubClient;
pub use error::{Error, Result};
pub use provider::{HostingProvider, RepoInfo};
