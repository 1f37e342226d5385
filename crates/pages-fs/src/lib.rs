//! Filesystem abstraction for Pages Manager
//!
//! Provides normalized path handling, atomic locked I/O, config-document
//! loading, and the on-disk layout of the manager's home directory.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod layout;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use layout::HomeLayout;
pub use path::NormalizedPath;
