//! gitcfg Core - Source configuration from a git repository
//!
//! This crate keeps a local clone converged on a remote reference and hands
//! an entry file from it to a downstream configuration loader.

pub mod adapter;
pub mod config;
pub mod error;
pub mod git;
pub mod loader;
pub mod settings;

#[cfg(test)]
mod testing;

pub use adapter::{Adapted, GitAdapter, Warning};
pub use config::{resolve, Reference, ResolveDefaults, SyncOptions};
pub use error::{Error, ErrorKind, Result};
pub use git::{inspect, synchronize, synchronize_with_report, RepoState, SyncReport, TransferOutcome};
pub use loader::{CommandLoader, ConfigLoader, FileLoader, ENTRY_FORMAT};
pub use settings::Settings;
