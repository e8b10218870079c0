//! Git operations for gitcfg
//!
//! This module provides clone path inspection and the synchronizer that keeps a
//! local clone converged on a remote reference.

mod remote;
mod repo;
mod sync;
mod worktree;

pub use remote::{TransferOutcome, REMOTE_NAME};
pub use repo::{inspect, GitRepo, RepoState};
pub use sync::{synchronize, synchronize_with_report, SyncReport};
pub use worktree::{resolve_target, Target};
