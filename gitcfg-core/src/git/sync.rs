//! Repository synchronization
//!
//! Brings whatever is at a clone path into a clean working tree checked out
//! at the requested reference:
//!
//! 1. Clone, or open the repository already at the path
//! 2. Fetch every branch and tag from origin, forcing tracking refs
//! 3. Hard-reset and clean the working tree
//! 4. Check out the reference
//! 5. Pull the reference so the tree is at the freshly fetched tip
//!
//! Each call converges from any prior state, including one left behind by an
//! interrupted run or manual edits. Callers must not synchronize the same path
//! from two places at once.

use std::path::PathBuf;

use git2::build::RepoBuilder;
use git2::{ErrorCode, Oid};

use super::remote::{self, TransferOutcome, FETCH_ALL_REFSPECS};
use super::repo::GitRepo;
use super::worktree::{self, Target};
use crate::config::{Reference, SyncOptions};
use crate::{Error, Result};

/// Outcome of a successful synchronization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Root of the synchronized working tree
    pub root: PathBuf,
    /// Reference that was checked out
    pub reference: Reference,
    /// Commit the working tree now matches
    pub commit: Oid,
    /// Branch HEAD is attached to, if the reference named a branch
    pub branch: Option<String>,
    /// Whether this call created the clone
    pub cloned: bool,
    /// What the fetch step changed
    pub fetch: TransferOutcome,
    /// What the pull step changed
    pub pull: TransferOutcome,
}

/// Synchronize and return the working tree root
pub fn synchronize(options: &SyncOptions) -> Result<PathBuf> {
    synchronize_with_report(options).map(|report| report.root)
}

/// Synchronize and report what each step did
pub fn synchronize_with_report(options: &SyncOptions) -> Result<SyncReport> {
    let path = &options.local_path;
    if path.exists() && !path.is_dir() {
        return Err(Error::OccupiedInvalidPath {
            path: path.clone(),
            reason: "not a directory".to_string(),
        });
    }
    std::fs::create_dir_all(path)?;

    let (repo, cloned) = clone_or_open(options)?;
    let inner = repo.inner();

    remote::ensure_origin(inner, &options.remote_url).map_err(|source| Error::FetchFailed {
        url: options.remote_url.clone(),
        source,
    })?;

    tracing::debug!(url = %options.remote_url, "Fetching");
    let fetch = remote::fetch(inner, &FETCH_ALL_REFSPECS).map_err(|source| {
        Error::FetchFailed {
            url: options.remote_url.clone(),
            source,
        }
    })?;
    tracing::info!(url = %options.remote_url, outcome = %fetch, "Fetched");

    worktree::reset_hard(inner)?;
    let removed = worktree::clean(inner, repo.root())?;
    if removed > 0 {
        tracing::info!(removed, "Removed untracked entries");
    }

    let target = worktree::resolve_target(inner, &options.reference)?;
    tracing::debug!(reference = %options.reference, target = ?target, "Checking out");
    worktree::checkout(inner, &target)?;

    let pull = worktree::pull(inner, &target).map_err(|source| Error::PullFailed {
        reference: options.reference.to_string(),
        source,
    })?;
    tracing::info!(reference = %options.reference, outcome = %pull, "Pulled");

    let commit = repo.head_commit()?.ok_or_else(|| Error::UnresolvableReference {
        reference: options.reference.to_string(),
        source: None,
    })?;
    let branch = match target {
        Target::Branch { name, .. } => Some(name),
        Target::Detached { .. } => None,
    };

    tracing::info!(
        path = %repo.root().display(),
        commit = %commit,
        "Synchronized"
    );

    Ok(SyncReport {
        root: repo.root().to_path_buf(),
        reference: options.reference.clone(),
        commit,
        branch,
        cloned,
        fetch,
        pull,
    })
}

/// Clone into the path, falling back to the repository already there
fn clone_or_open(options: &SyncOptions) -> Result<(GitRepo, bool)> {
    let path = &options.local_path;
    tracing::info!(url = %options.remote_url, dir = %path.display(), "Cloning");

    let mut builder = RepoBuilder::new();
    builder.fetch_options(remote::fetch_options());

    match builder.clone(&options.remote_url, path) {
        Ok(repo) => Ok((GitRepo::from_repository(repo, path)?, true)),
        Err(e) if e.code() == ErrorCode::Exists => {
            tracing::debug!(dir = %path.display(), "Path is occupied, opening existing repository");
            Ok((GitRepo::open(path)?, false))
        }
        Err(source) => Err(Error::CloneFailed {
            url: options.remote_url.clone(),
            source,
        }),
    }
}
