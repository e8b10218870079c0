//! Working tree mutation: reset, clean and checkout

use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, Oid, Repository, ResetType, Status, StatusOptions};

use super::remote::{self, TransferOutcome, REMOTE_NAME};
use crate::config::Reference;
use crate::{Error, Result};

/// What a reference resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A branch, checked out as an attached local branch tracking origin
    Branch { name: String, tip: Oid },
    /// A tag, full ref or revision expression, checked out as a detached HEAD
    Detached { oid: Oid },
}

impl Target {
    /// The commit this target points at
    pub fn commit(&self) -> Oid {
        match self {
            Target::Branch { tip, .. } => *tip,
            Target::Detached { oid } => *oid,
        }
    }
}

/// Hard-reset the working tree and index to the commit HEAD points at
///
/// An unborn HEAD has nothing to reset to and is left alone.
pub(crate) fn reset_hard(repo: &Repository) -> Result<()> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(e) if e.code() == ErrorCode::UnbornBranch => return Ok(()),
        Err(e) => {
            return Err(Error::Git {
                operation: "reset",
                source: e,
            })
        }
    };

    let commit = head.peel_to_commit().map_err(Error::git("reset"))?;
    repo.reset(commit.as_object(), ResetType::Hard, None)
        .map_err(Error::git("reset"))
}

/// Remove untracked files and directories, leaving ignored files in place
///
/// Returns the number of entries removed.
pub(crate) fn clean(repo: &Repository, root: &Path) -> Result<usize> {
    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(false)
        .include_ignored(false);

    let statuses = repo
        .statuses(Some(&mut options))
        .map_err(Error::git("clean"))?;

    let mut removed = 0;
    for entry in statuses.iter() {
        if !entry.status().contains(Status::WT_NEW) {
            continue;
        }
        let Some(relative) = entry.path() else {
            tracing::warn!("Skipping untracked entry with non-utf8 path");
            continue;
        };

        let path = root.join(relative.trim_end_matches('/'));
        let metadata = std::fs::symlink_metadata(&path)?;
        if metadata.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }

        tracing::debug!(path = relative, "Removed untracked entry");
        removed += 1;
    }

    Ok(removed)
}

/// Resolve a reference against the repository
///
/// Priority:
/// 1. Remote branch `origin/<ref>`
/// 2. Local branch `<ref>`
/// 3. Tag `<ref>`
/// 4. Full ref name (e.g. `refs/notes/x`)
/// 5. Revision expression (e.g. a commit id or `main~2`)
pub fn resolve_target(repo: &Repository, reference: &Reference) -> Result<Target> {
    let name = reference.as_str();
    let branch = name.strip_prefix("refs/heads/").unwrap_or(name);
    let unresolvable = |source: Option<git2::Error>| Error::UnresolvableReference {
        reference: name.to_string(),
        source,
    };

    for candidate in [
        format!("refs/remotes/{}/{}", REMOTE_NAME, branch),
        format!("refs/heads/{}", branch),
    ] {
        // origin/HEAD is symbolic and never a branch
        let found = match repo.find_reference(&candidate) {
            Ok(found) if found.symbolic_target().is_none() => found,
            _ => continue,
        };
        let commit = found.peel_to_commit().map_err(|e| unresolvable(Some(e)))?;
        return Ok(Target::Branch {
            name: branch.to_string(),
            tip: commit.id(),
        });
    }

    let full_name = if name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("refs/tags/{}", name)
    };
    if let Ok(found) = repo.find_reference(&full_name) {
        let commit = found.peel_to_commit().map_err(|e| unresolvable(Some(e)))?;
        return Ok(Target::Detached { oid: commit.id() });
    }

    let object = repo
        .revparse_single(name)
        .map_err(|e| unresolvable(Some(e)))?;
    let commit = object.peel_to_commit().map_err(|e| unresolvable(Some(e)))?;

    Ok(Target::Detached { oid: commit.id() })
}

/// Check out `target`, forcing the working tree to match it
pub(crate) fn checkout(repo: &Repository, target: &Target) -> Result<()> {
    let commit = repo
        .find_commit(target.commit())
        .map_err(Error::git("checkout"))?;

    let mut builder = CheckoutBuilder::new();
    builder.force();
    repo.checkout_tree(commit.as_object(), Some(&mut builder))
        .map_err(Error::git("checkout"))?;

    match target {
        Target::Branch { name, tip } => {
            let refname = format!("refs/heads/{}", name);
            repo.reference(&refname, *tip, true, "gitcfg: checkout")
                .map_err(Error::git("checkout"))?;
            repo.set_head(&refname).map_err(Error::git("checkout"))?;
            set_upstream(repo, name);
        }
        Target::Detached { oid } => {
            repo.set_head_detached(*oid)
                .map_err(Error::git("checkout"))?;
        }
    }

    Ok(())
}

/// Bring a checked-out branch to the tip of its remote counterpart
///
/// Detached targets have nothing to pull.
pub(crate) fn pull(
    repo: &Repository,
    target: &Target,
) -> std::result::Result<TransferOutcome, git2::Error> {
    let Target::Branch { name, .. } = target else {
        return Ok(TransferOutcome::UpToDate);
    };

    let local = format!("refs/heads/{}", name);
    let tracking = format!("refs/remotes/{}/{}", REMOTE_NAME, name);
    let refspec = format!("+{}:{}", local, tracking);

    remote::fetch(repo, &[refspec.as_str()])?;

    let before = repo.refname_to_id(&local)?;
    let tip = repo.find_reference(&tracking)?.peel_to_commit()?;
    if tip.id() == before {
        return Ok(TransferOutcome::UpToDate);
    }

    let mut builder = CheckoutBuilder::new();
    builder.force();
    repo.checkout_tree(tip.as_object(), Some(&mut builder))?;
    repo.reference(&local, tip.id(), true, "gitcfg: pull")?;

    Ok(TransferOutcome::Updated { refs: 1 })
}

fn set_upstream(repo: &Repository, name: &str) {
    let upstream = format!("{}/{}", REMOTE_NAME, name);
    let result = repo
        .find_branch(name, BranchType::Local)
        .and_then(|mut branch| branch.set_upstream(Some(upstream.as_str())));

    if let Err(e) = result {
        tracing::debug!(branch = name, error = %e, "Not tracking upstream");
    }
}
