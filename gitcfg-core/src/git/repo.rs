//! Local repository detection and access

use std::path::{Path, PathBuf};

use git2::{Oid, Repository};

use crate::{Error, Result};

/// What occupies a clone path on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoState {
    /// The path does not exist or is an empty directory
    Absent,
    /// The path holds a repository with a working tree
    ValidRepo,
    /// The path is non-empty and is not a usable repository
    InvalidOccupied,
}

impl std::fmt::Display for RepoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RepoState::Absent => "absent",
            RepoState::ValidRepo => "valid repository",
            RepoState::InvalidOccupied => "occupied by something that is not a repository",
        };
        f.write_str(name)
    }
}

/// Classify what is at `path` without modifying it
pub fn inspect(path: impl AsRef<Path>) -> RepoState {
    let path = path.as_ref();

    match std::fs::read_dir(path) {
        Ok(mut entries) => {
            if entries.next().is_none() {
                return RepoState::Absent;
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return RepoState::Absent,
        Err(_) => return RepoState::InvalidOccupied,
    }

    match Repository::open(path) {
        Ok(repo) if !repo.is_bare() => RepoState::ValidRepo,
        _ => RepoState::InvalidOccupied,
    }
}

/// A repository with a working tree, opened at an exact path
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the working tree root
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the repository at exactly `path`
    ///
    /// Unlike discovery, this never walks up into an enclosing repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::open(path).map_err(|e| Error::OccupiedInvalidPath {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;

        Self::from_repository(repo, path)
    }

    /// Wrap an already opened repository
    pub(crate) fn from_repository(repo: Repository, path: &Path) -> Result<Self> {
        let root = repo
            .workdir()
            .ok_or_else(|| Error::OccupiedInvalidPath {
                path: path.to_path_buf(),
                reason: "bare repositories have no working tree".to_string(),
            })?
            .to_path_buf();

        Ok(Self { repo, root })
    }

    /// Get the working tree root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the commit HEAD points at, or `None` on an unborn branch
    pub fn head_commit(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit().map_err(Error::git("read HEAD"))?;
                Ok(Some(commit.id()))
            }
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(None),
            Err(e) => Err(Error::Git {
                operation: "read HEAD",
                source: e,
            }),
        }
    }

    /// Get the current branch name, or `None` when HEAD is detached or unborn
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => {
                return Err(Error::Git {
                    operation: "read HEAD",
                    source: e,
                })
            }
        };

        if head.is_branch() {
            Ok(head.shorthand().map(|s| s.to_string()))
        } else {
            Ok(None)
        }
    }

    /// Get access to the underlying git2 repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inspect_absent() {
        let temp = TempDir::new().unwrap();
        assert_eq!(inspect(temp.path().join("missing")), RepoState::Absent);
        assert_eq!(inspect(temp.path()), RepoState::Absent);
    }

    #[test]
    fn test_inspect_occupied() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("notes.txt"), "hello").unwrap();
        assert_eq!(inspect(temp.path()), RepoState::InvalidOccupied);

        let file = temp.path().join("notes.txt");
        assert_eq!(inspect(file), RepoState::InvalidOccupied);
    }

    #[test]
    fn test_inspect_valid_and_bare() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        Repository::init(&work).unwrap();
        assert_eq!(inspect(&work), RepoState::ValidRepo);

        let bare = temp.path().join("bare.git");
        Repository::init_bare(&bare).unwrap();
        assert_eq!(inspect(&bare), RepoState::InvalidOccupied);
    }

    #[test]
    fn test_open_does_not_walk_up() {
        let temp = TempDir::new().unwrap();
        Repository::init(temp.path()).unwrap();
        let nested = temp.path().join("nested");
        std::fs::create_dir(&nested).unwrap();

        let result = GitRepo::open(&nested);
        assert!(matches!(result, Err(Error::OccupiedInvalidPath { .. })));
    }

    #[test]
    fn test_open_unborn() {
        let temp = TempDir::new().unwrap();
        Repository::init(temp.path()).unwrap();

        let repo = GitRepo::open(temp.path()).unwrap();
        assert!(repo.head_commit().unwrap().is_none());
        assert!(repo.current_branch().unwrap().is_none());
    }
}
