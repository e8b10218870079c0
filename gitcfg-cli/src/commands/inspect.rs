//! Inspect command

use std::path::PathBuf;

use clap::Args;
use gitcfg_core::git::GitRepo;
use gitcfg_core::{inspect, RepoState};

/// Show what occupies a clone path
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Clone path to inspect
    pub path: PathBuf,
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self) {
        let state = inspect(&self.path);
        println!("{}: {}", self.path.display(), state);

        if state != RepoState::ValidRepo {
            return;
        }

        match GitRepo::open(&self.path) {
            Ok(repo) => {
                if let Ok(Some(branch)) = repo.current_branch() {
                    println!("  Branch: {}", branch);
                }
                if let Ok(Some(commit)) = repo.head_commit() {
                    println!("  Commit: {}", commit);
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not open repository"),
        }
    }
}
