//! Remote access: credentials, fetch options and transfer outcomes

use std::collections::BTreeMap;

use git2::{
    AutotagOption, Cred, CredentialType, FetchOptions, FetchPrune, Oid, RemoteCallbacks,
    Repository,
};

/// Name of the remote every synchronized repository tracks
pub const REMOTE_NAME: &str = "origin";

/// Refspecs for a full forced fetch of branches and tags
pub(crate) const FETCH_ALL_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Result of a network transfer that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Nothing changed locally
    UpToDate,
    /// This many refs were created, moved or pruned
    Updated { refs: usize },
}

impl std::fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferOutcome::UpToDate => f.write_str("already up to date"),
            TransferOutcome::Updated { refs } => write!(f, "updated {} ref(s)", refs),
        }
    }
}

/// Callbacks that authenticate via ssh-agent, then credential helpers, then defaults
pub(crate) fn remote_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut attempts = 0;
    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("no accepted credentials for remote"));
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            if let Some(user) = username_from_url {
                return Cred::ssh_key_from_agent(user);
            }
        }

        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Ok(config) = git2::Config::open_default() {
                if let Ok(cred) = Cred::credential_helper(&config, url, username_from_url) {
                    return Ok(cred);
                }
            }
        }

        Cred::default()
    });
    callbacks.transfer_progress(|_| true);

    callbacks
}

/// Fetch options shared by clone, fetch and pull
pub(crate) fn fetch_options<'a>() -> FetchOptions<'a> {
    let mut options = FetchOptions::new();
    options.remote_callbacks(remote_callbacks());
    options.download_tags(AutotagOption::All);
    options.prune(FetchPrune::On);
    options
}

/// Fetch `refspecs` from origin and report whether any local ref changed
pub(crate) fn fetch(
    repo: &Repository,
    refspecs: &[&str],
) -> std::result::Result<TransferOutcome, git2::Error> {
    let before = snapshot(repo)?;

    let mut remote = repo.find_remote(REMOTE_NAME)?;
    let mut options = fetch_options();
    remote.fetch(refspecs, Some(&mut options), None)?;

    let after = snapshot(repo)?;
    Ok(compare(&before, &after))
}

/// Make origin point at `url`, creating or repointing it as needed
pub(crate) fn ensure_origin(repo: &Repository, url: &str) -> std::result::Result<(), git2::Error> {
    match repo.find_remote(REMOTE_NAME) {
        Ok(remote) if remote.url() == Some(url) => Ok(()),
        Ok(remote) => {
            tracing::warn!(
                previous = remote.url().unwrap_or("<non-utf8>"),
                url,
                "Repointing origin at configured url"
            );
            repo.remote_set_url(REMOTE_NAME, url)
        }
        Err(e) if e.code() == git2::ErrorCode::NotFound => {
            tracing::warn!(url, "Repository has no origin, adding it");
            repo.remote(REMOTE_NAME, url).map(|_| ())
        }
        Err(e) => Err(e),
    }
}

fn snapshot(repo: &Repository) -> std::result::Result<BTreeMap<String, Oid>, git2::Error> {
    let mut refs = BTreeMap::new();

    for glob in ["refs/remotes/origin/*", "refs/tags/*"] {
        for reference in repo.references_glob(glob)? {
            let reference = reference?;
            if let (Some(name), Some(target)) = (reference.name(), reference.target()) {
                refs.insert(name.to_string(), target);
            }
        }
    }

    Ok(refs)
}

fn compare(before: &BTreeMap<String, Oid>, after: &BTreeMap<String, Oid>) -> TransferOutcome {
    let changed = after
        .iter()
        .filter(|(name, oid)| before.get(*name) != Some(*oid))
        .count();
    let pruned = before.keys().filter(|name| !after.contains_key(*name)).count();

    match changed + pruned {
        0 => TransferOutcome::UpToDate,
        refs => TransferOutcome::Updated { refs },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn oid(byte: u8) -> Oid {
        Oid::from_bytes(&[byte; 20]).unwrap()
    }

    #[test]
    fn test_compare_counts_changes() {
        let mut before = BTreeMap::new();
        before.insert("refs/remotes/origin/main".to_string(), oid(1));
        before.insert("refs/remotes/origin/old".to_string(), oid(2));

        assert_eq!(compare(&before, &before.clone()), TransferOutcome::UpToDate);

        let mut after = before.clone();
        after.insert("refs/remotes/origin/main".to_string(), oid(3));
        after.remove("refs/remotes/origin/old");
        after.insert("refs/tags/v1".to_string(), oid(4));

        assert_eq!(
            compare(&before, &after),
            TransferOutcome::Updated { refs: 3 }
        );
    }

    #[test]
    fn test_ensure_origin() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        ensure_origin(&repo, "https://example.test/a.git").unwrap();
        assert_eq!(
            repo.find_remote(REMOTE_NAME).unwrap().url(),
            Some("https://example.test/a.git")
        );

        ensure_origin(&repo, "https://example.test/b.git").unwrap();
        assert_eq!(
            repo.find_remote(REMOTE_NAME).unwrap().url(),
            Some("https://example.test/b.git")
        );
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(TransferOutcome::UpToDate.to_string(), "already up to date");
        assert_eq!(
            TransferOutcome::Updated { refs: 2 }.to_string(),
            "updated 2 ref(s)"
        );
    }
}
