//! The git config adapter: resolve, synchronize, then load the entry file

use crate::config::{self, ResolveDefaults, SyncOptions};
use crate::git::{self, SyncReport};
use crate::loader::{ConfigLoader, ENTRY_FORMAT};
use crate::{Error, Result};

/// A non-fatal note produced while adapting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
}

/// Native configuration produced by one adapter run
#[derive(Debug, Clone)]
pub struct Adapted {
    /// Bytes returned by the loader
    pub config: Vec<u8>,
    /// Always empty; kept for hosts that expect a warnings list
    pub warnings: Vec<Warning>,
    /// What the synchronizer did
    pub report: SyncReport,
}

/// Sources configuration from a git repository
#[derive(Debug, Clone)]
pub struct GitAdapter<L> {
    defaults: ResolveDefaults,
    loader: L,
}

impl<L: ConfigLoader> GitAdapter<L> {
    /// Create an adapter with resolved defaults and a downstream loader
    pub fn new(defaults: ResolveDefaults, loader: L) -> Self {
        Self { defaults, loader }
    }

    /// Defaults applied to adapter input
    pub fn defaults(&self) -> &ResolveDefaults {
        &self.defaults
    }

    /// Resolve adapter input without touching the filesystem
    pub fn resolve(&self, body: &[u8]) -> Result<SyncOptions> {
        config::resolve(body, &self.defaults)
    }

    /// Run the full adapter: decode `body`, synchronize, and load the entry file
    pub fn adapt(&self, body: &[u8]) -> Result<Adapted> {
        let options = self.resolve(body)?;
        self.adapt_options(&options)
    }

    /// Synchronize already resolved options and load the entry file
    pub fn adapt_options(&self, options: &SyncOptions) -> Result<Adapted> {
        let report = git::synchronize_with_report(options)?;
        let entry = report.root.join(&options.entry_file);

        if !entry.is_file() {
            return Err(Error::DownstreamLoadFailed {
                path: entry,
                reason: format!("entry file not found at {}", options.reference),
            });
        }

        tracing::info!(entry = %entry.display(), format = ENTRY_FORMAT, "Loading entry file");
        let config = self.loader.load(&entry, ENTRY_FORMAT)?;

        Ok(Adapted {
            config,
            warnings: Vec::new(),
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use super::*;
    use crate::loader::FileLoader;
    use crate::testing::{commit_file, init_repo, url_of};

    /// Records what it was asked to load
    #[derive(Default)]
    struct RecordingLoader {
        calls: RefCell<Vec<(PathBuf, String)>>,
    }

    impl ConfigLoader for RecordingLoader {
        fn load(&self, path: &Path, format: &str) -> Result<Vec<u8>> {
            self.calls
                .borrow_mut()
                .push((path.to_path_buf(), format.to_string()));
            Ok(b"{\"apps\":{}}".to_vec())
        }
    }

    fn upstream() -> (TempDir, String) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("upstream");
        let repo = init_repo(&path);
        commit_file(&repo, "Caddyfile", ":80\n", "root config");
        commit_file(&repo, "sites/Caddyfile", ":8080\n", "site config");
        (temp, url_of(&path))
    }

    #[test]
    fn test_adapt_with_file_loader() {
        let (temp, url) = upstream();
        let adapter = GitAdapter::new(ResolveDefaults::new(temp.path().join("clones")), FileLoader);

        let body = format!(r#"{{"url": "{}"}}"#, url);
        let adapted = adapter.adapt(body.as_bytes()).unwrap();

        assert_eq!(adapted.config, b":80\n");
        assert!(adapted.warnings.is_empty());
        assert!(adapted.report.root.starts_with(temp.path().join("clones")));
    }

    #[test]
    fn test_adapt_passes_entry_path_and_format() {
        let (temp, url) = upstream();
        let loader = RecordingLoader::default();
        let adapter = GitAdapter::new(ResolveDefaults::new(temp.path()), &loader);

        let clone_path = temp.path().join("explicit");
        let body = format!(
            "url: {}\nclone_path: {}\ncaddyfile: sites/Caddyfile\n",
            url,
            clone_path.display()
        );
        let adapted = adapter.adapt(body.as_bytes()).unwrap();
        assert_eq!(adapted.config, b"{\"apps\":{}}");

        let calls = loader.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.ends_with("sites/Caddyfile"));
        assert_eq!(calls[0].1, ENTRY_FORMAT);
    }

    #[test]
    fn test_missing_entry_file() {
        let (temp, url) = upstream();
        let adapter = GitAdapter::new(ResolveDefaults::new(temp.path().join("clones")), FileLoader);

        let body = format!(r#"{{"url": "{}", "caddyfile": "nope/Caddyfile"}}"#, url);
        let result = adapter.adapt(body.as_bytes());
        assert!(matches!(result, Err(Error::DownstreamLoadFailed { .. })));
    }

    #[test]
    fn test_missing_url_is_reported() {
        let temp = TempDir::new().unwrap();
        let adapter = GitAdapter::new(ResolveDefaults::new(temp.path()), FileLoader);

        let result = adapter.adapt(b"{}");
        assert!(matches!(result, Err(Error::MissingRequiredField("url"))));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
