//! Adapter input decoding and option resolution
//!
//! The adapter body is a small document naming the remote to load from:
//!
//! ```yaml
//! url: https://github.com/acme/edge-config.git
//! ref: main            # `branch` is accepted as an alias
//! clone_path: /var/lib/gitcfg/edge
//! caddyfile: sites/Caddyfile
//! ```
//!
//! JSON is accepted as well. Only `url` is required; everything else is
//! filled in from [`ResolveDefaults`]. Keys other than these are ignored.
//!
//! An explicit `clone_path` is the clone directory itself. It is not joined
//! with the remote's host and path; only the default clone path is namespaced.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Reference checked out when the input does not name one
pub const DEFAULT_REFERENCE: &str = "master";

/// Entry file handed to the loader when the input does not name one
pub const DEFAULT_ENTRY_FILE: &str = "Caddyfile";

/// A validated reference name: a branch, tag, full ref, or revision expression
///
/// Validation is structural only. Whether the reference actually names a
/// revision is decided against the repository at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    /// Parse a reference from user input
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(Error::MalformedInput("reference is empty".to_string()));
        }

        if input.starts_with('-') {
            return Err(Error::MalformedInput(format!(
                "reference '{}' may not start with '-'",
                input
            )));
        }

        if input.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::MalformedInput(format!(
                "reference '{}' contains whitespace or control characters",
                input
            )));
        }

        Ok(Self(input.to_string()))
    }

    /// Get the reference as written
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully resolved options for one synchronization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOptions {
    /// URL (or local path) of the remote repository
    pub remote_url: String,
    /// Reference to check out
    pub reference: Reference,
    /// Directory the repository is cloned into
    pub local_path: PathBuf,
    /// Path of the entry file, relative to `local_path`
    pub entry_file: PathBuf,
}

impl SyncOptions {
    /// Full path of the entry file inside the synchronized tree
    pub fn entry_path(&self) -> PathBuf {
        self.local_path.join(&self.entry_file)
    }
}

/// Defaults applied to fields the adapter input leaves unset
///
/// Built once by the host at startup and passed to every [`resolve`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveDefaults {
    /// Root directory for clones without an explicit `clone_path`
    pub temp_root: PathBuf,
    /// Reference used when `ref` is unset
    pub reference: String,
    /// Entry file used when `caddyfile` is unset
    pub entry_file: String,
    /// Whether default clone paths are namespaced by the remote's host and path
    pub namespace: bool,
}

impl ResolveDefaults {
    /// Defaults rooted at the given directory
    pub fn new(temp_root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: temp_root.into(),
            reference: DEFAULT_REFERENCE.to_string(),
            entry_file: DEFAULT_ENTRY_FILE.to_string(),
            namespace: true,
        }
    }
}

impl Default for ResolveDefaults {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

/// Raw adapter input as decoded, before defaults
#[derive(Debug, Default, Deserialize)]
struct AdapterInput {
    url: Option<String>,
    #[serde(rename = "ref", alias = "branch")]
    reference: Option<String>,
    clone_path: Option<String>,
    caddyfile: Option<String>,
}

/// Decode adapter input and fill in defaults
pub fn resolve(raw: &[u8], defaults: &ResolveDefaults) -> Result<SyncOptions> {
    let input = decode(raw)?;

    let remote_url = non_blank(input.url).ok_or(Error::MissingRequiredField("url"))?;

    let reference = match non_blank(input.reference) {
        Some(reference) => Reference::parse(&reference)?,
        None => Reference::parse(&defaults.reference)?,
    };

    let local_path = match non_blank(input.clone_path) {
        Some(path) => PathBuf::from(path),
        None if defaults.namespace => defaults.temp_root.join(remote_namespace(&remote_url)?),
        None => defaults.temp_root.clone(),
    };

    let entry_file = non_blank(input.caddyfile).unwrap_or_else(|| defaults.entry_file.clone());
    let entry_file = validate_entry_file(&entry_file)?;

    tracing::debug!(
        url = %remote_url,
        reference = %reference,
        path = %local_path.display(),
        entry = %entry_file.display(),
        "Resolved adapter options"
    );

    Ok(SyncOptions {
        remote_url,
        reference,
        local_path,
        entry_file,
    })
}

fn decode(raw: &[u8]) -> Result<AdapterInput> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(AdapterInput::default());
    }

    match serde_json::from_slice(raw) {
        Ok(input) => Ok(input),
        // YAML is a superset of JSON, so its error is the more useful one
        Err(_) => serde_yaml::from_slice(raw).map_err(|e| Error::MalformedInput(e.to_string())),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_entry_file(entry: &str) -> Result<PathBuf> {
    let path = Path::new(entry);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes {
        return Err(Error::MalformedInput(format!(
            "entry file '{}' must be a relative path inside the repository",
            entry
        )));
    }

    Ok(path.to_path_buf())
}

/// Derive a `<host>/<path>` directory for a remote URL
///
/// Supports:
/// - `https://host/owner/repo.git` and other `scheme://` URLs
/// - `git@host:owner/repo.git`
/// - local paths and `file://` URLs, placed under `local/`
pub fn remote_namespace(remote_url: &str) -> Result<PathBuf> {
    let (host, path) = if remote_url.contains("://") {
        let url = url::Url::parse(remote_url)
            .map_err(|e| Error::MalformedInput(format!("Invalid url '{}': {}", remote_url, e)))?;

        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) if url.scheme() != "file" => format!("{}-{}", host, port),
            (Some(host), None) if url.scheme() != "file" && !host.is_empty() => host.to_string(),
            _ => "local".to_string(),
        };
        (host, url.path().to_string())
    } else if let Some((host, path)) = scp_like(remote_url) {
        (host.to_string(), path.to_string())
    } else {
        ("local".to_string(), remote_url.to_string())
    };

    let mut namespace = PathBuf::from(host);
    for segment in path.split(['/', '\\']) {
        if !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(':') {
            namespace.push(segment);
        }
    }

    Ok(namespace)
}

/// Split `user@host:path` into host and path
fn scp_like(remote_url: &str) -> Option<(&str, &str)> {
    let (authority, path) = remote_url.split_once(':')?;
    if authority.contains('/') || authority.is_empty() {
        return None;
    }
    // Windows drive letters (C:\...) are local paths
    if authority.len() == 1 {
        return None;
    }
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    Some((host, path))
}
