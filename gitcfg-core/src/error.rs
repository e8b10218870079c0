//! Error types for gitcfg

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for gitcfg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for gitcfg operations
#[derive(Error, Debug)]
pub enum Error {
    /// The adapter input could not be decoded
    #[error("Malformed adapter input: {0}")]
    MalformedInput(String),

    /// A required field was empty or absent after decoding
    #[error("Missing required field '{0}'")]
    MissingRequiredField(&'static str),

    /// The clone path exists, is non-empty, and is not a usable repository
    #[error("{} already exists and is not a git repository: {reason}", path.display())]
    OccupiedInvalidPath { path: PathBuf, reason: String },

    /// Cloning the remote failed
    #[error("Failed to clone {url}: {source}")]
    CloneFailed {
        url: String,
        #[source]
        source: git2::Error,
    },

    /// Fetching from the remote failed
    #[error("Failed to fetch from {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: git2::Error,
    },

    /// The requested reference does not name a revision
    #[error("Reference '{reference}' does not resolve to a revision")]
    UnresolvableReference {
        reference: String,
        #[source]
        source: Option<git2::Error>,
    },

    /// Pulling the requested reference failed
    #[error("Failed to pull '{reference}': {source}")]
    PullFailed {
        reference: String,
        #[source]
        source: git2::Error,
    },

    /// The downstream configuration loader rejected the entry file
    #[error("Failed to load {}: {reason}", path.display())]
    DownstreamLoadFailed { path: PathBuf, reason: String },

    /// A local repository operation (reset, clean, checkout) failed
    #[error("Git error during {operation}: {source}")]
    Git {
        operation: &'static str,
        #[source]
        source: git2::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Host configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Category of an [`Error`], for callers that branch on the failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedInput,
    MissingRequiredField,
    OccupiedInvalidPath,
    CloneFailed,
    FetchFailed,
    UnresolvableReference,
    PullFailed,
    DownstreamLoadFailed,
    Git,
    Io,
    Config,
}

impl Error {
    /// Get the category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedInput(_) => ErrorKind::MalformedInput,
            Error::MissingRequiredField(_) => ErrorKind::MissingRequiredField,
            Error::OccupiedInvalidPath { .. } => ErrorKind::OccupiedInvalidPath,
            Error::CloneFailed { .. } => ErrorKind::CloneFailed,
            Error::FetchFailed { .. } => ErrorKind::FetchFailed,
            Error::UnresolvableReference { .. } => ErrorKind::UnresolvableReference,
            Error::PullFailed { .. } => ErrorKind::PullFailed,
            Error::DownstreamLoadFailed { .. } => ErrorKind::DownstreamLoadFailed,
            Error::Git { .. } => ErrorKind::Git,
            Error::Io(_) => ErrorKind::Io,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn git(operation: &'static str) -> impl FnOnce(git2::Error) -> Self {
        move |source| Error::Git { operation, source }
    }
}
