//! Downstream configuration loaders
//!
//! A loader turns the entry file of a synchronized tree into the host's
//! native configuration bytes.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Format identifier passed to loaders for the entry file
pub const ENTRY_FORMAT: &str = "caddyfile";

/// Loads a configuration file given its format name
pub trait ConfigLoader {
    /// Load the file at `path`, interpreting it as `format`
    fn load(&self, path: &Path, format: &str) -> Result<Vec<u8>>;
}

impl<L: ConfigLoader + ?Sized> ConfigLoader for &L {
    fn load(&self, path: &Path, format: &str) -> Result<Vec<u8>> {
        (**self).load(path, format)
    }
}

impl<L: ConfigLoader + ?Sized> ConfigLoader for Box<L> {
    fn load(&self, path: &Path, format: &str) -> Result<Vec<u8>> {
        (**self).load(path, format)
    }
}

/// Returns the entry file bytes unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl ConfigLoader for FileLoader {
    fn load(&self, path: &Path, _format: &str) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| Error::DownstreamLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Runs an external interpreter and returns its stdout
///
/// Invoked as `<program> [args...] adapt --config <path> --adapter <format>`.
#[derive(Debug, Clone)]
pub struct CommandLoader {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLoader {
    /// Loader for the given program
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Parse a command line such as `caddy --envfile .env`
    ///
    /// Arguments are split on whitespace; quoting is not supported.
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| Error::Config("Loader command is empty".to_string()))?;

        Ok(Self {
            program: PathBuf::from(program),
            args: parts.map(str::to_string).collect(),
        })
    }

    /// The program this loader runs
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ConfigLoader for CommandLoader {
    fn load(&self, path: &Path, format: &str) -> Result<Vec<u8>> {
        let failed = |reason: String| Error::DownstreamLoadFailed {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(failed("entry file does not exist".to_string()));
        }

        tracing::debug!(
            program = %self.program.display(),
            path = %path.display(),
            format,
            "Running loader"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("adapt")
            .arg("--config")
            .arg(path)
            .arg("--adapter")
            .arg(format)
            .output()
            .map_err(|e| failed(format!("failed to run {}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}
