//! Adapt command: synchronize and load the entry file

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use gitcfg_core::{CommandLoader, ConfigLoader, FileLoader, GitAdapter, Settings};

use super::{read_input, run_blocking};

/// Synchronize and load the entry file
#[derive(Args, Debug)]
pub struct AdaptArgs {
    /// Adapter input file (JSON or YAML), or `-` for stdin
    pub input: PathBuf,

    /// Write the loaded configuration here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl AdaptArgs {
    /// Execute the adapt command
    pub async fn execute(&self, settings: &Settings) -> anyhow::Result<()> {
        let body = read_input(&self.input)?;

        let loader: Box<dyn ConfigLoader + Send> = match settings.load.command.as_deref() {
            Some(command) => Box::new(CommandLoader::from_command_line(command)?),
            None => Box::new(FileLoader),
        };
        let adapter = GitAdapter::new(settings.resolve_defaults(), loader);

        let adapted = run_blocking(settings.load.timeout, move || adapter.adapt(&body)).await?;

        for warning in &adapted.warnings {
            tracing::warn!("{}", warning.message);
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &adapted.config)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), bytes = adapted.config.len(), "Wrote configuration");
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&adapted.config)?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}
