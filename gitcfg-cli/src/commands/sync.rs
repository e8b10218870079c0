//! Resolve and synchronize commands

use std::path::PathBuf;

use clap::Args;
use gitcfg_core::{resolve, synchronize_with_report, Settings};

use super::{read_input, run_blocking};

/// Decode adapter input and print the resolved options
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Adapter input file (JSON or YAML), or `-` for stdin
    pub input: PathBuf,

    /// Print as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl ResolveArgs {
    /// Execute the resolve command
    pub fn execute(&self, settings: &Settings) -> anyhow::Result<()> {
        let body = read_input(&self.input)?;
        let options = resolve(&body, &settings.resolve_defaults())?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&options)?);
            return Ok(());
        }

        println!("Resolved options:");
        println!("  url:        {}", options.remote_url);
        println!("  ref:        {}", options.reference);
        println!("  clone_path: {}", options.local_path.display());
        println!("  entry file: {}", options.entry_path().display());

        Ok(())
    }
}

/// Synchronize the clone described by adapter input
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Adapter input file (JSON or YAML), or `-` for stdin
    pub input: PathBuf,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, settings: &Settings) -> anyhow::Result<()> {
        let body = read_input(&self.input)?;
        let options = resolve(&body, &settings.resolve_defaults())?;

        let report =
            run_blocking(settings.load.timeout, move || synchronize_with_report(&options)).await?;

        println!("Synchronized:");
        println!("  Path:   {}", report.root.display());
        println!("  Ref:    {}", report.reference);
        match &report.branch {
            Some(branch) => println!("  Branch: {}", branch),
            None => println!("  Branch: (detached)"),
        }
        println!("  Commit: {}", report.commit);
        if report.cloned {
            println!("  Clone:  new");
        }
        println!("  Fetch:  {}", report.fetch);
        println!("  Pull:   {}", report.pull);

        Ok(())
    }
}
