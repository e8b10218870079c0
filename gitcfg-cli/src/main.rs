//! gitcfg CLI - Command line interface for gitcfg
//!
//! Keeps a local clone of a configuration repository up to date and loads the
//! entry file from it.

mod commands;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use gitcfg_core::Settings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{AdaptArgs, InspectArgs, ResolveArgs, SyncArgs};

/// gitcfg: load configuration from a git repository
#[derive(Parser, Debug)]
#[command(name = "gitcfg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Root directory for clones without a clone_path (overrides config and env)
    #[arg(long, global = true, env = "GITCFG_TEMP_ROOT")]
    temp_root: Option<PathBuf>,

    /// External interpreter for the entry file (overrides config and env)
    #[arg(long, global = true, env = "GITCFG_LOADER")]
    loader: Option<String>,

    /// Give up waiting for synchronization after this many seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Decode adapter input and print the resolved options
    Resolve(ResolveArgs),

    /// Synchronize the clone described by adapter input
    #[command(visible_alias = "s")]
    Sync(SyncArgs),

    /// Synchronize and load the entry file
    #[command(visible_alias = "a")]
    Adapt(AdaptArgs),

    /// Show what occupies a clone path
    Inspect(InspectArgs),

    /// Show current settings
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `adapt` output can be piped
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let settings = Settings::load_with_overrides(
        cli.temp_root.clone(),
        cli.loader.clone(),
        cli.timeout.map(Duration::from_secs),
    )?;

    if cli.verbose {
        tracing::debug!(
            temp_root = ?settings.defaults.temp_root,
            reference = %settings.defaults.reference,
            entry_file = %settings.defaults.entry_file,
            namespace = settings.defaults.namespace,
            loader = ?settings.load.command,
            timeout = ?settings.load.timeout,
            "Settings loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("gitcfg {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Resolve(args)) => {
            args.execute(&settings)?;
        }
        Some(Commands::Sync(args)) => {
            args.execute(&settings).await?;
        }
        Some(Commands::Adapt(args)) => {
            args.execute(&settings).await?;
        }
        Some(Commands::Inspect(args)) => {
            args.execute();
        }
        Some(Commands::Config) => {
            let defaults = settings.resolve_defaults();
            println!("gitcfg Settings");
            println!("===============");
            println!();
            println!("Defaults:");
            println!("  temp_root:  {}", defaults.temp_root.display());
            println!("  reference:  {}", defaults.reference);
            println!("  entry_file: {}", defaults.entry_file);
            println!("  namespace:  {}", defaults.namespace);
            println!();
            println!("Load:");
            println!(
                "  command: {}",
                settings.load.command.as_deref().unwrap_or("(passthrough)")
            );
            match settings.load.timeout {
                Some(t) => println!("  timeout: {}s", t.as_secs()),
                None => println!("  timeout: (none)"),
            }
            println!();
            if let Some(path) = Settings::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("gitcfg - Load configuration from a git repository");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
