use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use issuebridge::{Config, GitHubTracker, PivotalTracker, Synchronizer};

#[derive(Parser)]
#[command(name = "issuebridge")]
#[command(about = "Additive issue synchronization between GitHub and Pivotal Tracker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy issues missing on either side between the configured trackers
    Sync {
        /// Which way to copy missing issues
        #[arg(long, value_enum, default_value = "both")]
        direction: Direction,

        /// Show what would be copied without creating anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Write a starter configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum Direction {
    /// Copy missing issues both ways
    Both,

    /// Copy missing GitHub issues into Pivotal Tracker only
    GithubToPivotal,

    /// Copy missing Pivotal Tracker stories into GitHub only
    PivotalToGithub,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    if let Err(err) = run(cli).await {
        if verbose {
            eprintln!("Error: {:?}", err);
        } else {
            eprintln!("Error: {:#}", err);
        }
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose)?;
    info!("Starting issuebridge v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Sync { direction, dry_run } => cmd_sync(cli.config, direction, dry_run).await,
        Commands::Init { force } => cmd_init(cli.config, force),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_default(),
    }
}

/// Synchronize issues between the configured trackers
async fn cmd_sync(
    config_path: Option<std::path::PathBuf>,
    direction: Direction,
    dry_run: bool,
) -> Result<()> {
    let config = load_config(config_path)?;

    println!("🔗 Connecting to trackers...");
    let github = GitHubTracker::new(&config).await?;
    let pivotal = PivotalTracker::new(&config)?;
    let synchronizer = Synchronizer::new();

    if dry_run {
        println!("🔍 Dry run mode - no issues will be created");

        let plan = match direction {
            Direction::Both => synchronizer.plan_bidirectional(&github, &pivotal).await?,
            Direction::GithubToPivotal => synchronizer.plan(&github, &pivotal).await?,
            Direction::PivotalToGithub => synchronizer.plan(&pivotal, &github).await?,
        };

        for entry in &plan {
            if entry.closed {
                println!(
                    "   ⏭️  Counted but not copied (closed): {} -> {}",
                    entry.title, entry.destination
                );
            } else {
                println!("   📋 Would copy: {} -> {}", entry.title, entry.destination);
            }
        }

        let to_create = plan.iter().filter(|entry| !entry.closed).count();
        println!("\n📈 Summary:");
        println!("   📊 Missing issues found: {}", plan.len());
        println!("   📋 Issues that would be created: {}", to_create);

        return Ok(());
    }

    let synced = match direction {
        Direction::Both => {
            synchronizer
                .synchronize_bidirectional(&github, &pivotal)
                .await?
        }
        Direction::GithubToPivotal => synchronizer.synchronize(&github, &pivotal).await?,
        Direction::PivotalToGithub => synchronizer.synchronize(&pivotal, &github).await?,
    };

    println!("\n🎉 Synchronization complete!");
    println!("   📊 Missing issues found: {}", synced);

    Ok(())
}

/// Write a starter configuration file
fn cmd_init(config_path: Option<std::path::PathBuf>, force: bool) -> Result<()> {
    let config_path = match config_path {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    if config_path.exists() && !force {
        bail!(
            "Config file already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    Config::template().save(&config_path)?;

    println!("✅ Configuration written to {:?}", config_path);
    println!("   Edit it with your repository, project id and tokens,");
    println!("   then run 'issuebridge sync'");

    Ok(())
}
