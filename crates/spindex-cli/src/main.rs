//! Spindex CLI - Command-line interface for Spindex
//!
//! Provides commands for:
//! - Authenticating against Microsoft Graph (device code flow)
//! - Mirroring a SharePoint library into blob storage
//! - Provisioning and managing Azure AI Search verticals
//! - Analyzing a corpus and recommending vertical settings

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use spindex_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    auth::AuthCommand, completions::CompletionsCommand, config::ConfigCommand,
    recommend::RecommendCommand, search::SearchCommand, sync::SyncCommand,
    vertical::VerticalCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "spindex", version, about = "SharePoint to Azure AI Search sync toolkit")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<String>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Authentication commands
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Mirror the SharePoint library into blob storage
    Sync(SyncCommand),
    /// Manage the Azure AI Search pipeline
    #[command(subcommand)]
    Search(SearchCommand),
    /// Create or delete a named search vertical
    #[command(subcommand)]
    Vertical(VerticalCommand),
    /// Analyze a corpus and recommend vertical settings
    Recommend(RecommendCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let config_path = cli
        .config
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match cli.command {
        Commands::Auth(cmd) => cmd.execute(format, &config_path).await,
        Commands::Sync(cmd) => cmd.execute(format, &config_path).await,
        Commands::Search(cmd) => cmd.execute(format, &config_path).await,
        Commands::Vertical(cmd) => cmd.execute(format, &config_path).await,
        Commands::Recommend(cmd) => cmd.execute(format).await,
        Commands::Config(cmd) => cmd.execute(format, &config_path).await,
        Commands::Completions(cmd) => cmd.execute(format).await,
    }
}
