//! Flint CLI - Command-line interface for the Flint content runtime

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::content;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flint")]
#[command(about = "Inspect and exercise Flint's content caches", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Content identifier and cache operations
    #[command(subcommand)]
    Content(content::ContentCommands),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Content(cmd) => content::run(cmd),
    }
}
