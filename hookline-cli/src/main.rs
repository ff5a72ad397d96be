use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "hookline", about = "Run agent lifecycle hooks")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Run the hooks configured for an event
    Dispatch(commands::dispatch::DispatchArgs),
    /// List lifecycle events
    Events,
    /// Validate a hook configuration file
    Validate(commands::validate::ValidateArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // stdout carries dispatch results, so logs go to stderr
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Config(args) => commands::config::run(args).map(|()| ExitCode::SUCCESS),
        Commands::Dispatch(args) => commands::dispatch::run(args).await,
        Commands::Events => {
            commands::events::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate(args) => commands::validate::run(args).map(|()| ExitCode::SUCCESS),
    }
}
