use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "availability-cli", version, about = "Availability poll CLI")]
struct Cli {
    /// Configuration file (defaults to ~/.config/availability/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Lay out a calendar from request timespans
    Init(commands::init::InitArgs),
    /// Drive a calendar through a list of gestures and print the payload
    Replay(commands::replay::ReplayArgs),
    /// Normalize and check a submitted payload
    Check(commands::check::CheckArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action, config_path),
        Commands::Init(args) => commands::init::run(args, config_path),
        Commands::Replay(args) => commands::replay::run(args, config_path),
        Commands::Check(args) => commands::check::run(args, config_path),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
