mod cmd;
mod config;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::send::{self, SendArgs};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::workflow::notify::get_service;

#[derive(Parser)]
#[command(
    name = "dutycalls-notify",
    author,
    version,
    about = "Forward notifications to DutyCalls as tickets"
)]
struct Cli {
    /// Log progress to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Post a message as a DutyCalls ticket.
    Send(SendArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(error) = run(cli.command).await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(command: Commands) -> AppResult<()> {
    match command {
        Commands::Config(args) => config_cmd::run(args.command),
        Commands::Send(args) => {
            let config = AppConfig::load()?;
            let service = get_service(&config).ok_or_else(|| {
                AppError::Configuration("DutyCalls notification service unavailable".to_string())
            })?;
            send::run(&service, args).await
        }
    }
}
