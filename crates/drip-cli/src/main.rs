// crates/drip-cli/src/main.rs
//
// CLI entrypoint for the Drip staking engine.
//
// Every invocation loads the engine snapshot, applies one operation at the
// chain moment given by --block/--timestamp (or the wall clock), and writes
// the snapshot back if the operation changed state.

mod commands;
mod config;
mod output;
mod state_store;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::admin::AdminCmd;
use commands::stake::StakeCmd;
use commands::token::TokenCmd;
use commands::Context;
use config::CliConfig;
use output::OutputFormat;

/// Drip CLI: time-locked LP staking with boosted rewards.
#[derive(Parser, Debug)]
#[command(
    name = "drip",
    version = "0.1.0",
    about = "Drip CLI for time-locked LP staking, reward emission, and treasury payouts"
)]
struct Cli {
    /// Path to configuration file.
    #[arg(long, global = true, default_value = "~/.drip/config.toml")]
    config: String,

    /// Override the state file from the configuration.
    #[arg(long, global = true)]
    state: Option<String>,

    /// Emit JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    /// Block height to act at. Derived from the timestamp when omitted.
    #[arg(long, global = true)]
    block: Option<u64>,

    /// Unix timestamp to act at. Defaults to now.
    #[arg(long, global = true)]
    timestamp: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Deploy a fresh engine and write its state file.
    Init {
        /// Overwrite an existing state file.
        #[arg(long)]
        force: bool,
        /// Leave the treasury unset for a later `set-treasury`.
        #[arg(long)]
        no_treasury: bool,
    },

    // stake, claim, withdraw, pending, position
    #[command(flatten)]
    Stake(StakeCmd),

    // set-rate, set-treasury
    #[command(flatten)]
    Admin(AdminCmd),

    // transfer, mint, balance
    #[command(flatten)]
    Token(TokenCmd),

    /// Display global engine state.
    Status,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = config::expand_tilde(&cli.config);
    let config = match CliConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            if std::path::Path::new(&config_path).exists() {
                eprintln!("Warning: Failed to load config from {}: {}", config_path, e);
                eprintln!("Using default configuration.");
            }
            CliConfig::default()
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let state_file = config::expand_tilde(cli.state.as_deref().unwrap_or(&config.state_file));
    let ctx = Context {
        now: config.moment(cli.block, cli.timestamp),
        format: if cli.json { OutputFormat::Json } else { OutputFormat::Table },
        state_file,
        config,
    };
    tracing::debug!("Acting at block {} timestamp {}", ctx.now.block, ctx.now.timestamp);

    match &cli.command {
        Commands::Init { force, no_treasury } => commands::init::run(&ctx, *force, *no_treasury)?,
        Commands::Stake(cmd) => commands::stake::run(cmd, &ctx)?,
        Commands::Admin(cmd) => commands::admin::run(cmd, &ctx)?,
        Commands::Token(cmd) => commands::token::run(cmd, &ctx)?,
        Commands::Status => commands::status::run(&ctx)?,
    }

    Ok(())
}
