//! # room-cli
//!
//! CLI tool for exercising roomsync mutators.
//!
//! ## Commands
//!
//! - `list`: Show the registered mutators
//! - `mutate`: Run one mutation optimistically and then authoritatively
//! - `script`: Replay a JSON list of mutations through one server
//!
//! ## Example
//!
//! ```bash
//! # Three increments in room A
//! room-cli mutate increment --room A --user alice --times 3
//!
//! # Move a cursor
//! room-cli mutate setCursor --room A --user alice --client c1 --args '{"x":10,"y":20}'
//!
//! # Replay a session
//! room-cli script session.json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::{list, mutate, script};

/// CLI tool for exercising roomsync mutators.
#[derive(Parser, Debug)]
#[command(name = "room-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Server configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the registered mutators
    List,

    /// Run a mutation on a local client store, then on the server
    Mutate {
        /// Mutator name
        name: String,

        /// Room to mutate
        #[arg(long)]
        room: String,

        /// Authenticated user
        #[arg(long)]
        user: String,

        /// Client id (random if omitted)
        #[arg(long)]
        client: Option<String>,

        /// Mutator arguments as JSON
        #[arg(long)]
        args: Option<String>,

        /// How many times to run the mutation
        #[arg(long, default_value = "1")]
        times: u32,
    },

    /// Replay a JSON file of mutation steps through one server
    Script {
        /// Path to the script file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref()).await?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::List => {
            list::run();
        }
        Commands::Mutate {
            name,
            room,
            user,
            client,
            args,
            times,
        } => {
            let opts = mutate::MutateOptions {
                name,
                room,
                user,
                client,
                args,
                times,
            };
            mutate::run(config, opts).await?;
        }
        Commands::Script { file } => {
            script::run(config, &file).await?;
        }
    }

    Ok(())
}
