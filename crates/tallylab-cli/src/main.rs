//! TallyLab CLI - access-controlled databases on a content-addressed log.
//!
//! Manages the node identity, derives database addresses and asks a
//! database's access controller whether an entry may be appended.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tallylab_config::Config;
use tallylab_telemetry::LogConfig;

mod commands;
mod config_bridge;
mod node;
mod theme;

use commands::{address, check, database, keys, policy};

/// TallyLab - access-controlled databases
#[derive(Parser)]
#[command(name = "tallylab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to an extra configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the node identity key
    Keys {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Print the node identity document as JSON
    Identity,

    /// Derive a database address without storing anything
    Address {
        /// Database name
        name: String,

        /// Database type recorded in the manifest
        #[arg(short = 't', long)]
        db_type: Option<String>,

        /// Identity allowed to write (repeatable; defaults to this node)
        #[arg(short, long = "write")]
        writers: Vec<String>,
    },

    /// Create a database and store its policy and manifest
    Create {
        /// Database name
        name: String,

        /// Database type recorded in the manifest
        #[arg(short = 't', long)]
        db_type: Option<String>,

        /// Identity allowed to write (repeatable; defaults to this node)
        #[arg(short, long = "write")]
        writers: Vec<String>,
    },

    /// Append a JSON payload to a database as this node
    Append {
        /// Database address (`/tallylab/<manifest>/<name>`)
        address: String,

        /// JSON payload
        payload: String,
    },

    /// Show a stored write policy
    Policy {
        /// Policy cid, `/dag/<cid>` reference or database address
        reference: String,
    },

    /// Ask a database's controller whether an entry may be appended
    Check {
        /// Database address (`/tallylab/<manifest>/<name>`)
        address: String,

        /// Log entry JSON file (defaults to an entry written by this node)
        #[arg(short, long)]
        entry: Option<PathBuf>,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Show the node identity
    Show,
    /// Generate a new identity key
    Generate {
        /// Derive the key from a 32-byte hex seed
        #[arg(long)]
        seed: Option<String>,

        /// Replace an existing key
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(cli.config.as_deref())?;
    let config = loaded.config;

    if cli.no_color {
        colored::control::set_override(false);
    }
    let log_config = log_config_for(&config, cli.verbose, cli.no_color);
    if let Err(e) = tallylab_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }
    tracing::debug!(files = ?loaded.loaded_files, "configuration loaded");

    match cli.command {
        Commands::Keys { command } => handle_keys(&config, command),
        Commands::Identity => keys::print_identity(&config),
        Commands::Address {
            name,
            db_type,
            writers,
        } => address::show_address(&config, &name, db_type.as_deref(), writers),
        Commands::Create {
            name,
            db_type,
            writers,
        } => database::create(&config, &name, db_type.as_deref(), writers).await,
        Commands::Append { address, payload } => {
            database::append(&config, &address, &payload).await
        },
        Commands::Policy { reference } => policy::show_policy(&config, &reference).await,
        Commands::Check {
            address,
            entry,
            json,
        } => check::check_entry(&config, &address, entry.as_deref(), json).await,
    }
}

/// Logging settings from config, adjusted by the global flags.
fn log_config_for(config: &Config, verbose: bool, no_color: bool) -> LogConfig {
    let mut log_config = config_bridge::to_log_config(config);
    if verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if no_color {
        log_config = log_config.without_ansi();
    }
    log_config
}

fn handle_keys(config: &Config, command: KeyCommands) -> Result<()> {
    match command {
        KeyCommands::Show => keys::show_key(config),
        KeyCommands::Generate { seed, force } => {
            keys::generate_key(config, seed.as_deref(), force)
        },
    }
}
