//! # pairsync
//!
//! CLI tool for pairsync, syncing a small weather document between paired
//! devices over a shared directory.
//!
//! ## Commands
//!
//! - `init`: Initialize device identity
//! - `publish`: Merge weather fields into the shared document
//! - `fetch`: Read the shared document
//! - `status`: Show device, peers and local document
//!
//! ## Example
//!
//! ```bash
//! # Initialize both devices against the same directory
//! pairsync --data-dir ./phone init --name Phone --substrate /tmp/pairsync
//! pairsync --data-dir ./watch init --name Watch --substrate /tmp/pairsync
//!
//! # Publish from the phone
//! pairsync --data-dir ./phone publish --weather-id 800 --high 24 --low 13.5
//!
//! # Fetch on the watch (mirrors the phone's copy locally)
//! pairsync --data-dir ./watch fetch --peer
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pairsync_client::PeerSelection;
use std::path::PathBuf;

mod commands;
mod config;

use commands::{fetch, init, publish, status};

/// CLI tool for pairsync paired-device configuration sync.
#[derive(Parser, Debug)]
#[command(name = "pairsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for storing device identity
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize device identity
    Init {
        /// Device name
        #[arg(long, short)]
        name: String,

        /// Shared directory both paired devices use as the sync substrate
        #[arg(long, short)]
        substrate: PathBuf,

        /// Which connected peer to read from (last, first, nearby)
        #[arg(long, default_value = "last")]
        peer_selection: PeerSelection,
    },

    /// Merge weather fields into the shared document
    Publish {
        /// Weather condition code
        #[arg(long)]
        weather_id: Option<i32>,

        /// Daily high temperature
        #[arg(long, allow_negative_numbers = true)]
        high: Option<f64>,

        /// Daily low temperature
        #[arg(long, allow_negative_numbers = true)]
        low: Option<f64>,
    },

    /// Read the shared document
    Fetch {
        /// Read from the connected peer instead of the local mirror
        #[arg(long)]
        peer: bool,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Show sync status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;
    config::set_dir_permissions_0700(&data_dir).await?;

    match cli.command {
        Commands::Init {
            name,
            substrate,
            peer_selection,
        } => {
            init::run(&data_dir, &name, &substrate, peer_selection).await?;
        }
        Commands::Publish {
            weather_id,
            high,
            low,
        } => {
            let fields = publish::WeatherFields {
                weather_id,
                high_temp: high,
                low_temp: low,
            };
            publish::run(&data_dir, fields).await?;
        }
        Commands::Fetch { peer, timeout_secs } => {
            fetch::run(&data_dir, peer, timeout_secs).await?;
        }
        Commands::Status => {
            status::run(&data_dir).await?;
        }
    }

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Get the default data directory for pairsync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "pairsync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
