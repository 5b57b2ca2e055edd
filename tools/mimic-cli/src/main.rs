//! Mimic CLI — record and replay mouse/keyboard macros.
//!
//! Usage:
//!   mimic record [OPTIONS]     Capture input to a recording file
//!   mimic play <PATH>          Replay a recording
//!   mimic info <PATH>          Show recording information
//!   mimic check                Check system capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mimic",
    about = "Input macro recording with human-like replay",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture mouse and keyboard input to a recording file
    Record {
        /// Output recording file
        #[arg(short, long, default_value = "recording.json")]
        output: PathBuf,

        /// Record under the gaming tuning profile
        #[arg(long)]
        gaming: bool,

        /// Stop automatically after this many seconds
        #[arg(long)]
        duration: Option<f64>,
    },

    /// Replay a recording
    Play {
        /// Path to the recording file
        path: PathBuf,

        /// Playback speed multiplier, overrides the configured value
        #[arg(long)]
        speed: Option<f64>,

        /// Replay the recording this many times
        #[arg(long, conflicts_with = "infinite")]
        repeat: Option<u32>,

        /// Replay until interrupted
        #[arg(long)]
        infinite: bool,

        /// Pin the randomness seed for a reproducible replay
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show recording information
    Info {
        /// Path to the recording file
        path: PathBuf,
    },

    /// Check system capabilities
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = mimic_common::config::Settings::load();
    let mut logging = settings.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    mimic_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Record {
            output,
            gaming,
            duration,
        } => commands::record::run(output, gaming, duration, &settings).await,
        Commands::Play {
            path,
            speed,
            repeat,
            infinite,
            seed,
        } => commands::play::run(path, speed, repeat, infinite, seed, settings).await,
        Commands::Info { path } => commands::info::run(path),
        Commands::Check => commands::check::run(&settings),
    }
}
