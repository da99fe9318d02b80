//! Command definitions for the eyeguard CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::MAX_THRESHOLD_SECONDS;

// ============================================================================
// CLI Structure
// ============================================================================

/// eyeguard - drowsiness monitoring engine
#[derive(Parser, Debug)]
#[command(
    name = "eyeguard",
    version,
    about = "Drowsiness and focus monitoring engine",
    long_about = "Runs the eyeguard monitoring engine over recorded event scripts.\n\
                  Eye samples, ticks and user actions are replayed through the engine \
                  and every resulting mode change, timer update and sound request is printed.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Replay a JSON-lines event script through the engine
    Replay(ReplayArgs),

    /// Print the suggested break length for a focus block
    BreakLength {
        /// Focus duration in minutes
        #[arg(value_parser = clap::value_parser!(u32).range(1..=1440))]
        minutes: u32,
    },

    /// List the built-in alert sounds
    Sounds,

    /// Print the effective configuration as JSON
    Config {
        /// Configuration file (defaults to the user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Replay Command Arguments
// ============================================================================

/// Arguments for the replay command
#[derive(Args, Debug, Clone, Default)]
pub struct ReplayArgs {
    /// Event script, one JSON object per line
    pub script: PathBuf,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Closed-eye threshold in seconds
    #[arg(short, long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Focus countdown in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=86_400))]
    pub focus: Option<u32>,

    /// Break countdown in seconds
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=86_400))]
    pub break_time: Option<u32>,

    /// Use the study context (selected alert sound instead of the alarm)
    #[arg(short, long)]
    pub study: bool,

    /// Clear alerts as soon as the eyes reopen
    #[arg(long)]
    pub clear_on_open: bool,

    /// Print outbound events as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Play alert sounds while replaying
    #[cfg(feature = "audio")]
    #[arg(long)]
    pub play_sounds: bool,

    /// Directory holding the bundled WAV files
    #[cfg(feature = "audio")]
    #[arg(long)]
    pub sound_dir: Option<PathBuf>,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the closed-eye threshold.
fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if !value.is_finite() || value <= 0.0 || value > MAX_THRESHOLD_SECONDS {
        return Err(format!(
            "threshold must be greater than 0 and at most {MAX_THRESHOLD_SECONDS} seconds"
        ));
    }
    Ok(value)
}

// ============================================================================
// Tests
// ============================================================================
