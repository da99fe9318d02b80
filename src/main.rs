//! eyeguard CLI - drowsiness and focus monitoring engine
//!
//! Replays recorded camera and user events through the monitoring engine:
//! - Closed-eye alerts after a configurable threshold
//! - Pomodoro focus countdown with scheduled breaks
//! - Trip totals across start/stop cycles

use std::path::Path;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use eyeguard::cli::{parse_script, run_replay, Cli, Commands, Display, ReplayArgs};
use eyeguard::config::{break_minutes_for, AlertClearPolicy, EngineConfig, MonitoringContext};
use eyeguard::sound::SoundSource;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Replay(args)) => replay(args).await?,
        Some(Commands::BreakLength { minutes }) => {
            Display::show_break_length(minutes, break_minutes_for(minutes));
        }
        Some(Commands::Sounds) => {
            let config = load_config(None)?;
            Display::show_sounds(&SoundSource::for_config(&config));
        }
        Some(Commands::Config { config }) => {
            let config = load_config(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Loads the configuration from `path`, or from the default location if it
/// exists, or falls back to the defaults.
fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = path {
        return EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }

    match EngineConfig::default_path() {
        Some(path) if path.is_file() => EngineConfig::from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        _ => Ok(EngineConfig::default()),
    }
}

/// Applies command-line overrides on top of the loaded configuration.
fn replay_config(args: &ReplayArgs) -> Result<EngineConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(threshold) = args.threshold {
        config.closed_eye_threshold_seconds = threshold;
    }
    if args.focus.is_some() {
        config.focus_total_seconds = args.focus;
    }
    if args.break_time.is_some() {
        config.break_total_seconds = args.break_time;
    }
    if args.study {
        config.context = MonitoringContext::Study;
    }
    if args.clear_on_open {
        config.alert_clear_policy = AlertClearPolicy::ClearOnOpen;
    }
    Ok(config)
}

async fn replay(args: ReplayArgs) -> Result<()> {
    let config = replay_config(&args)?;
    let content = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script.display()))?;
    let lines = parse_script(&content)
        .with_context(|| format!("Invalid script {}", args.script.display()))?;

    #[cfg(feature = "audio")]
    let router = sound_router(&args, &config);

    let json = args.json;
    let mut write_error = None;
    let coordinator = run_replay(config, &lines, |at, event| {
        #[cfg(feature = "audio")]
        if let Some(router) = &router {
            router.handle(event);
        }

        if json {
            if let Err(e) = Display::show_event_json(at, event) {
                write_error.get_or_insert(e);
            }
        } else {
            Display::show_event(at, event);
        }
    })
    .await?;

    if let Some(e) = write_error {
        return Err(e).context("Failed to write event");
    }
    if !json {
        if let Some(summary) = coordinator.last_summary() {
            println!();
            Display::show_summary(summary);
        }
    }
    Ok(())
}

#[cfg(feature = "audio")]
fn sound_router(
    args: &ReplayArgs,
    config: &EngineConfig,
) -> Option<eyeguard::sound::SoundRouter<eyeguard::sound::RodioAlertPlayer>> {
    use eyeguard::sound::{default_sound_dir, try_create_player, SoundRouter};

    if !args.play_sounds {
        return None;
    }
    let sound_dir = args.sound_dir.clone().or_else(default_sound_dir)?;
    let player = try_create_player(false)?;
    Some(SoundRouter::new(player, SoundSource::for_config(config), sound_dir))
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
