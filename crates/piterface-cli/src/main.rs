//! Piterface command line
//!
//! Loads remote settings, replays a list of button presses against a fresh
//! controller and prints the resulting state. Logs go to stderr so the state
//! on stdout can be piped into other tools.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use piterface_config::Settings;
use piterface_remote::{Controller, RemoteCommand, StateSnapshot};

/// Drive a Piterface remote controller
#[derive(Parser)]
#[command(
    name = "piterface",
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None
)]
struct Cli {
    /// Settings file (TOML); built-in defaults are used when omitted
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply commands in order and print the final state
    Run {
        /// Commands such as "power-on", "channel 42" or "volume-up 5"
        #[arg(value_name = "COMMAND", required = true)]
        commands: Vec<String>,

        /// Output format for the final state
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Validate a settings file and print it normalized
    CheckConfig {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { commands, format } => {
            let settings = load_settings(cli.config.as_deref())?;
            let snapshot = run_script(settings, &commands)?;
            println!("{}", render(&snapshot, format)?);
        }
        Commands::CheckConfig { file } => {
            let settings = Settings::load(&file)
                .with_context(|| format!("Invalid settings file {}", file.display()))?;
            print!("{}", settings.to_toml_string()?);
        }
    }

    Ok(())
}

/// Setup logging to stderr
fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<Arc<Settings>> {
    let settings = match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    Ok(Arc::new(settings))
}

/// Parse every command up front, then apply them in order.
///
/// Stops at the first rejected command; nothing runs if any command fails to parse.
fn run_script(settings: Arc<Settings>, lines: &[String]) -> Result<StateSnapshot> {
    let commands = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            line.parse::<RemoteCommand>()
                .with_context(|| format!("Command {} ('{}') is not valid", index + 1, line))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut remote = Controller::new(settings);
    info!("Running {} commands on '{}'", commands.len(), remote.settings().name());

    for (index, command) in commands.into_iter().enumerate() {
        remote
            .apply(command)
            .with_context(|| format!("Command {} ('{}') was rejected", index + 1, command))?;
    }

    Ok(remote.snapshot())
}

fn render(snapshot: &StateSnapshot, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string(snapshot)?,
        OutputFormat::Text => snapshot.to_string(),
    })
}
