use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use alpha_workspace::config::{ConfigError, WorkspaceConfig};
use alpha_workspace::containment::ReservoirBounds;
use alpha_workspace::defaults::{default_cards, default_positions};
use alpha_workspace::engine::Engine;
use alpha_workspace::launcher::{LaunchError, Launcher, SystemLauncher};
use alpha_workspace::persistence::{FileStore, LayoutEntry, LayoutPersistence};
use alpha_workspace::registry::CardRegistry;
use alpha_workspace::replay::{ReplayError, replay};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("cannot open {path}: {source}")]
    Input { path: PathBuf, source: std::io::Error },
    #[error("layout encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no local launch path found in the usual install locations")]
    NotDetected,
}

#[derive(Parser, Debug)]
#[command(name = "alpha-workspace", about = "Alpha workspace layout and launcher tools")]
struct Cli {
    /// Key/value file holding the layout and launcher settings.
    #[arg(long, env = "WORKSPACE_STORE_PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Layout(LayoutCommand),
    Path(PathCommand),
    /// Drive the engine from JSON-lines host events.
    Replay {
        /// Event file; stdin when omitted.
        file: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct LayoutCommand {
    #[command(subcommand)]
    command: LayoutSubcommand,
}

#[derive(Subcommand, Debug)]
enum LayoutSubcommand {
    /// Print the saved layout reconciled with the built-in cards.
    Show,
    /// Put every card back at its default position.
    Reset,
}

#[derive(Args, Debug)]
struct PathCommand {
    #[command(subcommand)]
    command: PathSubcommand,
}

#[derive(Subcommand, Debug)]
enum PathSubcommand {
    Get,
    Set { path: String },
    Detect,
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            error!(error = %e, ".env unreadable");
        }
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = WorkspaceConfig::from_env()?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    debug!(store = %config.store_path.display(), "using store");
    let store = FileStore::new(&config.store_path);

    match cli.command {
        Command::Layout(cmd) => {
            let mut registry =
                CardRegistry::load(default_cards(), config.viewport, LayoutPersistence::new(store.clone()));
            if let LayoutSubcommand::Reset = cmd.command {
                registry.reset_to_defaults(&default_positions());
                info!(cards = registry.len(), "layout reset");
            }
            let entries: Vec<LayoutEntry> = registry.list().iter().map(LayoutEntry::from_card).collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Command::Path(cmd) => {
            let launcher = SystemLauncher::new(store);
            match cmd.command {
                PathSubcommand::Get => match launcher.configured_local_path().await {
                    Some(path) => println!("{path}"),
                    None => println!("(not configured)"),
                },
                PathSubcommand::Set { path } => {
                    launcher.set_configured_local_path(path.trim()).await?;
                    println!("{}", path.trim());
                }
                PathSubcommand::Detect => {
                    let path = launcher.auto_detect_local_path().await.ok_or(CliError::NotDetected)?;
                    launcher.set_configured_local_path(&path).await?;
                    println!("{path}");
                }
            }
        }
        Command::Replay { file } => {
            let bounds = ReservoirBounds::new(config.reservoir);
            let registry =
                CardRegistry::load(default_cards(), config.viewport, LayoutPersistence::new(store.clone()));
            let launcher = Arc::new(SystemLauncher::new(store));
            let mut engine =
                Engine::new(registry, launcher, Box::new(bounds.clone())).with_max_icon_bytes(config.max_icon_bytes);
            if let Some(handle) = engine.bootstrap() {
                if let Err(e) = handle.await {
                    error!(error = %e, "bootstrap task failed");
                }
            }

            let input: Box<dyn AsyncBufRead + Unpin> = match file {
                Some(path) => {
                    let file = tokio::fs::File::open(&path)
                        .await
                        .map_err(|source| CliError::Input { path, source })?;
                    Box::new(BufReader::new(file))
                }
                None => Box::new(BufReader::new(tokio::io::stdin())),
            };
            let mut stdout = tokio::io::stdout();
            let summary = replay(&mut engine, &bounds, input, &mut stdout).await?;
            info!(events = summary.events, actions = summary.actions, "replay finished");
        }
    }
    Ok(())
}
