use anyhow::{Context, Result};
use chanman::app::{App, AppEvent};
use chanman::config::Config;
use chanman::store::ChannelStore;
use chanman::tasks::CatalogDeleteTrigger;
use chanman::ui;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Get the config directory path (~/.config/chanman/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("chanman"))
}

/// Send tracing output to a log file so it cannot corrupt the terminal UI.
///
/// Defaults to `info`; `RUST_LOG` overrides the filter.
fn init_tracing(config_dir: &Path) -> Result<()> {
    let log_path = config_dir.join("chanman.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "chanman", about = "Manage the content channels on this device")]
struct Args {
    /// Channel catalog to manage (overrides catalog_path in config)
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Config file to use instead of ~/.config/chanman/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        println!("Created config directory: {}", config_dir.display());
    }

    // User-only access to the config directory
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(&config_dir, std::fs::Permissions::from_mode(0o700))
        {
            eprintln!(
                "Warning: failed to set permissions on {}: {}",
                config_dir.display(),
                e
            );
        }
    }

    init_tracing(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    let catalog_path = args
        .catalog
        .clone()
        .unwrap_or_else(|| config.catalog_path_in(&config_dir));
    let store = ChannelStore::open(&catalog_path)
        .await
        .with_context(|| format!("Failed to open channel catalog '{}'", catalog_path.display()))?;

    let trigger = Arc::new(CatalogDeleteTrigger::new(store.clone()));
    let mut app = App::new(store, trigger, &config);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    if config.refresh_on_start {
        ui::spawn_refresh(&mut app, &event_tx);
    }

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}
