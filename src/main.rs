use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crudknut::api::ResourceClient;
use crudknut::app::{App, AppEvent};
use crudknut::config::Config;
use crudknut::entity::EntityKind;
use crudknut::ui;

#[derive(Parser, Debug)]
#[command(
    name = "crudknut",
    about = "Terminal CRUD client for posts, comments, albums and users"
)]
struct Args {
    /// Config file (default: ~/.config/crudknut/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// API root, overrides `base_url` from the config file
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// View shown after login: posts, comments, albums or users
    #[arg(long, value_name = "KIND")]
    entity: Option<String>,

    /// Request timeout in seconds, 0 disables it
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never land in the alternate screen
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match args.config.or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            tracing::warn!("HOME not set, using default configuration");
            Config::default()
        }
    };

    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(entity) = args.entity {
        if EntityKind::from_str_name(&entity).is_none() {
            anyhow::bail!(
                "Unknown entity '{}': expected posts, comments, albums or users",
                entity
            );
        }
        config.start_entity = entity;
    }
    if let Some(secs) = args.timeout {
        config.request_timeout_secs = secs;
    }

    let client = ResourceClient::new(&config.base_url, config.request_timeout())
        .with_context(|| format!("Invalid base URL '{}'", config.base_url))?;

    let mut app = App::new(client, &config);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}
