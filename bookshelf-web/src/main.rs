//! Bookshelf Web Server
//!
//! Accounts, profiles and owner-guarded books over HTTP.

use anyhow::{anyhow, Context};
use bookshelf_core::{init_logging, AppConfig};
use bookshelf_web::{config_validator, BookshelfServer};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Bookshelf Web Server
#[derive(Parser)]
#[command(name = "bookshelf-web")]
#[command(about = "HTTP API for accounts, profiles and books")]
#[command(version)]
struct Args {
    /// TOML configuration file (defaults to ./bookshelf.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,
}

impl Args {
    fn apply(self, config: &mut AppConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    let mut config =
        AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let check_only = args.check_config;
    args.apply(&mut config);

    init_logging(&config.logging).map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    config_validator::validate_config(&config)?;
    if check_only {
        info!("Configuration OK");
        return Ok(());
    }

    let server = BookshelfServer::new(config).await?;
    server.start().await?;

    Ok(())
}
