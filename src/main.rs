use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod clock;
mod commands;
mod config;
mod controllers;
mod db;
mod error;
mod models;
mod types;
mod url;
mod validate;

use clock::{SharedClock, SystemClock};
use config::{Config, Overrides};
use db::Database;
pub(crate) use error::ApiResult;
use url::BaseUrlResolver;

#[derive(Parser, Debug)]
#[command(author, version, about = "Text paste service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (defaults to config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Delete pastes that have expired or run out of views
    PurgeExpired,
}

/// State shared by every request and command.
#[derive(Clone, FromRef)]
pub struct App {
    pub config: Config,
    pub database: Database,
    pub clock: SharedClock,
    pub urls: Arc<dyn BaseUrlResolver>,
}

impl App {
    pub fn new(config: Config, database: Database, clock: SharedClock) -> Self {
        let urls = url::resolver(config.public_base_url.as_deref());
        App {
            config,
            database,
            clock,
            urls,
        }
    }

    /// The current time as seen by a request.
    pub fn now(&self, headers: &HeaderMap) -> DateTime<Utc> {
        clock::request_now(self.clock.as_ref(), headers, self.config.test_mode)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);

    let database = Database::connect(&config.database.url, config.database.max_connections)
        .await
        .context("failed to initialize database")?;

    let app = App::new(config, database.clone(), Arc::new(SystemClock));

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve::run(app).await,
        Command::Migrate => commands::migrate::run(app).await,
        Command::PurgeExpired => commands::purge_expired::run(app).await,
    };

    database.close().await;

    result
}
