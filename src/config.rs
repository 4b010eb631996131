use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Deserialize;

/// Config file read when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Overrides the header-derived prefix of returned paste links.
    pub public_base_url: Option<String>,
    /// Honor the `x-test-now-ms` request header as the current time.
    pub test_mode: bool,
    pub database: Database,
    pub limits: Limits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_body_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            public_base_url: None,
            test_mode: false,
            database: Database::default(),
            limits: Limits::default(),
        }
    }
}

impl Default for Database {
    fn default() -> Self {
        Database {
            url: "sqlite://pastebin.db?mode=rwc".to_owned(),
            max_connections: 5,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_body_size: 1024 * 1024,
        }
    }
}

impl Config {
    /// Load the config file at `path`, or `config.toml` if it exists, or the defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_owned(),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };

        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Config::parse(&source)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn parse(source: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// Settings that may be given on the command line or through the environment,
/// taking precedence over the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Address to listen on
    #[arg(long, env = "PASTEBIN_HOST", global = true)]
    pub host: Option<IpAddr>,

    /// Port to listen on
    #[arg(long, env = "PASTEBIN_PORT", global = true)]
    pub port: Option<u16>,

    /// Public base URL for returned paste links
    #[arg(long, env = "PASTEBIN_PUBLIC_BASE_URL", global = true)]
    pub public_base_url: Option<String>,

    /// Database URL, e.g. sqlite://pastebin.db?mode=rwc
    #[arg(long, env = "DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Honor the x-test-now-ms request header
    #[arg(long, env = "PASTEBIN_TEST_MODE", global = true)]
    pub test_mode: bool,
}

impl Overrides {
    pub fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(public_base_url) = self.public_base_url {
            config.public_base_url = Some(public_base_url);
        }
        if let Some(url) = self.database_url {
            config.database.url = url;
        }
        if self.test_mode {
            config.test_mode = true;
        }
    }
}
