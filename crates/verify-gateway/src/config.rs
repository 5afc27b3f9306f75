//! Gateway configuration, sourced from environment variables.
//!
//! Secrets (channel secret, access token, database URL) have no
//! defaults: a missing value fails `Config::load()` and aborts
//! startup. Nothing per-request depends on configuration being
//! re-validated.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// LINE platform credentials and endpoint
    pub line: LineConfig,

    /// Registry database connection
    pub database: DatabaseConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineConfig {
    /// Channel secret used to verify webhook signatures (required)
    pub channel_secret: String,

    /// Channel access token for the Messaging API (required)
    pub channel_access_token: String,

    /// Messaging API base URL
    #[serde(default = "default_line_api_url")]
    pub api_url: String,

    /// Outbound request timeout
    #[serde(default = "default_send_timeout", with = "humantime_serde")]
    pub send_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL (required)
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Pool acquire timeout; a timed-out acquire is reported to the
    /// user as a transient busy condition
    #[serde(default = "default_acquire_timeout", with = "humantime_serde")]
    pub acquire_timeout: Duration,

    /// Per-statement execution timeout, bounding queries on a stalled
    /// connection the same way acquire_timeout bounds the pool
    #[serde(default = "default_query_timeout", with = "humantime_serde")]
    pub query_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_line_api_url() -> String {
    "https://api.line.me".into()
}

fn default_send_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_query_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Required credentials must be non-empty. A blank channel secret
    /// would start a service that rejects every delivery, so it is a
    /// startup failure, not a per-request one.
    fn validate(&self) -> Result<()> {
        if self.line.channel_secret.trim().is_empty() {
            anyhow::bail!("line.channel_secret must not be empty");
        }
        if self.line.channel_access_token.trim().is_empty() {
            anyhow::bail!("line.channel_access_token must not be empty");
        }
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url must not be empty");
        }
        Ok(())
    }
}
