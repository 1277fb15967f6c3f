use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::LoadedConfig;

/// Env var holding the Postgres url when `database.url_env` is not set.
pub const DEFAULT_URL_ENV: &str = "KKM_DATABASE_URL";

/// Typed view of the settings the worker consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkerConfig {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// NAME of the env var holding the connection url.
    pub url_env: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Bounds both pool acquisition and connecting.
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url_env: DEFAULT_URL_ENV.to_string(),
            max_connections: 10,
            min_connections: 2,
            acquire_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
    /// JSON-Lines file for failure diagnostics.
    pub error_log_path: Option<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            error_log_path: None,
        }
    }
}

impl WorkerConfig {
    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self> {
        let cfg: WorkerConfig = serde_json::from_value(loaded.config_json.clone())
            .context("config does not match the worker schema")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let db = &self.database;
        if db.url_env.trim().is_empty() {
            bail!("CONFIG_INVALID database.url_env must name an env var");
        }
        if db.max_connections == 0 {
            bail!("CONFIG_INVALID database.max_connections must be > 0");
        }
        if db.min_connections > db.max_connections {
            bail!(
                "CONFIG_INVALID database.min_connections ({}) exceeds max_connections ({})",
                db.min_connections,
                db.max_connections
            );
        }
        if db.acquire_timeout_secs == 0 {
            bail!("CONFIG_INVALID database.acquire_timeout_secs must be > 0");
        }
        Ok(())
    }
}
