//! Command handler modules for kkm-cli.
//!
//! Shared utilities used by multiple command paths live here.

pub mod reconcile;

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use kkm_config::WorkerConfig;
use kkm_db::{Outcome, PgPool, PoolSettings, Reconciler};
use serde::de::DeserializeOwned;

/// Typed worker config from `--config` layers; defaults when none are given.
pub fn load_worker_config(paths: &[String]) -> Result<WorkerConfig> {
    if paths.is_empty() {
        return Ok(WorkerConfig::default());
    }
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = kkm_config::load_layered_yaml(&path_refs)?;
    WorkerConfig::from_loaded(&loaded)
}

pub fn pool_settings(cfg: &WorkerConfig) -> PoolSettings {
    PoolSettings {
        max_connections: cfg.database.max_connections,
        min_connections: cfg.database.min_connections,
        acquire_timeout: Duration::from_secs(cfg.database.acquire_timeout_secs),
    }
}

pub async fn connect(cfg: &WorkerConfig) -> Result<PgPool> {
    let url = kkm_config::resolve_database_url(cfg)?;
    kkm_db::connect(&url.url, &pool_settings(cfg)).await
}

pub async fn reconciler(cfg: &WorkerConfig) -> Result<Reconciler> {
    let rec = Reconciler::new(connect(cfg).await?);
    match &cfg.logging.error_log_path {
        Some(path) => rec.with_error_log(path),
        None => Ok(rec),
    }
}

/// Read a JSON document from a file. A UTF-8 BOM is tolerated.
pub fn load_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read snapshot file failed: {}", path))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    let raw = std::str::from_utf8(bytes).context("snapshot file must be UTF-8 text")?;
    serde_json::from_str(raw.trim())
        .with_context(|| format!("snapshot file {} does not match the expected shape", path))
}

pub fn print_outcome(outcome: &Outcome) -> Result<()> {
    println!("{}", serde_json::to_string(outcome)?);
    Ok(())
}
