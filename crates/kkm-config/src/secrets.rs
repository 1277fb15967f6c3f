//! Runtime resolution of the database url.
//!
//! Config carries only the env var NAME. Errors mention the name, never the
//! value, and `Debug` redacts the resolved url.

use anyhow::{bail, Result};

use crate::WorkerConfig;

#[derive(Clone)]
pub struct ResolvedDatabaseUrl {
    pub env_var: String,
    pub url: String,
}

impl std::fmt::Debug for ResolvedDatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedDatabaseUrl")
            .field("env_var", &self.env_var)
            .field("url", &"<REDACTED>")
            .finish()
    }
}

/// Read the url from the env var named by `database.url_env`.
pub fn resolve_database_url(cfg: &WorkerConfig) -> Result<ResolvedDatabaseUrl> {
    let name = cfg.database.url_env.trim();
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(ResolvedDatabaseUrl {
            env_var: name.to_string(),
            url: v,
        }),
        _ => bail!("SECRETS_MISSING: required env var '{}' (database url) is not set or empty", name),
    }
}
