//! Persistence half of entity reconciliation (Postgres via sqlx).
//!
//! The [`Reconciler`] owns an explicitly constructed pool; every public
//! operation is one transaction and returns an [`Outcome`] envelope.

mod clan;
mod error;
mod history;
mod outcome;
mod reconciler;
mod region;
mod user;

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;

pub use error::{classify_sqlstate, DatastoreErrorKind, ReconcileError};
pub use history::{
    fetch_membership_history, fetch_name_history, record_membership_change, record_name_change,
    MembershipHistoryRow, NameHistoryRow,
};
pub use outcome::{Outcome, ResponseCode, Status};
pub use reconciler::Reconciler;
pub use sqlx::PgPool;

pub const ENV_DB_URL: &str = "KKM_DATABASE_URL";

/// Pool sizing. The pool is shared by every concurrent reconciliation; once
/// `max_connections` are checked out, acquisition blocks up to
/// `acquire_timeout` (which also bounds connecting).
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

impl PoolSettings {
    fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Connect a pool to `url`.
pub async fn connect(url: &str, settings: &PoolSettings) -> Result<PgPool> {
    settings
        .options()
        .connect(url)
        .await
        .context("failed to connect to Postgres")
}

/// Build a pool without opening any connection yet; connections are made on
/// first acquisition.
pub fn connect_lazy(url: &str, settings: &PoolSettings) -> Result<PgPool> {
    settings
        .options()
        .connect_lazy(url)
        .context("invalid Postgres connection url")
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema = current_schema() and table_name = 'user_basic'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus {
        ok: one == 1,
        has_entity_tables: exists,
    })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_entity_tables: bool,
}
