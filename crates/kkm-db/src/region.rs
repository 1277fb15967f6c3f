use anyhow::anyhow;
use kkm_codec::CodecError;
use serde_json::json;
use sqlx::PgConnection;
use tracing::{debug, info};

use crate::reconciler::settle;
use crate::{Outcome, ReconcileError, Reconciler};

impl Reconciler {
    /// Record the region's current game version. The region row must already
    /// exist.
    pub async fn reconcile_game_version(
        &self,
        region_id: i16,
        version: &str,
    ) -> Result<Outcome, CodecError> {
        debug!(region_id, version, "reconcile_game_version");
        let result = async {
            let mut tx = self.begin().await?;
            let r = game_version_tx(&mut tx, region_id, version).await;
            settle(tx, r).await
        }
        .await;
        self.finish("reconcile_game_version", &(region_id, version), result)
    }

    /// Connectivity check: reports the server version string.
    pub async fn ping(&self) -> Result<Outcome, CodecError> {
        let result = async {
            let (version,): (String,) = sqlx::query_as("select version()")
                .fetch_one(self.pool())
                .await?;
            Ok::<_, ReconcileError>(Outcome::success_with(json!({ "version": version })))
        }
        .await;
        self.finish("ping", &(), result)
    }
}

async fn game_version_tx(
    conn: &mut PgConnection,
    region_id: i16,
    version: &str,
) -> Result<Outcome, ReconcileError> {
    let row: Option<(String,)> = sqlx::query_as(
        "select game_version from region_version where region_id = $1 for update",
    )
    .bind(region_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((stored,)) = row else {
        return Err(anyhow!("region_version row missing for region {region_id}").into());
    };

    if stored != version {
        sqlx::query("update region_version set game_version = $2 where region_id = $1")
            .bind(region_id)
            .bind(version)
            .execute(&mut *conn)
            .await?;
        info!(region_id, from = %stored, to = version, "game version changed");
    }

    Ok(Outcome::success())
}
