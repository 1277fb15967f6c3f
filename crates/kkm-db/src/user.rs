use chrono::{DateTime, Utc};
use kkm_codec::{decode_ship_stats, CodecError, ShipStats};
use kkm_reconcile::{
    plan_recent, plan_ship_stats, plan_user_activity, plan_user_identity, RecentSnapshot,
    ShipStatsSnapshot, ShipStatsWrite, StoredRecent, StoredUserActivity, StoredUserIdentity,
    UserActivitySnapshot, UserIdentityPlan, UserIdentitySnapshot,
};
use serde_json::json;
use sqlx::PgConnection;
use tracing::debug;

use crate::history::{record_name_change, to_utc, to_utc_opt};
use crate::reconciler::{now_secs, settle};
use crate::{Outcome, ReconcileError, Reconciler};

impl Reconciler {
    /// Create the account's rows on first sight; otherwise track its name.
    pub async fn reconcile_user_identity(
        &self,
        snapshot: &UserIdentitySnapshot,
    ) -> Result<Outcome, CodecError> {
        debug!(account_id = snapshot.account_id, "reconcile_user_identity");
        let result = async {
            let mut tx = self.begin().await?;
            let r = user_identity_tx(&mut tx, snapshot, now_secs()).await;
            settle(tx, r).await
        }
        .await;
        self.finish("reconcile_user_identity", snapshot, result)
    }

    /// Write the observed activity fields that differ from the stored row.
    pub async fn reconcile_user_activity(
        &self,
        snapshot: &UserActivitySnapshot,
    ) -> Result<Outcome, CodecError> {
        debug!(account_id = snapshot.account_id, "reconcile_user_activity");
        let result = async {
            let mut tx = self.begin().await?;
            let r = user_activity_tx(&mut tx, snapshot, now_secs()).await;
            settle(tx, r).await
        }
        .await;
        self.finish("reconcile_user_activity", snapshot, result)
    }

    /// Point one account at a clan, or at none. A zero clan id clears it.
    pub async fn set_membership(
        &self,
        account_id: i64,
        clan_id: Option<i64>,
    ) -> Result<Outcome, CodecError> {
        debug!(account_id, ?clan_id, "set_membership");
        let result = async {
            let mut tx = self.begin().await?;
            let r = set_memberships_tx(&mut tx, &[account_id], clan_id, now_secs()).await;
            settle(tx, r).await
        }
        .await;
        self.finish("set_membership", &(account_id, clan_id), result)
    }

    /// Batch form of [`Reconciler::set_membership`]: one statement, one
    /// transaction. An empty list writes nothing.
    pub async fn set_memberships(
        &self,
        account_ids: &[i64],
        clan_id: Option<i64>,
    ) -> Result<Outcome, CodecError> {
        debug!(n = account_ids.len(), ?clan_id, "set_memberships");
        if account_ids.is_empty() {
            return Ok(Outcome::success());
        }
        let result = async {
            let mut tx = self.begin().await?;
            let r = set_memberships_tx(&mut tx, account_ids, clan_id, now_secs()).await;
            settle(tx, r).await
        }
        .await;
        self.finish("set_memberships", &(account_ids, clan_id), result)
    }

    /// Store the battle count and, when a hash is supplied, the packed
    /// per-ship stats.
    pub async fn reconcile_ship_stats(
        &self,
        snapshot: &ShipStatsSnapshot,
    ) -> Result<Outcome, CodecError> {
        debug!(account_id = snapshot.account_id, "reconcile_ship_stats");
        let result = async {
            let write = plan_ship_stats(snapshot)?;
            let mut tx = self.begin().await?;
            let r = ship_stats_tx(&mut tx, snapshot.account_id, &write, now_secs()).await;
            settle(tx, r).await
        }
        .await;
        self.finish("reconcile_ship_stats", snapshot, result)
    }

    /// Decode the stored per-ship stats. `None` when the row or blob is absent.
    pub async fn load_ship_stats(&self, account_id: i64) -> Result<Option<ShipStats>, ReconcileError> {
        let row: Option<(Option<Vec<u8>>,)> =
            sqlx::query_as("select ships_data from user_ships where account_id = $1")
                .bind(account_id)
                .fetch_optional(self.pool())
                .await?;

        match row.and_then(|(blob,)| blob) {
            Some(blob) => Ok(Some(decode_ship_stats(&blob)?)),
            None => Ok(None),
        }
    }

    /// Recent-activity tracking. A missing row is not an error.
    pub async fn reconcile_recent(&self, snapshot: &RecentSnapshot) -> Result<Outcome, CodecError> {
        debug!(account_id = snapshot.account_id, "reconcile_recent");
        let result = async {
            let mut tx = self.begin().await?;
            let r = recent_tx(&mut tx, snapshot).await;
            settle(tx, r).await
        }
        .await;
        self.finish("reconcile_recent", snapshot, result)
    }
}

async fn user_identity_tx(
    conn: &mut PgConnection,
    snapshot: &UserIdentitySnapshot,
    now: i64,
) -> Result<Outcome, ReconcileError> {
    let row: Option<(String, Option<DateTime<Utc>>)> = sqlx::query_as(
        r#"
        select username, updated_at
        from user_basic
        where region_id = $1 and account_id = $2
        for update
        "#,
    )
    .bind(snapshot.region_id)
    .bind(snapshot.account_id)
    .fetch_optional(&mut *conn)
    .await?;

    let stored = row.map(|(username, updated_at)| StoredUserIdentity {
        username,
        updated_at: updated_at.map(|t| t.timestamp()),
    });

    let plan = plan_user_identity(stored.as_ref(), snapshot, now);
    let now_utc = to_utc(now)?;
    let action = match &plan {
        UserIdentityPlan::Create { username } => {
            sqlx::query(
                r#"
                insert into user_basic (account_id, region_id, username, updated_at)
                values ($1, $2, $3, $4)
                "#,
            )
            .bind(snapshot.account_id)
            .bind(snapshot.region_id)
            .bind(username)
            .bind(now_utc)
            .execute(&mut *conn)
            .await?;

            for table in ["user_info", "user_ships", "user_clan"] {
                sqlx::query(&format!("insert into {table} (account_id) values ($1)"))
                    .bind(snapshot.account_id)
                    .execute(&mut *conn)
                    .await?;
            }
            "created"
        }
        UserIdentityPlan::FirstName { username } | UserIdentityPlan::Rename { username, .. } => {
            sqlx::query(
                r#"
                update user_basic
                set username = $3, updated_at = $4
                where region_id = $1 and account_id = $2
                "#,
            )
            .bind(snapshot.region_id)
            .bind(snapshot.account_id)
            .bind(username)
            .bind(now_utc)
            .execute(&mut *conn)
            .await?;

            if let UserIdentityPlan::Rename { history, .. } = &plan {
                record_name_change(conn, snapshot.account_id, history).await?;
                "renamed"
            } else {
                "named"
            }
        }
        UserIdentityPlan::Unchanged => "unchanged",
    };

    Ok(Outcome::success_with(json!({ "action": action })))
}

async fn user_activity_tx(
    conn: &mut PgConnection,
    snapshot: &UserActivitySnapshot,
    now: i64,
) -> Result<Outcome, ReconcileError> {
    let row: Option<(bool, i16, bool, i64, Option<DateTime<Utc>>)> = sqlx::query_as(
        r#"
        select is_active, active_level, is_public, total_battles, last_battle_at
        from user_info
        where account_id = $1
        for update
        "#,
    )
    .bind(snapshot.account_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((is_active, active_level, is_public, total_battles, last_battle_at)) = row else {
        return Ok(Outcome::user_not_found());
    };
    let stored = StoredUserActivity {
        is_active,
        active_level,
        is_public,
        total_battles,
        last_battle_time: last_battle_at.map(|t| t.timestamp()),
    };

    let incoming = snapshot.clone().with_derived_level(now);
    let update = plan_user_activity(&stored, &incoming);
    let fields = update.changed_fields();

    // updated_at is stamped even when no field changed
    sqlx::query(
        r#"
        update user_info set
          is_active      = coalesce($2, is_active),
          active_level   = coalesce($3, active_level),
          is_public      = coalesce($4, is_public),
          total_battles  = coalesce($5, total_battles),
          last_battle_at = coalesce($6, last_battle_at),
          updated_at     = $7
        where account_id = $1
        "#,
    )
    .bind(snapshot.account_id)
    .bind(update.is_active)
    .bind(update.active_level)
    .bind(update.is_public)
    .bind(update.total_battles)
    .bind(to_utc_opt(update.last_battle_time)?)
    .bind(to_utc(now)?)
    .execute(&mut *conn)
    .await?;

    Ok(Outcome::success_with(json!({ "updated_fields": fields })))
}

async fn set_memberships_tx(
    conn: &mut PgConnection,
    account_ids: &[i64],
    clan_id: Option<i64>,
    now: i64,
) -> Result<Outcome, ReconcileError> {
    let clan_id = clan_id.filter(|&c| c != 0);
    let res = sqlx::query(
        r#"
        update user_clan
        set clan_id = $2, updated_at = $3
        where account_id = any($1)
        "#,
    )
    .bind(account_ids.to_vec())
    .bind(clan_id)
    .bind(to_utc(now)?)
    .execute(&mut *conn)
    .await?;

    Ok(Outcome::success_with(json!({ "rows": res.rows_affected() })))
}

async fn ship_stats_tx(
    conn: &mut PgConnection,
    account_id: i64,
    write: &ShipStatsWrite,
    now: i64,
) -> Result<Outcome, ReconcileError> {
    let exists: Option<(i64,)> =
        sqlx::query_as("select account_id from user_ships where account_id = $1 for update")
            .bind(account_id)
            .fetch_optional(&mut *conn)
            .await?;
    if exists.is_none() {
        return Ok(Outcome::user_not_found());
    }

    match &write.blob {
        Some((hash_value, blob)) => {
            sqlx::query(
                r#"
                update user_ships
                set battles_count = $2, hash_value = $3, ships_data = $4, updated_at = $5
                where account_id = $1
                "#,
            )
            .bind(account_id)
            .bind(write.battles_count)
            .bind(hash_value)
            .bind(blob)
            .bind(to_utc(now)?)
            .execute(&mut *conn)
            .await?;
        }
        None => {
            sqlx::query(
                r#"
                update user_ships
                set battles_count = $2, updated_at = $3
                where account_id = $1
                "#,
            )
            .bind(account_id)
            .bind(write.battles_count)
            .bind(to_utc(now)?)
            .execute(&mut *conn)
            .await?;
        }
    }

    Ok(Outcome::success_with(
        json!({ "blob_written": write.blob.is_some() }),
    ))
}

async fn recent_tx(
    conn: &mut PgConnection,
    snapshot: &RecentSnapshot,
) -> Result<Outcome, ReconcileError> {
    let row: Option<(Option<i16>, Option<DateTime<Utc>>)> = sqlx::query_as(
        r#"
        select recent_class, last_update_at
        from recent
        where region_id = $1 and account_id = $2
        for update
        "#,
    )
    .bind(snapshot.region_id)
    .bind(snapshot.account_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((recent_class, last_update_at)) = row else {
        return Ok(Outcome::success());
    };
    let stored = StoredRecent {
        recent_class,
        last_update_time: last_update_at.map(|t| t.timestamp()),
    };

    let update = plan_recent(&stored, snapshot);
    if update.is_empty() {
        return Ok(Outcome::success());
    }

    sqlx::query(
        r#"
        update recent set
          recent_class   = coalesce($3, recent_class),
          last_update_at = coalesce($4, last_update_at)
        where region_id = $1 and account_id = $2
        "#,
    )
    .bind(snapshot.region_id)
    .bind(snapshot.account_id)
    .bind(update.recent_class)
    .bind(to_utc_opt(update.last_update_time)?)
    .execute(&mut *conn)
    .await?;

    Ok(Outcome::success())
}
