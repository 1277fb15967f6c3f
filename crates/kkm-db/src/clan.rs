use chrono::{DateTime, Utc};
use kkm_codec::CodecError;
use kkm_reconcile::{
    plan_clan_activity, plan_clan_identity, plan_roster, ClanActivityPlan, ClanActivitySnapshot,
    ClanIdentityPlan, ClanIdentitySnapshot, MembershipAction, RosterSnapshot, StoredClanActivity,
    StoredRoster,
};
use serde_json::json;
use sqlx::PgConnection;
use tracing::{debug, info};

use crate::history::{record_membership_change, to_utc, to_utc_opt};
use crate::reconciler::{now_secs, settle};
use crate::{Outcome, ReconcileError, Reconciler};

impl Reconciler {
    /// Create the clan's rows on first sight; otherwise overwrite tag and
    /// league.
    pub async fn reconcile_clan_identity(
        &self,
        snapshot: &ClanIdentitySnapshot,
    ) -> Result<Outcome, CodecError> {
        debug!(clan_id = snapshot.clan_id, "reconcile_clan_identity");
        let result = async {
            let mut tx = self.begin().await?;
            let r = clan_identity_tx(&mut tx, snapshot, now_secs()).await;
            settle(tx, r).await
        }
        .await;
        self.finish("reconcile_clan_identity", snapshot, result)
    }

    pub async fn reconcile_clan_activity(
        &self,
        snapshot: &ClanActivitySnapshot,
    ) -> Result<Outcome, CodecError> {
        debug!(clan_id = snapshot.clan_id, "reconcile_clan_activity");
        let result = async {
            let mut tx = self.begin().await?;
            let r = clan_activity_tx(&mut tx, snapshot, now_secs()).await;
            settle(tx, r).await
        }
        .await;
        self.finish("reconcile_clan_activity", snapshot, result)
    }

    /// Rewrite the stored roster and record joins/leaves since the last one.
    pub async fn reconcile_roster(&self, snapshot: &RosterSnapshot) -> Result<Outcome, CodecError> {
        debug!(
            clan_id = snapshot.clan_id,
            members = snapshot.members.len(),
            "reconcile_roster"
        );
        let result = async {
            let mut tx = self.begin().await?;
            let r = roster_tx(&mut tx, snapshot, now_secs()).await;
            settle(tx, r).await
        }
        .await;
        self.finish("reconcile_roster", snapshot, result)
    }
}

async fn clan_identity_tx(
    conn: &mut PgConnection,
    snapshot: &ClanIdentitySnapshot,
    now: i64,
) -> Result<Outcome, ReconcileError> {
    let existing: Option<(i64,)> = sqlx::query_as(
        r#"
        select clan_id
        from clan_basic
        where region_id = $1 and clan_id = $2
        for update
        "#,
    )
    .bind(snapshot.region_id)
    .bind(snapshot.clan_id)
    .fetch_optional(&mut *conn)
    .await?;

    let now_utc = to_utc(now)?;
    let action = match plan_clan_identity(existing.is_some()) {
        ClanIdentityPlan::Create => {
            sqlx::query(
                r#"
                insert into clan_basic (clan_id, region_id, tag, league, updated_at)
                values ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(snapshot.clan_id)
            .bind(snapshot.region_id)
            .bind(&snapshot.tag)
            .bind(snapshot.league)
            .bind(now_utc)
            .execute(&mut *conn)
            .await?;

            // roster row starts never-synced (updated_at null)
            for table in ["clan_info", "clan_users"] {
                sqlx::query(&format!("insert into {table} (clan_id) values ($1)"))
                    .bind(snapshot.clan_id)
                    .execute(&mut *conn)
                    .await?;
            }
            "created"
        }
        ClanIdentityPlan::Overwrite => {
            sqlx::query(
                r#"
                update clan_basic
                set tag = $3, league = $4, updated_at = $5
                where region_id = $1 and clan_id = $2
                "#,
            )
            .bind(snapshot.region_id)
            .bind(snapshot.clan_id)
            .bind(&snapshot.tag)
            .bind(snapshot.league)
            .bind(now_utc)
            .execute(&mut *conn)
            .await?;
            "overwritten"
        }
    };

    Ok(Outcome::success_with(json!({ "action": action })))
}

type ClanInfoRow = (
    bool,
    Option<i32>,
    Option<i32>,
    Option<i16>,
    Option<i16>,
    Option<i32>,
    Option<DateTime<Utc>>,
);

async fn clan_activity_tx(
    conn: &mut PgConnection,
    snapshot: &ClanActivitySnapshot,
    now: i64,
) -> Result<Outcome, ReconcileError> {
    let row: Option<ClanInfoRow> = sqlx::query_as(
        r#"
        select is_active, season, public_rating, league, division, division_rating, last_battle_at
        from clan_info
        where clan_id = $1
        for update
        "#,
    )
    .bind(snapshot.clan_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((is_active, season, public_rating, league, division, division_rating, last_battle_at)) =
        row
    else {
        return Ok(Outcome::clan_not_found());
    };
    let stored = StoredClanActivity {
        is_active,
        season,
        public_rating,
        league,
        division,
        division_rating,
        last_battle_at: last_battle_at.map(|t| t.timestamp()),
    };

    let action = match plan_clan_activity(&stored, snapshot) {
        ClanActivityPlan::MarkInactive => {
            sqlx::query("update clan_info set is_active = false, updated_at = $2 where clan_id = $1")
                .bind(snapshot.clan_id)
                .bind(to_utc(now)?)
                .execute(&mut *conn)
                .await?;
            "inactive"
        }
        ClanActivityPlan::Update(update) => {
            sqlx::query(
                r#"
                update clan_info set
                  is_active       = true,
                  season          = $2,
                  public_rating   = $3,
                  league          = $4,
                  division        = $5,
                  division_rating = $6,
                  last_battle_at  = coalesce($7, last_battle_at),
                  updated_at      = $8
                where clan_id = $1
                "#,
            )
            .bind(snapshot.clan_id)
            .bind(update.season)
            .bind(update.public_rating)
            .bind(update.league)
            .bind(update.division)
            .bind(update.division_rating)
            .bind(to_utc_opt(update.last_battle_at)?)
            .bind(to_utc(now)?)
            .execute(&mut *conn)
            .await?;
            "updated"
        }
        ClanActivityPlan::Unchanged => "unchanged",
    };

    Ok(Outcome::success_with(json!({ "action": action })))
}

async fn roster_tx(
    conn: &mut PgConnection,
    snapshot: &RosterSnapshot,
    now: i64,
) -> Result<Outcome, ReconcileError> {
    let row: Option<(Option<String>, Option<Vec<u8>>, Option<DateTime<Utc>>)> = sqlx::query_as(
        r#"
        select hash_value, users_data, updated_at
        from clan_users
        where clan_id = $1
        for update
        "#,
    )
    .bind(snapshot.clan_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((hash_value, members_blob, updated_at)) = row else {
        return Ok(Outcome::clan_not_found());
    };
    let stored = StoredRoster {
        hash_value,
        members_blob,
        updated_at: updated_at.map(|t| t.timestamp()),
    };

    let plan = plan_roster(&stored, snapshot)?;

    sqlx::query(
        r#"
        update clan_users
        set hash_value = $2, users_data = $3, updated_at = $4
        where clan_id = $1
        "#,
    )
    .bind(snapshot.clan_id)
    .bind(&plan.hash_value)
    .bind(&plan.members_blob)
    .bind(to_utc(now)?)
    .execute(&mut *conn)
    .await?;

    let (joined, left) = match &plan.diff {
        Some(diff) => {
            for &member in &diff.joined {
                record_membership_change(
                    conn,
                    member_id(member)?,
                    snapshot.clan_id,
                    MembershipAction::Join,
                )
                .await?;
            }
            for &member in &diff.left {
                record_membership_change(
                    conn,
                    member_id(member)?,
                    snapshot.clan_id,
                    MembershipAction::Leave,
                )
                .await?;
            }
            if !diff.is_empty() {
                info!(
                    clan_id = snapshot.clan_id,
                    joined = diff.joined.len(),
                    left = diff.left.len(),
                    "roster changed"
                );
            }
            (diff.joined.len(), diff.left.len())
        }
        None => (0, 0),
    };

    Ok(Outcome::success_with(json!({
        "diffed": plan.diff.is_some(),
        "joined": joined,
        "left": left,
    })))
}

/// Roster ids are below 2^40, so they always fit an account id column.
fn member_id(id: u64) -> Result<i64, ReconcileError> {
    i64::try_from(id).map_err(|_| ReconcileError::Codec(CodecError::MemberIdOutOfRange { id }))
}
