//! Append-only history of renames and clan membership changes.
//!
//! The writers take the caller's connection so the history row lands in the
//! same transaction as the state change it describes.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use kkm_reconcile::{MembershipAction, NameChange};
use sqlx::{PgConnection, PgPool};

use crate::ReconcileError;

/// Epoch seconds to a bindable timestamp.
pub(crate) fn to_utc(secs: i64) -> Result<DateTime<Utc>, ReconcileError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| ReconcileError::Generic(anyhow!("timestamp out of range: {secs}")))
}

pub(crate) fn to_utc_opt(secs: Option<i64>) -> Result<Option<DateTime<Utc>>, ReconcileError> {
    secs.map(to_utc).transpose()
}

/// Record one closed name interval.
pub async fn record_name_change(
    conn: &mut PgConnection,
    account_id: i64,
    change: &NameChange,
) -> Result<(), ReconcileError> {
    sqlx::query(
        r#"
        insert into user_history (account_id, username, start_time, end_time)
        values ($1, $2, $3, $4)
        "#,
    )
    .bind(account_id)
    .bind(&change.old_name)
    .bind(to_utc(change.start_time)?)
    .bind(to_utc(change.end_time)?)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Record one join or leave.
pub async fn record_membership_change(
    conn: &mut PgConnection,
    account_id: i64,
    clan_id: i64,
    action: MembershipAction,
) -> Result<(), ReconcileError> {
    sqlx::query(
        r#"
        insert into clan_history (account_id, clan_id, action_type)
        values ($1, $2, $3)
        "#,
    )
    .bind(account_id)
    .bind(clan_id)
    .bind(action.code())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameHistoryRow {
    pub username: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipHistoryRow {
    pub account_id: i64,
    pub action: MembershipAction,
    pub created_at: DateTime<Utc>,
}

/// Previous names of an account, oldest first.
pub async fn fetch_name_history(pool: &PgPool, account_id: i64) -> Result<Vec<NameHistoryRow>> {
    let rows: Vec<(String, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
        r#"
        select username, start_time, end_time
        from user_history
        where account_id = $1
        order by id asc
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
    .context("fetch_name_history failed")?;

    Ok(rows
        .into_iter()
        .map(|(username, start_time, end_time)| NameHistoryRow {
            username,
            start_time,
            end_time,
        })
        .collect())
}

/// Membership events of a clan in insertion order.
pub async fn fetch_membership_history(
    pool: &PgPool,
    clan_id: i64,
) -> Result<Vec<MembershipHistoryRow>> {
    let rows: Vec<(i64, i16, DateTime<Utc>)> = sqlx::query_as(
        r#"
        select account_id, action_type, created_at
        from clan_history
        where clan_id = $1
        order by id asc
        "#,
    )
    .bind(clan_id)
    .fetch_all(pool)
    .await
    .context("fetch_membership_history failed")?;

    rows.into_iter()
        .map(|(account_id, code, created_at)| {
            let action = MembershipAction::from_code(code)
                .ok_or_else(|| anyhow!("unknown clan_history action_type {code}"))?;
            Ok(MembershipHistoryRow {
                account_id,
                action,
                created_at,
            })
        })
        .collect()
}
