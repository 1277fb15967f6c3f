//! kkm-reconcile
//!
//! Diff half of entity reconciliation: given what is stored and what was
//! observed, decide the minimal write for each entity kind.
//!
//! Decisions:
//! - Identity rows are created once; user renames of a named row are recorded
//!   in history, a first real name is not
//! - Activity rows only write fields that are present and differ
//! - Clan activity writes only on season/rating/last-battle drift
//! - Roster join/leave is diffed only when the caller's hash moved, but the
//!   blob is always rewritten
//!
//! Deterministic, pure logic. No IO. Evaluation time is always passed in.

mod activity;
mod clan;
mod recent;
mod roster;
mod ships;
mod types;
mod user;

pub use activity::{
    classify, ACTIVITY_TIER_BOUNDS, SECONDS_PER_DAY, TIER_DORMANT, TIER_HIDDEN, TIER_NO_DATA,
};
pub use clan::{plan_clan_activity, plan_clan_identity};
pub use recent::plan_recent;
pub use roster::{plan_roster, RosterState};
pub use ships::{plan_ship_stats, ShipStatsPlanError};
pub use types::*;
pub use user::{plan_user_activity, plan_user_identity};
