use kkm_codec::ShipStats;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// User identity
// ---------------------------------------------------------------------------

/// Observed account name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentitySnapshot {
    pub region_id: i16,
    pub account_id: i64,
    pub username: String,
}

/// Stored `(username, updated_at)`. `updated_at == None` means the row still
/// holds an auto-generated default name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredUserIdentity {
    pub username: String,
    pub updated_at: Option<i64>,
}

/// One closed name interval for the history table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameChange {
    pub old_name: String,
    pub start_time: i64,
    pub end_time: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserIdentityPlan {
    /// First observation: create identity + activity + ship stats + membership
    /// rows with the final name.
    Create { username: String },
    /// Row still holds its default name: set the first real name, no history.
    FirstName { username: String },
    /// Named row renamed: overwrite and close the previous interval.
    Rename { username: String, history: NameChange },
    Unchanged,
}

// ---------------------------------------------------------------------------
// User activity
// ---------------------------------------------------------------------------

/// Observed activity counters. `None` means "not observed", never "clear".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivitySnapshot {
    pub account_id: i64,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub active_level: Option<i16>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub total_battles: Option<i64>,
    #[serde(default)]
    pub last_battle_time: Option<i64>,
}

impl UserActivitySnapshot {
    /// Fill `active_level` from the classifier when the caller left it out but
    /// supplied everything the classifier needs.
    pub fn with_derived_level(mut self, now: i64) -> Self {
        if self.active_level.is_none() {
            if let (Some(is_public), Some(total), Some(last)) =
                (self.is_public, self.total_battles, self.last_battle_time)
            {
                let tier = crate::classify(is_public, total, last, now);
                self.active_level = Some(i16::from(tier));
            }
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredUserActivity {
    pub is_active: bool,
    pub active_level: i16,
    pub is_public: bool,
    pub total_battles: i64,
    pub last_battle_time: Option<i64>,
}

/// Typed optional-field update: only `Some` fields are written.
/// `updated_at` is always stamped by the writer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityUpdate {
    pub is_active: Option<bool>,
    pub active_level: Option<i16>,
    pub is_public: Option<bool>,
    pub total_battles: Option<i64>,
    pub last_battle_time: Option<i64>,
}

impl ActivityUpdate {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Column names in the write set, stable order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.is_active.is_some() {
            out.push("is_active");
        }
        if self.active_level.is_some() {
            out.push("active_level");
        }
        if self.is_public.is_some() {
            out.push("is_public");
        }
        if self.total_battles.is_some() {
            out.push("total_battles");
        }
        if self.last_battle_time.is_some() {
            out.push("last_battle_at");
        }
        out
    }
}

impl StoredUserActivity {
    /// Apply an update the same way the writer does.
    pub fn apply(&mut self, update: &ActivityUpdate) {
        if let Some(v) = update.is_active {
            self.is_active = v;
        }
        if let Some(v) = update.active_level {
            self.active_level = v;
        }
        if let Some(v) = update.is_public {
            self.is_public = v;
        }
        if let Some(v) = update.total_battles {
            self.total_battles = v;
        }
        if let Some(v) = update.last_battle_time {
            self.last_battle_time = Some(v);
        }
    }
}

// ---------------------------------------------------------------------------
// Clan identity / activity
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClanIdentitySnapshot {
    pub region_id: i16,
    pub clan_id: i64,
    pub tag: String,
    pub league: i16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClanIdentityPlan {
    /// First observation: identity + activity + roster rows.
    Create,
    /// Unconditional tag/league/timestamp overwrite.
    Overwrite,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClanActivitySnapshot {
    pub clan_id: i64,
    pub is_active: bool,
    #[serde(default)]
    pub season: Option<i32>,
    #[serde(default)]
    pub public_rating: Option<i32>,
    #[serde(default)]
    pub league: Option<i16>,
    #[serde(default)]
    pub division: Option<i16>,
    #[serde(default)]
    pub division_rating: Option<i32>,
    #[serde(default)]
    pub last_battle_at: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredClanActivity {
    pub is_active: bool,
    pub season: Option<i32>,
    pub public_rating: Option<i32>,
    pub league: Option<i16>,
    pub division: Option<i16>,
    pub division_rating: Option<i32>,
    pub last_battle_at: Option<i64>,
}

/// Full rating write. `last_battle_at == None` leaves the stored value alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClanActivityUpdate {
    pub season: Option<i32>,
    pub public_rating: Option<i32>,
    pub league: Option<i16>,
    pub division: Option<i16>,
    pub division_rating: Option<i32>,
    pub last_battle_at: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClanActivityPlan {
    MarkInactive,
    Update(ClanActivityUpdate),
    Unchanged,
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Observed member list plus the caller's opaque equality token for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub clan_id: i64,
    pub hash_value: String,
    pub members: Vec<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredRoster {
    pub hash_value: Option<String>,
    pub members_blob: Option<Vec<u8>>,
    pub updated_at: Option<i64>,
}

/// Members that appeared / disappeared since the stored roster. Sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RosterDiff {
    pub joined: Vec<u64>,
    pub left: Vec<u64>,
}

impl RosterDiff {
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty()
    }
}

/// Roster write: the blob is always rewritten; the diff is present only when
/// it was computed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterPlan {
    pub hash_value: String,
    pub members_blob: Vec<u8>,
    pub diff: Option<RosterDiff>,
}

/// History action codes as stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipAction {
    Join,
    Leave,
}

impl MembershipAction {
    pub fn code(self) -> i16 {
        match self {
            MembershipAction::Join => 1,
            MembershipAction::Leave => 2,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(MembershipAction::Join),
            2 => Some(MembershipAction::Leave),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Ship stats
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipStatsSnapshot {
    pub account_id: i64,
    pub battles_count: i64,
    #[serde(default)]
    pub hash_value: Option<String>,
    #[serde(default)]
    pub ships: Option<ShipStats>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShipStatsWrite {
    pub battles_count: i64,
    /// `(hash_value, packed stats)`; `None` writes only the battle count.
    pub blob: Option<(String, Vec<u8>)>,
}

// ---------------------------------------------------------------------------
// Recent-activity tracking
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSnapshot {
    pub region_id: i16,
    pub account_id: i64,
    #[serde(default)]
    pub recent_class: Option<i16>,
    #[serde(default)]
    pub last_update_time: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredRecent {
    pub recent_class: Option<i16>,
    pub last_update_time: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecentUpdate {
    pub recent_class: Option<i16>,
    pub last_update_time: Option<i64>,
}

impl RecentUpdate {
    pub fn is_empty(&self) -> bool {
        self.recent_class.is_none() && self.last_update_time.is_none()
    }
}
