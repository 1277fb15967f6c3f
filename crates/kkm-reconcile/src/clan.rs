use crate::{
    ClanActivityPlan, ClanActivitySnapshot, ClanActivityUpdate, ClanIdentityPlan,
    StoredClanActivity,
};

/// Clan identity is never diffed: an existing row is always overwritten.
pub fn plan_clan_identity(exists: bool) -> ClanIdentityPlan {
    if exists {
        ClanIdentityPlan::Overwrite
    } else {
        ClanIdentityPlan::Create
    }
}

/// Decide the clan activity write.
///
/// - inactive snapshot: only flag + timestamp
/// - active snapshot: full write only when season, public rating or last
///   battle time drifted; an empty last battle time keeps the stored one
pub fn plan_clan_activity(
    stored: &StoredClanActivity,
    incoming: &ClanActivitySnapshot,
) -> ClanActivityPlan {
    if !incoming.is_active {
        return ClanActivityPlan::MarkInactive;
    }

    let drifted = incoming.season != stored.season
        || incoming.public_rating != stored.public_rating
        || incoming.last_battle_at != stored.last_battle_at;
    if !drifted {
        return ClanActivityPlan::Unchanged;
    }

    ClanActivityPlan::Update(ClanActivityUpdate {
        season: incoming.season,
        public_rating: incoming.public_rating,
        league: incoming.league,
        division: incoming.division,
        division_rating: incoming.division_rating,
        last_battle_at: incoming.last_battle_at.filter(|&t| t != 0),
    })
}
