use crate::{RecentSnapshot, RecentUpdate, StoredRecent};

/// Recent-activity tracking update.
///
/// `last_update_time` only ever moves backwards: it is set when unknown and
/// otherwise only replaced by a strictly earlier observation.
pub fn plan_recent(stored: &StoredRecent, incoming: &RecentSnapshot) -> RecentUpdate {
    let recent_class = incoming
        .recent_class
        .filter(|&c| c != 0 && Some(c) != stored.recent_class);

    let last_update_time = match stored.last_update_time {
        None => incoming.last_update_time,
        Some(current) => incoming
            .last_update_time
            .filter(|&t| t != 0 && current > t),
    };

    RecentUpdate {
        recent_class,
        last_update_time,
    }
}
