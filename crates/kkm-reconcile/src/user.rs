use crate::{
    ActivityUpdate, NameChange, StoredUserActivity, StoredUserIdentity, UserActivitySnapshot,
    UserIdentityPlan, UserIdentitySnapshot,
};

/// Decide the identity write for one observed account name.
pub fn plan_user_identity(
    stored: Option<&StoredUserIdentity>,
    incoming: &UserIdentitySnapshot,
    now: i64,
) -> UserIdentityPlan {
    let Some(stored) = stored else {
        return UserIdentityPlan::Create {
            username: incoming.username.clone(),
        };
    };

    match stored.updated_at {
        None => UserIdentityPlan::FirstName {
            username: incoming.username.clone(),
        },
        Some(since) if stored.username != incoming.username => UserIdentityPlan::Rename {
            username: incoming.username.clone(),
            history: NameChange {
                old_name: stored.username.clone(),
                start_time: since,
                end_time: now,
            },
        },
        Some(_) => UserIdentityPlan::Unchanged,
    }
}

/// Build the activity write set: a field is included only when observed and
/// different from what is stored. A zero last-battle time is never written.
pub fn plan_user_activity(
    stored: &StoredUserActivity,
    incoming: &UserActivitySnapshot,
) -> ActivityUpdate {
    ActivityUpdate {
        is_active: changed(incoming.is_active, stored.is_active),
        active_level: changed(incoming.active_level, stored.active_level),
        is_public: changed(incoming.is_public, stored.is_public),
        total_battles: changed(incoming.total_battles, stored.total_battles),
        last_battle_time: incoming
            .last_battle_time
            .filter(|&t| t != 0 && Some(t) != stored.last_battle_time),
    }
}

fn changed<T: PartialEq>(incoming: Option<T>, stored: T) -> Option<T> {
    incoming.filter(|v| *v != stored)
}
