use std::collections::BTreeSet;

use kkm_codec::{decode_roster, encode_roster, CodecError};

use crate::{RosterDiff, RosterPlan, RosterSnapshot, StoredRoster};

/// Sync state of one stored roster row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RosterState {
    /// Row exists but was never written; no baseline to diff against.
    NeverSynced,
    Synced,
}

impl RosterState {
    pub fn of(stored: &StoredRoster) -> Self {
        if stored.updated_at.is_some() {
            RosterState::Synced
        } else {
            RosterState::NeverSynced
        }
    }
}

/// Plan a roster write.
///
/// The incoming members are encoded first so an out-of-range id fails before
/// anything else. The join/leave diff is computed only for a synced row whose
/// stored hash differs from the incoming one; the blob and hash are rewritten
/// either way.
pub fn plan_roster(stored: &StoredRoster, incoming: &RosterSnapshot) -> Result<RosterPlan, CodecError> {
    let members_blob = encode_roster(&incoming.members)?;

    let hash_moved = stored.hash_value.as_deref() != Some(incoming.hash_value.as_str());
    let diff = match RosterState::of(stored) {
        RosterState::Synced if hash_moved => {
            let previous = decode_roster(stored.members_blob.as_deref().unwrap_or_default())?;
            Some(diff_members(&previous, &incoming.members))
        }
        _ => None,
    };

    Ok(RosterPlan {
        hash_value: incoming.hash_value.clone(),
        members_blob,
        diff,
    })
}

fn diff_members(previous: &[u64], current: &[u64]) -> RosterDiff {
    let before: BTreeSet<u64> = previous.iter().copied().collect();
    let after: BTreeSet<u64> = current.iter().copied().collect();

    RosterDiff {
        joined: after.difference(&before).copied().collect(),
        left: before.difference(&after).copied().collect(),
    }
}
