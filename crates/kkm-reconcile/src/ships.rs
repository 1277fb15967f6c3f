use kkm_codec::{encode_ship_stats, CodecError};
use thiserror::Error;

use crate::{ShipStatsSnapshot, ShipStatsWrite};

#[derive(Debug, Error)]
pub enum ShipStatsPlanError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A hash without the stats it covers would overwrite the stored blob.
    #[error("ship stats hash {hash:?} supplied without ship data")]
    MissingShips { hash: String },
}

/// The packed blob is rewritten only when the caller supplied a (non-empty)
/// hash for it; otherwise just the battle count moves.
pub fn plan_ship_stats(incoming: &ShipStatsSnapshot) -> Result<ShipStatsWrite, ShipStatsPlanError> {
    let blob = match incoming.hash_value.as_deref() {
        Some(hash) if !hash.is_empty() => {
            let stats = incoming
                .ships
                .as_ref()
                .ok_or_else(|| ShipStatsPlanError::MissingShips {
                    hash: hash.to_string(),
                })?;
            Some((hash.to_string(), encode_ship_stats(stats)?))
        }
        _ => None,
    };

    Ok(ShipStatsWrite {
        battles_count: incoming.battles_count,
        blob,
    })
}
