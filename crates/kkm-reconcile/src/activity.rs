//! Activity tier: a 0..=9 summary of profile visibility and play recency.
//!
//! | tier | meaning                              |
//! | ---- | ------------------------------------ |
//! | 0    | profile hidden                       |
//! | 1    | no battles / no last-battle time     |
//! | 2..8 | last battle within 1d/3d/7d/30d/90d/180d/360d |
//! | 9    | older than 360 days                  |

pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub const TIER_HIDDEN: u8 = 0;
pub const TIER_NO_DATA: u8 = 1;
pub const TIER_DORMANT: u8 = 9;

/// Inclusive age bounds, first match wins.
pub const ACTIVITY_TIER_BOUNDS: [(i64, u8); 7] = [
    (SECONDS_PER_DAY, 2),
    (3 * SECONDS_PER_DAY, 3),
    (7 * SECONDS_PER_DAY, 4),
    (30 * SECONDS_PER_DAY, 5),
    (90 * SECONDS_PER_DAY, 6),
    (180 * SECONDS_PER_DAY, 7),
    (360 * SECONDS_PER_DAY, 8),
];

/// Map visibility/activity counters to a tier. Times are unix seconds.
pub fn classify(is_public: bool, total_battles: i64, last_battle_time: i64, now: i64) -> u8 {
    if !is_public {
        return TIER_HIDDEN;
    }
    if total_battles == 0 || last_battle_time == 0 {
        return TIER_NO_DATA;
    }

    let age = now - last_battle_time;
    ACTIVITY_TIER_BOUNDS
        .iter()
        .find(|(bound, _)| age <= *bound)
        .map(|(_, tier)| *tier)
        .unwrap_or(TIER_DORMANT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_strictly_increasing() {
        for w in ACTIVITY_TIER_BOUNDS.windows(2) {
            assert!(w[0].0 < w[1].0);
            assert_eq!(w[0].1 + 1, w[1].1);
        }
    }
}
