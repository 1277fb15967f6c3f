//! kkm-codec
//!
//! Fixed-width binary layouts for the two large per-entity attribute
//! collections stored as blobs:
//! - ship stats: ship id -> derived value, 7-byte big-endian records
//! - clan roster: ordered member ids, 5-byte big-endian blocks
//!
//! Pure, IO-free. Every bound is an explicit bit-width constant and every
//! out-of-bound input is rejected; nothing is truncated or wrapped.

mod error;
mod roster;
mod ship_stats;

pub use error::CodecError;
pub use roster::{
    decode_roster, encode_roster, ROSTER_BLOCK_LEN, ROSTER_EMPTY, ROSTER_ID_BITS,
    ROSTER_ID_LIMIT,
};
pub use ship_stats::{
    decode_ship_stats, encode_ship_stats, ShipStats, SHIP_ID_BITS, SHIP_ID_LIMIT,
    SHIP_RECORD_LEN, SHIP_STATS_EMPTY, SHIP_VALUE_BITS, SHIP_VALUE_LIMIT,
};
