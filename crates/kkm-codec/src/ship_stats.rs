use std::collections::BTreeMap;

use crate::CodecError;

/// Ship id occupies the high 34 bits of a record.
pub const SHIP_ID_BITS: u32 = 34;
/// Derived value occupies the low 22 bits of a record.
pub const SHIP_VALUE_BITS: u32 = 22;
/// 34 + 22 = 56 bits = 7 bytes.
pub const SHIP_RECORD_LEN: usize = 7;

/// Exclusive upper bound for ship ids.
pub const SHIP_ID_LIMIT: u64 = 1 << SHIP_ID_BITS;
/// Exclusive upper bound for values.
pub const SHIP_VALUE_LIMIT: u64 = 1 << SHIP_VALUE_BITS;

/// Canonical encoding of an empty mapping.
pub const SHIP_STATS_EMPTY: [u8; SHIP_RECORD_LEN] = [0; SHIP_RECORD_LEN];

const VALUE_MASK: u64 = SHIP_VALUE_LIMIT - 1;

/// Ship id -> derived value. Ordered so encoding is deterministic.
pub type ShipStats = BTreeMap<u64, u32>;

/// Pack a stats mapping into consecutive 7-byte big-endian records in
/// iteration (ascending id) order.
///
/// An empty mapping encodes to [`SHIP_STATS_EMPTY`], never to an empty blob.
/// That record is also the encoding of `{0: 0}`, so that one mapping decodes
/// back as empty.
pub fn encode_ship_stats(stats: &ShipStats) -> Result<Vec<u8>, CodecError> {
    if stats.is_empty() {
        return Ok(SHIP_STATS_EMPTY.to_vec());
    }

    let mut out = Vec::with_capacity(stats.len() * SHIP_RECORD_LEN);
    for (&id, &value) in stats {
        out.extend_from_slice(&pack_record(id, value)?);
    }
    Ok(out)
}

/// Unpack a stats blob.
///
/// Empty input and the canonical all-zero record both decode to an empty
/// mapping. Any length that is not a multiple of 7 is a format error, as is a
/// ship id repeated inside one blob.
pub fn decode_ship_stats(blob: &[u8]) -> Result<ShipStats, CodecError> {
    if blob.len() % SHIP_RECORD_LEN != 0 {
        return Err(CodecError::Length {
            codec: "ship stats",
            len: blob.len(),
            block: SHIP_RECORD_LEN,
        });
    }

    let mut out = ShipStats::new();
    if blob == SHIP_STATS_EMPTY {
        return Ok(out);
    }

    for chunk in blob.chunks_exact(SHIP_RECORD_LEN) {
        let (id, value) = unpack_record(chunk);
        if out.insert(id, value).is_some() {
            return Err(CodecError::DuplicateShipId { id });
        }
    }
    Ok(out)
}

fn pack_record(id: u64, value: u32) -> Result<[u8; SHIP_RECORD_LEN], CodecError> {
    if id >= SHIP_ID_LIMIT {
        return Err(CodecError::ShipIdOutOfRange { id });
    }
    if u64::from(value) >= SHIP_VALUE_LIMIT {
        return Err(CodecError::ShipValueOutOfRange { id, value });
    }

    let raw = (id << SHIP_VALUE_BITS) | u64::from(value);
    let wide = raw.to_be_bytes();

    let mut record = [0u8; SHIP_RECORD_LEN];
    record.copy_from_slice(&wide[8 - SHIP_RECORD_LEN..]);
    Ok(record)
}

fn unpack_record(chunk: &[u8]) -> (u64, u32) {
    let mut wide = [0u8; 8];
    wide[8 - SHIP_RECORD_LEN..].copy_from_slice(chunk);
    let raw = u64::from_be_bytes(wide);

    // Masked to 22 bits, always fits in u32.
    (raw >> SHIP_VALUE_BITS, (raw & VALUE_MASK) as u32)
}
