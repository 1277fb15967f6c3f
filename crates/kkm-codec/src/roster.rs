use crate::CodecError;

/// Member ids occupy one 40-bit block each.
pub const ROSTER_ID_BITS: u32 = 40;
pub const ROSTER_BLOCK_LEN: usize = 5;

/// Exclusive upper bound for member ids. A 5-byte block cannot hold 2^40.
pub const ROSTER_ID_LIMIT: u64 = 1 << ROSTER_ID_BITS;

/// Canonical encoding of an empty roster.
pub const ROSTER_EMPTY: [u8; ROSTER_BLOCK_LEN] = [0; ROSTER_BLOCK_LEN];

/// Pack member ids into consecutive 5-byte big-endian blocks, preserving order.
///
/// An empty roster encodes to [`ROSTER_EMPTY`]. The roster `[0]` packs to the
/// same block and therefore decodes back as empty.
pub fn encode_roster(members: &[u64]) -> Result<Vec<u8>, CodecError> {
    if members.is_empty() {
        return Ok(ROSTER_EMPTY.to_vec());
    }

    let mut out = Vec::with_capacity(members.len() * ROSTER_BLOCK_LEN);
    for &id in members {
        if id >= ROSTER_ID_LIMIT {
            return Err(CodecError::MemberIdOutOfRange { id });
        }
        out.extend_from_slice(&id.to_be_bytes()[8 - ROSTER_BLOCK_LEN..]);
    }
    Ok(out)
}

/// Unpack a roster blob in stored order.
///
/// The length must be a non-zero multiple of 5: the encoder never produces
/// an empty blob. The canonical all-zero block decodes to an empty roster.
pub fn decode_roster(blob: &[u8]) -> Result<Vec<u64>, CodecError> {
    if blob.is_empty() || blob.len() % ROSTER_BLOCK_LEN != 0 {
        return Err(CodecError::Length {
            codec: "roster",
            len: blob.len(),
            block: ROSTER_BLOCK_LEN,
        });
    }
    if blob == ROSTER_EMPTY {
        return Ok(Vec::new());
    }

    Ok(blob
        .chunks_exact(ROSTER_BLOCK_LEN)
        .map(|chunk| {
            let mut wide = [0u8; 8];
            wide[8 - ROSTER_BLOCK_LEN..].copy_from_slice(chunk);
            u64::from_be_bytes(wide)
        })
        .collect())
}
