use thiserror::Error;

/// Codec failures. Range variants reject inputs on encode; the remaining
/// variants reject malformed blobs on decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("ship id {id} out of range (must be < 2^34)")]
    ShipIdOutOfRange { id: u64 },

    #[error("value {value} for ship {id} out of range (must be < 2^22)")]
    ShipValueOutOfRange { id: u64, value: u32 },

    #[error("roster member id {id} out of range (must be < 2^40)")]
    MemberIdOutOfRange { id: u64 },

    #[error("{codec} blob has invalid length {len} (blocks are {block} bytes)")]
    Length {
        codec: &'static str,
        len: usize,
        block: usize,
    },

    #[error("ship id {id} appears more than once in stats blob")]
    DuplicateShipId { id: u64 },
}

impl CodecError {
    /// Input value/id outside its bit-width bound.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            CodecError::ShipIdOutOfRange { .. }
                | CodecError::ShipValueOutOfRange { .. }
                | CodecError::MemberIdOutOfRange { .. }
        )
    }

    /// Blob that cannot have been produced by the encoder.
    pub fn is_format(&self) -> bool {
        !self.is_range()
    }
}
