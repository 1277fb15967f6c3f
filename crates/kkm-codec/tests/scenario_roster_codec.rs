//! Roster codec: 40-bit member ids in 5-byte blocks.

use kkm_codec::{
    decode_roster, encode_roster, CodecError, ROSTER_BLOCK_LEN, ROSTER_EMPTY, ROSTER_ID_LIMIT,
};

#[test]
fn empty_roster_encodes_to_canonical_zero_block() {
    assert_eq!(encode_roster(&[]).unwrap(), ROSTER_EMPTY.to_vec());
    assert!(decode_roster(&ROSTER_EMPTY).unwrap().is_empty());
}

#[test]
fn lone_zero_member_shares_the_empty_encoding() {
    let blob = encode_roster(&[0]).unwrap();
    assert_eq!(blob, ROSTER_EMPTY.to_vec());
    assert!(decode_roster(&blob).unwrap().is_empty());
}

#[test]
fn decoded_order_matches_encoded_order() {
    let members = vec![2_023_567_890, 7, 1_000_000_001, ROSTER_ID_LIMIT - 1];
    let blob = encode_roster(&members).unwrap();
    assert_eq!(blob.len(), members.len() * ROSTER_BLOCK_LEN);
    assert_eq!(decode_roster(&blob).unwrap(), members);
}

#[test]
fn aligned_blob_reencodes_to_identical_bytes() {
    let blob: Vec<u8> = vec![
        0x00, 0x78, 0x9a, 0xbc, 0xde, //
        0xff, 0xff, 0xff, 0xff, 0xff, //
        0x00, 0x00, 0x00, 0x00, 0x01,
    ];
    let members = decode_roster(&blob).unwrap();
    assert_eq!(encode_roster(&members).unwrap(), blob);
}

#[test]
fn member_id_above_forty_bits_is_rejected() {
    let err = encode_roster(&[1, ROSTER_ID_LIMIT + 1]).unwrap_err();
    assert_eq!(
        err,
        CodecError::MemberIdOutOfRange {
            id: ROSTER_ID_LIMIT + 1
        }
    );
    assert!(err.is_range());
}

#[test]
fn member_id_at_two_pow_40_is_rejected() {
    assert!(encode_roster(&[ROSTER_ID_LIMIT]).is_err());
}

#[test]
fn misaligned_blob_is_a_format_error() {
    let err = decode_roster(&[0, 0, 0, 0, 1, 0, 0]).unwrap_err();
    assert!(err.is_format());
    assert!(matches!(err, CodecError::Length { len: 7, block: 5, .. }));
}

#[test]
fn zero_length_blob_is_a_format_error() {
    assert!(matches!(
        decode_roster(&[]),
        Err(CodecError::Length { len: 0, .. })
    ));
}
