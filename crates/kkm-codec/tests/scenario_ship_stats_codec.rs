//! Ship-stats codec: bounds, canonical empty form, malformed blobs.

use kkm_codec::{
    decode_ship_stats, encode_ship_stats, CodecError, ShipStats, SHIP_ID_LIMIT, SHIP_RECORD_LEN,
    SHIP_STATS_EMPTY, SHIP_VALUE_LIMIT,
};

fn stats(pairs: &[(u64, u32)]) -> ShipStats {
    pairs.iter().copied().collect()
}

#[test]
fn empty_mapping_encodes_to_canonical_zero_record() {
    let blob = encode_ship_stats(&ShipStats::new()).unwrap();
    assert_eq!(blob, SHIP_STATS_EMPTY.to_vec());
    assert!(decode_ship_stats(&blob).unwrap().is_empty());
}

#[test]
fn zero_ship_with_zero_value_shares_the_empty_encoding() {
    let blob = encode_ship_stats(&stats(&[(0, 0)])).unwrap();
    assert_eq!(blob, SHIP_STATS_EMPTY.to_vec());
    assert!(decode_ship_stats(&blob).unwrap().is_empty());
}

#[test]
fn empty_blob_decodes_to_empty_mapping() {
    assert!(decode_ship_stats(&[]).unwrap().is_empty());
}

#[test]
fn mapping_survives_encode_decode() {
    let m = stats(&[
        (3_751_786_480, 1_523),
        (4_179_506_896, 0),
        (1, 4_194_303),
        (SHIP_ID_LIMIT - 1, 7),
    ]);
    let blob = encode_ship_stats(&m).unwrap();
    assert_eq!(blob.len(), m.len() * SHIP_RECORD_LEN);
    assert_eq!(decode_ship_stats(&blob).unwrap(), m);
}

#[test]
fn records_are_written_in_ascending_id_order() {
    let blob = encode_ship_stats(&stats(&[(9, 1), (2, 1)])).unwrap();
    let first = encode_ship_stats(&stats(&[(2, 1)])).unwrap();
    assert_eq!(&blob[..SHIP_RECORD_LEN], first.as_slice());
}

#[test]
fn ship_id_at_two_pow_34_is_rejected() {
    let err = encode_ship_stats(&stats(&[(SHIP_ID_LIMIT, 1)])).unwrap_err();
    assert_eq!(err, CodecError::ShipIdOutOfRange { id: SHIP_ID_LIMIT });
    assert!(err.is_range());
}

#[test]
fn value_at_two_pow_22_is_rejected() {
    let value = SHIP_VALUE_LIMIT as u32;
    let err = encode_ship_stats(&stats(&[(10, value)])).unwrap_err();
    assert_eq!(err, CodecError::ShipValueOutOfRange { id: 10, value });
    assert!(err.is_range());
}

#[test]
fn one_bad_record_fails_the_whole_mapping() {
    let m = stats(&[(1, 1), (2, SHIP_VALUE_LIMIT as u32), (3, 3)]);
    assert!(encode_ship_stats(&m).is_err());
}

#[test]
fn length_not_multiple_of_seven_is_a_format_error() {
    let mut blob = encode_ship_stats(&stats(&[(1, 1)])).unwrap();
    blob.push(0);
    let err = decode_ship_stats(&blob).unwrap_err();
    assert!(err.is_format());
    assert!(matches!(err, CodecError::Length { len: 8, block: 7, .. }));
}

#[test]
fn repeated_ship_id_is_a_format_error() {
    let one = encode_ship_stats(&stats(&[(42, 1)])).unwrap();
    let two = encode_ship_stats(&stats(&[(42, 2)])).unwrap();
    let blob = [one, two].concat();
    assert_eq!(
        decode_ship_stats(&blob).unwrap_err(),
        CodecError::DuplicateShipId { id: 42 }
    );
}
