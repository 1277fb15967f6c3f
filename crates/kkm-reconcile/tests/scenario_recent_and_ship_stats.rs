use kkm_codec::{decode_ship_stats, ShipStats, SHIP_ID_LIMIT};
use kkm_reconcile::*;

fn recent(class: Option<i16>, last: Option<i64>) -> RecentSnapshot {
    RecentSnapshot {
        region_id: 1,
        account_id: 7,
        recent_class: class,
        last_update_time: last,
    }
}

#[test]
fn unknown_last_update_is_set_from_snapshot() {
    let up = plan_recent(&StoredRecent::default(), &recent(None, Some(1_000)));
    assert_eq!(up.last_update_time, Some(1_000));
}

#[test]
fn last_update_only_moves_backwards() {
    let stored = StoredRecent {
        recent_class: Some(30),
        last_update_time: Some(1_000),
    };
    assert_eq!(plan_recent(&stored, &recent(None, Some(2_000))).last_update_time, None);
    assert_eq!(plan_recent(&stored, &recent(None, Some(500))).last_update_time, Some(500));
    assert_eq!(plan_recent(&stored, &recent(None, Some(0))).last_update_time, None);
}

#[test]
fn recent_class_written_only_when_it_differs() {
    let stored = StoredRecent {
        recent_class: Some(30),
        last_update_time: Some(1_000),
    };
    assert!(plan_recent(&stored, &recent(Some(30), None)).is_empty());
    assert_eq!(plan_recent(&stored, &recent(Some(60), None)).recent_class, Some(60));
}

#[test]
fn ship_blob_written_only_with_hash() {
    let ships: ShipStats = [(3_751_786_480u64, 12u32)].into_iter().collect();
    let with_hash = ShipStatsSnapshot {
        account_id: 1,
        battles_count: 900,
        hash_value: Some("abc".to_string()),
        ships: Some(ships.clone()),
    };
    let write = plan_ship_stats(&with_hash).unwrap();
    let (hash, blob) = write.blob.unwrap();
    assert_eq!(hash, "abc");
    assert_eq!(decode_ship_stats(&blob).unwrap(), ships);

    let no_hash = ShipStatsSnapshot {
        hash_value: None,
        ..with_hash
    };
    let write = plan_ship_stats(&no_hash).unwrap();
    assert_eq!(write.battles_count, 900);
    assert!(write.blob.is_none());
}

#[test]
fn out_of_range_ship_id_fails_the_plan() {
    let snap = ShipStatsSnapshot {
        account_id: 1,
        battles_count: 1,
        hash_value: Some("h".to_string()),
        ships: Some([(SHIP_ID_LIMIT, 1u32)].into_iter().collect()),
    };
    match plan_ship_stats(&snap) {
        Err(ShipStatsPlanError::Codec(e)) => assert!(e.is_range()),
        other => panic!("expected codec range error, got {other:?}"),
    }
}

#[test]
fn hash_without_ships_is_rejected() {
    let snap = ShipStatsSnapshot {
        account_id: 1,
        battles_count: 5,
        hash_value: Some("h".to_string()),
        ships: None,
    };
    match plan_ship_stats(&snap) {
        Err(ShipStatsPlanError::MissingShips { hash }) => assert_eq!(hash, "h"),
        other => panic!("expected missing ships, got {other:?}"),
    }

    let empty_hash = ShipStatsSnapshot {
        hash_value: Some(String::new()),
        ..snap
    };
    let write = plan_ship_stats(&empty_hash).unwrap();
    assert_eq!(write.battles_count, 5);
    assert!(write.blob.is_none());
}
