use kkm_reconcile::*;

fn stored() -> StoredClanActivity {
    StoredClanActivity {
        is_active: true,
        season: Some(27),
        public_rating: Some(1_450),
        league: Some(2),
        division: Some(1),
        division_rating: Some(50),
        last_battle_at: Some(1_750_000_000),
    }
}

fn active() -> ClanActivitySnapshot {
    ClanActivitySnapshot {
        clan_id: 500_000_001,
        is_active: true,
        season: Some(27),
        public_rating: Some(1_450),
        league: Some(2),
        division: Some(1),
        division_rating: Some(50),
        last_battle_at: Some(1_750_000_000),
    }
}

#[test]
fn inactive_snapshot_only_flips_flag() {
    let snap = ClanActivitySnapshot {
        is_active: false,
        season: Some(99),
        ..active()
    };
    assert_eq!(plan_clan_activity(&stored(), &snap), ClanActivityPlan::MarkInactive);
}

#[test]
fn no_drift_in_tracked_fields_writes_nothing() {
    // Division changes alone do not trigger a write.
    let snap = ClanActivitySnapshot {
        division: Some(3),
        ..active()
    };
    assert_eq!(plan_clan_activity(&stored(), &snap), ClanActivityPlan::Unchanged);
}

#[test]
fn rating_drift_writes_full_row() {
    let snap = ClanActivitySnapshot {
        public_rating: Some(1_500),
        last_battle_at: Some(1_760_000_000),
        ..active()
    };
    match plan_clan_activity(&stored(), &snap) {
        ClanActivityPlan::Update(up) => {
            assert_eq!(up.public_rating, Some(1_500));
            assert_eq!(up.last_battle_at, Some(1_760_000_000));
        }
        other => panic!("expected update, got {other:?}"),
    }
}

#[test]
fn empty_last_battle_keeps_stored_value() {
    let snap = ClanActivitySnapshot {
        season: Some(28),
        last_battle_at: None,
        ..active()
    };
    let ClanActivityPlan::Update(up) = plan_clan_activity(&stored(), &snap) else {
        panic!("expected update");
    };
    assert_eq!(up.last_battle_at, None);
    assert_eq!(up.season, Some(28));
}

#[test]
fn existing_clan_identity_is_always_overwritten() {
    assert_eq!(plan_clan_identity(true), ClanIdentityPlan::Overwrite);
    assert_eq!(plan_clan_identity(false), ClanIdentityPlan::Create);
}
