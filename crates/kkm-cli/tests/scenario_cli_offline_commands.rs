//! DB-free CLI commands: classify, config-hash, errlog find.

use predicates::prelude::*;
use std::fs;

#[allow(deprecated)]
fn kkm() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("kkm-cli").expect("binary built")
}

#[test]
fn classify_prints_tier() {
    kkm()
        .args([
            "classify",
            "--total-battles",
            "100",
            "--last-battle-time",
            "1700000000",
            "--now",
            "1700043200",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("active_level=2"));

    kkm()
        .args([
            "classify",
            "--hidden",
            "--total-battles",
            "100",
            "--last-battle-time",
            "1700000000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("active_level=0"));

    kkm()
        .args(["classify", "--total-battles", "0", "--last-battle-time", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("active_level=1"));
}

#[test]
fn config_hash_is_stable_and_warns_on_unused_keys() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let local = dir.path().join("local.yaml");
    fs::write(&base, "database:\n  max_connections: 10\nlogging:\n  filter: info\n").unwrap();
    fs::write(&local, "database:\n  max_conections: 4\n").unwrap();

    let run = |paths: &[&std::path::Path]| {
        let out = kkm()
            .arg("config-hash")
            .args(paths)
            .output()
            .expect("run kkm");
        assert!(out.status.success());
        (
            String::from_utf8(out.stdout).unwrap(),
            String::from_utf8(out.stderr).unwrap(),
        )
    };

    let (a, _) = run(&[&base]);
    let (b, _) = run(&[&base]);
    assert_eq!(a, b);
    assert!(a.starts_with("config_hash="));

    let (c, warn) = run(&[&base, &local]);
    assert_ne!(a, c);
    assert!(warn.contains("/database/max_conections"));
}

#[test]
fn config_hash_refuses_secret_literals() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bad.yaml");
    fs::write(&p, "database:\n  url_env: \"postgres://kkm:pw@db/kkm\"\n").unwrap();

    kkm()
        .arg("config-hash")
        .arg(&p)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"))
        .stderr(predicate::str::contains("pw@").not());
}

#[test]
fn errlog_find_prints_the_matching_record() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("errors.jsonl");
    let id = uuid_like();
    let line = serde_json::json!({
        "error_id": id,
        "ts_utc": "2026-01-01T00:00:00Z",
        "error_type": "database",
        "error_name": "IntegrityError",
        "operation": "reconcile_user_identity",
        "error_args": "UserIdentitySnapshot { .. }",
        "error_info": "SQLSTATE 23505: duplicate key value",
    });
    fs::write(&log, format!("{line}\n")).unwrap();

    kkm()
        .args(["errlog", "find", "--error-id", id])
        .arg("--path")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("IntegrityError"));

    kkm()
        .args(["errlog", "find", "--error-id", "00000000-0000-4000-8000-000000000000"])
        .arg("--path")
        .arg(&log)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no record"));
}

fn uuid_like() -> &'static str {
    "5b8f3f2e-6c1a-4d9e-9a53-0c2f6e1d7b44"
}
