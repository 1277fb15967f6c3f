//! Config hash stability.
//!
//! - Same input twice gives the same hash.
//! - Key order inside YAML does not change the hash.
//! - Different values give different hashes.
//! - Overlays deep-merge over the base.

use kkm_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
database:
  url_env: "KKM_DATABASE_URL"
  max_connections: 10
  min_connections: 2
logging:
  filter: "info"
"#;

const BASE_YAML_REORDERED: &str = r#"
logging:
  filter: "info"
database:
  min_connections: 2
  max_connections: 10
  url_env: "KKM_DATABASE_URL"
"#;

const OVERLAY_YAML: &str = r#"
database:
  max_connections: 32
logging:
  error_log_path: "/var/log/kkm/errors.jsonl"
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
    assert_eq!(a.config_hash.len(), 64);
}

#[test]
fn reordered_keys_produce_same_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}

#[test]
fn different_values_produce_different_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}

#[test]
fn overlay_merges_without_dropping_siblings() {
    let merged = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    let v = &merged.config_json;
    assert_eq!(*v.pointer("/database/max_connections").unwrap(), 32);
    assert_eq!(*v.pointer("/database/min_connections").unwrap(), 2);
    assert_eq!(*v.pointer("/logging/filter").unwrap(), "info");
    assert_eq!(
        *v.pointer("/logging/error_log_path").unwrap(),
        "/var/log/kkm/errors.jsonl"
    );
}

#[test]
fn empty_overlay_changes_nothing() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, ""]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}
