#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Integration tests for container files: save/load, peek, legacy documents.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use confseal_container::{
    generate_filename, is_encrypted, is_encrypted_file, load, load_with_prompt, peek_metadata,
    save, save_with_params, ContainerError, ContainerKind, ContainerMetadata, SecuritySettings,
};
use confseal_crypto_core::Pbkdf2Params;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

const FAST: Pbkdf2Params = Pbkdf2Params { iterations: 1_000 };

const PASSWORD: &str = "Tr0ub4dor&3-horse";

fn sample_config() -> Value {
    json!({
        "folders": [
            {"name": "Shared", "rules": [{"name": "allow-web", "action": "allow", "ports": [80, 443]}]},
            {"name": "Branch", "rules": []}
        ],
        "snippets": [{"name": "baseline", "enabled": true}],
        "unicode": "zürich ✓"
    })
}

fn provenance() -> ContainerMetadata {
    ContainerMetadata {
        name: Some("Production Backup".into()),
        description: Some("nightly pull".into()),
        source_tenant: Some("acme-corp".into()),
        source_tsg: Some("1234567890".into()),
        pull_date: Some("2026-10-14T23:00:00Z".into()),
        item_count: Some(311),
        folders_count: Some(2),
        snippets_count: Some(1),
        ..ContainerMetadata::default()
    }
}

fn save_encrypted(dir: &Path, config: &Value) -> PathBuf {
    let path = dir.join("prod.confseal");
    save_with_params(&path, config, Some(PASSWORD), Some(provenance()), &FAST).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn encrypted_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());

    let loaded: Value = load(&path, Some(PASSWORD)).unwrap();
    assert_eq!(loaded, sample_config());
}

#[test]
fn plain_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lab.json");
    save(&path, &sample_config(), None, Some(provenance())).unwrap();

    let loaded: Value = load(&path, None).unwrap();
    assert_eq!(loaded, sample_config());
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Snapshot {
    tenant: String,
    rules: Vec<String>,
}

#[test]
fn typed_config_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("typed.confseal");
    let snapshot = Snapshot {
        tenant: "acme".into(),
        rules: vec!["allow dns".into(), "deny any".into()],
    };
    save_with_params(&path, &snapshot, Some(PASSWORD), None, &FAST).unwrap();

    let loaded: Snapshot = load(&path, Some(PASSWORD)).unwrap();
    assert_eq!(loaded, snapshot);
}

#[test]
fn encrypted_file_has_expected_shape() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let document = read_json(&path);

    assert_eq!(document["format"], "encrypted-v1");
    assert_eq!(document["encryption"]["algorithm"], "AES-256-GCM");
    assert_eq!(document["encryption"]["kdf"], "PBKDF2-HMAC-SHA256");
    assert_eq!(document["encryption"]["iterations"], 1_000);
    assert!(document["encryption"]["salt"].is_string());
    assert!(document["data"].is_string());
    assert_eq!(document["metadata"]["name"], "Production Backup");
    assert_eq!(document["metadata"]["version"], "1.0");
    assert!(document.get("config").is_none());

    // The plaintext must not leak into the envelope.
    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("allow-web"));
}

#[test]
fn default_work_factor_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("default.confseal");
    save(&path, &json!({"k": "v"}), Some(PASSWORD), None).unwrap();

    assert_eq!(read_json(&path)["encryption"]["iterations"], 480_000);
    let loaded: Value = load(&path, Some(PASSWORD)).unwrap();
    assert_eq!(loaded, json!({"k": "v"}));
}

#[test]
fn settings_drive_new_saves() {
    let dir = TempDir::new().unwrap();
    let settings = SecuritySettings {
        kdf_iterations: 2_000,
        ..SecuritySettings::default()
    };
    settings.save(dir.path()).unwrap();

    let reloaded = SecuritySettings::load(dir.path());
    let path = dir.path().join("cfg.confseal");
    save_with_params(&path, &json!([]), Some(PASSWORD), None, &reloaded.kdf_params()).unwrap();
    assert_eq!(read_json(&path)["encryption"]["iterations"], 2_000);
}

// ---------------------------------------------------------------------------
// Rejection
// ---------------------------------------------------------------------------

#[test]
fn wrong_password_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());

    let err = load::<Value>(&path, Some("tr0ub4dor&3-horse")).unwrap_err();
    assert!(matches!(err, ContainerError::WrongPasswordOrCorrupted));
}

#[test]
fn tampered_payload_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let mut document = read_json(&path);

    let data = document["data"].as_str().unwrap().to_owned();
    let mut chars: Vec<char> = data.chars().collect();
    chars[30] = if chars[30] == 'A' { 'B' } else { 'A' };
    document["data"] = Value::String(chars.into_iter().collect());
    write_json(&path, &document);

    let err = load::<Value>(&path, Some(PASSWORD)).unwrap_err();
    assert!(matches!(err, ContainerError::WrongPasswordOrCorrupted));
}

#[test]
fn altered_salt_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let mut document = read_json(&path);
    document["encryption"]["salt"] = json!("AAAAAAAAAAAAAAAAAAAAAA==");
    write_json(&path, &document);

    let err = load::<Value>(&path, Some(PASSWORD)).unwrap_err();
    assert!(matches!(err, ContainerError::WrongPasswordOrCorrupted));
}

#[test]
fn metadata_edits_do_not_affect_decryption() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let mut document = read_json(&path);
    document["metadata"] = json!({"name": "Renamed", "reviewed_by": "ops"});
    write_json(&path, &document);

    let loaded: Value = load(&path, Some(PASSWORD)).unwrap();
    assert_eq!(loaded, sample_config());
    assert_eq!(peek_metadata(&path).unwrap().metadata.name.as_deref(), Some("Renamed"));
}

#[test]
fn missing_salt_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let mut document = read_json(&path);
    document["encryption"].as_object_mut().unwrap().remove("salt");
    write_json(&path, &document);

    let err = load::<Value>(&path, Some(PASSWORD)).unwrap_err();
    assert!(matches!(err, ContainerError::MissingSalt));
}

#[test]
fn encrypted_without_password_is_refused() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    assert!(matches!(
        load::<Value>(&path, None).unwrap_err(),
        ContainerError::PasswordRequired
    ));
}

// ---------------------------------------------------------------------------
// Detection and peek
// ---------------------------------------------------------------------------

#[test]
fn detection_does_not_need_a_password() {
    let dir = TempDir::new().unwrap();
    let encrypted = save_encrypted(dir.path(), &sample_config());
    let plain = dir.path().join("plain.json");
    save(&plain, &sample_config(), None, None).unwrap();
    let legacy = dir.path().join("legacy.json");
    write_json(&legacy, &sample_config());

    assert!(is_encrypted_file(&encrypted));
    assert!(!is_encrypted_file(&plain));
    assert!(!is_encrypted_file(&legacy));
    assert!(is_encrypted(&read_json(&encrypted)));
    assert!(!is_encrypted(&read_json(&plain)));
}

#[test]
fn peek_encrypted_without_password() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());

    let peeked = peek_metadata(&path).unwrap();
    assert!(peeked.encrypted);
    assert_eq!(peeked.metadata.name.as_deref(), Some("Production Backup"));
    assert_eq!(peeked.metadata.source_tenant.as_deref(), Some("acme-corp"));
    assert_eq!(peeked.metadata.item_count, Some(311));
    assert!(peeked.metadata.created_at.is_some());

    let flat = serde_json::to_value(&peeked).unwrap();
    assert_eq!(flat["encrypted"], true);
    assert_eq!(flat["name"], "Production Backup");
}

#[test]
fn peek_plain() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lab.json");
    save(&path, &sample_config(), None, Some(ContainerMetadata::named("Lab"))).unwrap();

    let peeked = peek_metadata(&path).unwrap();
    assert!(!peeked.encrypted);
    assert_eq!(peeked.metadata, ContainerMetadata::named("Lab"));
}

#[test]
fn unknown_metadata_keys_survive_resave() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let mut document = read_json(&path);
    document["metadata"]["ticket"] = json!("CHG-42");
    write_json(&path, &document);

    let metadata = peek_metadata(&path).unwrap().metadata;
    let config: Value = load(&path, Some(PASSWORD)).unwrap();
    save_with_params(&path, &config, Some(PASSWORD), Some(metadata), &FAST).unwrap();

    assert_eq!(read_json(&path)["metadata"]["ticket"], "CHG-42");
}

#[test]
fn plain_load_ignores_mistyped_metadata() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lab.json");
    write_json(
        &path,
        &json!({
            "format": "plain-v1",
            "metadata": {"name": "Lab", "item_count": "12", "version": 2},
            "config": sample_config()
        }),
    );

    let loaded: Value = load(&path, None).unwrap();
    assert_eq!(loaded, sample_config());

    let peeked = peek_metadata(&path).unwrap();
    assert_eq!(peeked.metadata.name.as_deref(), Some("Lab"));
    assert_eq!(peeked.metadata.item_count, None);
    assert_eq!(peeked.metadata.extra.get("item_count"), Some(&json!("12")));
}

#[test]
fn encrypted_load_ignores_mistyped_metadata() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let mut document = read_json(&path);
    document["metadata"]["item_count"] = json!(-1);
    document["metadata"]["created_at"] = json!({"epoch": 0});
    write_json(&path, &document);

    let loaded: Value = load(&path, Some(PASSWORD)).unwrap();
    assert_eq!(loaded, sample_config());

    let peeked = peek_metadata(&path).unwrap();
    assert!(peeked.encrypted);
    assert_eq!(peeked.metadata.item_count, None);
    assert_eq!(peeked.metadata.name.as_deref(), Some("Production Backup"));
}

#[test]
fn resave_replaces_mistyped_defaulted_fields() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let mut document = read_json(&path);
    document["metadata"]["version"] = json!(2);
    write_json(&path, &document);

    let metadata = peek_metadata(&path).unwrap().metadata;
    let config: Value = load(&path, Some(PASSWORD)).unwrap();
    save_with_params(&path, &config, Some(PASSWORD), Some(metadata), &FAST).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("\"version\"").count(), 1);
    assert_eq!(read_json(&path)["metadata"]["version"], "1.0");
}

// ---------------------------------------------------------------------------
// Legacy documents
// ---------------------------------------------------------------------------

#[test]
fn legacy_document_loads_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old-export.json");
    write_json(&path, &sample_config());

    let loaded: Value = load(&path, None).unwrap();
    assert_eq!(loaded, sample_config());
    let with_password: Value = load(&path, Some(PASSWORD)).unwrap();
    assert_eq!(with_password, sample_config());
}

#[test]
fn legacy_peek_uses_embedded_metadata() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old-export.json");
    write_json(
        &path,
        &json!({"metadata": {"name": "Old export", "item_count": 7}, "folders": []}),
    );

    let peeked = peek_metadata(&path).unwrap();
    assert!(!peeked.encrypted);
    assert_eq!(peeked.metadata.name.as_deref(), Some("Old export"));
    assert_eq!(peeked.metadata.item_count, Some(7));
}

#[test]
fn legacy_peek_falls_back_to_file_stem() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("branch-offices.json");
    write_json(&path, &json!({"folders": [], "snippets": []}));

    let peeked = peek_metadata(&path).unwrap();
    assert!(!peeked.encrypted);
    assert_eq!(peeked.metadata.name.as_deref(), Some("branch-offices"));
    assert!(peeked.metadata.extra.contains_key("folders"));
}

#[test]
fn legacy_peek_tolerates_numeric_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("firewall.json");
    write_json(&path, &json!({"version": 2, "rules": []}));

    let peeked = peek_metadata(&path).unwrap();
    assert!(!peeked.encrypted);
    assert_eq!(peeked.metadata.name.as_deref(), Some("firewall"));
    assert_eq!(peeked.metadata.version, None);
    assert_eq!(peeked.metadata.extra.get("version"), Some(&json!(2)));

    let loaded: Value = load(&path, None).unwrap();
    assert_eq!(loaded, json!({"version": 2, "rules": []}));
}

#[test]
fn unknown_format_tag_is_treated_as_legacy() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("future.json");
    let document = json!({"format": "encrypted-v9", "data": "opaque"});
    write_json(&path, &document);

    assert!(!is_encrypted_file(&path));
    let loaded: Value = load(&path, None).unwrap();
    assert_eq!(loaded, document);
}

// ---------------------------------------------------------------------------
// Password prompt
// ---------------------------------------------------------------------------

#[test]
fn prompt_retries_until_correct() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let asked = RefCell::new(Vec::new());

    let loaded: Value = load_with_prompt(&path, 3, |attempt| {
        asked.borrow_mut().push(attempt);
        Some(if attempt < 3 { "nope".into() } else { PASSWORD.into() })
    })
    .unwrap();

    assert_eq!(loaded, sample_config());
    assert_eq!(*asked.borrow(), vec![1, 2, 3]);
}

#[test]
fn prompt_gives_up_after_max_attempts() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let mut calls = 0;

    let err = load_with_prompt::<Value, _>(&path, 2, |_| {
        calls += 1;
        Some("nope".into())
    })
    .unwrap_err();

    assert!(matches!(err, ContainerError::WrongPasswordOrCorrupted));
    assert_eq!(calls, 2);
}

#[test]
fn prompt_cancel_stops_immediately() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let mut calls = 0;

    let err = load_with_prompt::<Value, _>(&path, 5, |_| {
        calls += 1;
        None
    })
    .unwrap_err();

    assert!(matches!(err, ContainerError::PasswordRequired));
    assert_eq!(calls, 1);
}

#[test]
fn prompt_is_not_called_for_plain_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lab.json");
    save(&path, &sample_config(), None, None).unwrap();

    let loaded: Value = load_with_prompt(&path, 3, |_| -> Option<String> {
        panic!("prompted for a plain file")
    })
    .unwrap();
    assert_eq!(loaded, sample_config());
}

#[test]
fn prompt_does_not_retry_structural_errors() {
    let dir = TempDir::new().unwrap();
    let path = save_encrypted(dir.path(), &sample_config());
    let mut document = read_json(&path);
    document["encryption"]["kdf"] = json!("argon2id");
    write_json(&path, &document);
    let mut calls = 0;

    let err = load_with_prompt::<Value, _>(&path, 3, |_| {
        calls += 1;
        Some(PASSWORD.into())
    })
    .unwrap_err();

    assert!(matches!(err, ContainerError::UnsupportedFormat(_)));
    assert_eq!(calls, 1);
}

// ---------------------------------------------------------------------------
// Filenames
// ---------------------------------------------------------------------------

#[test]
fn generated_filename_matches_kind() {
    let dir = TempDir::new().unwrap();
    let name = generate_filename("My Company!! Config", true);
    assert!(name.starts_with("my-company-config_"));
    assert!(name.ends_with(".confseal"));
    assert_eq!(
        name.len(),
        "my-company-config_".len() + "YYYYMMDD_HHMMSS".len() + ".confseal".len()
    );

    let path = dir.path().join(&name);
    save_with_params(&path, &sample_config(), Some(PASSWORD), None, &FAST).unwrap();
    assert_eq!(ContainerKind::from_path(&path), Some(ContainerKind::Encrypted));
    assert!(is_encrypted_file(&path));
}
