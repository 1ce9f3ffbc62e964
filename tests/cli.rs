//! End-to-end tests driving the zipvault binary

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use chrono::Utc;
use predicates::prelude::*;
use tempfile::TempDir;

fn zipvault(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("zipvault").unwrap();
    cmd.env("ZIPVAULT_DATA_DIR", config_dir);
    cmd
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

#[test]
fn backup_single_file_creates_archive_and_manifest() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");
    let source = temp.path().join("a.txt");
    fs::write(&source, b"ten bytes!").unwrap();
    let root = temp.path().join("backups");
    fs::create_dir(&root).unwrap();

    zipvault(&config)
        .arg("backup")
        .arg(&source)
        .arg("--destination")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 created, 0 failed"));

    let date_dir = root.join(today());
    assert!(date_dir.join("backup-manifest.json").exists());

    let zips: Vec<_> = fs::read_dir(&date_dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().map_or(false, |x| x == "zip"))
        .collect();
    assert_eq!(zips.len(), 1);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(date_dir.join("backup-manifest.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["Backups"].as_array().unwrap().len(), 1);
    assert_eq!(manifest["Backups"][0]["pathType"], "File");
}

#[test]
fn list_shows_recorded_backups() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");
    let source = temp.path().join("notes.txt");
    fs::write(&source, b"listed").unwrap();
    let root = temp.path().join("backups");
    fs::create_dir(&root).unwrap();

    zipvault(&config)
        .arg("backup")
        .arg(&source)
        .arg("--destination")
        .arg(&root)
        .assert()
        .success();

    zipvault(&config)
        .arg("list")
        .arg("--destination")
        .arg(&root)
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 backup(s)"))
        .stdout(predicate::str::contains("notes.txt"));
}

#[test]
fn verify_reports_valid_archive() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");
    let source = temp.path().join("data.bin");
    fs::write(&source, b"verify me").unwrap();
    let root = temp.path().join("backups");
    fs::create_dir(&root).unwrap();

    zipvault(&config)
        .arg("backup")
        .arg(&source)
        .arg("--destination")
        .arg(&root)
        .assert()
        .success();

    zipvault(&config)
        .arg("verify")
        .arg("--destination")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK]"))
        .stdout(predicate::str::contains("0 failure(s)"));
}

#[test]
fn verify_without_hashes_reports_no_hash_data() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");
    let source = temp.path().join("data.bin");
    fs::write(&source, b"no hashes").unwrap();
    let root = temp.path().join("backups");
    fs::create_dir(&root).unwrap();

    zipvault(&config)
        .arg("backup")
        .arg(&source)
        .arg("--destination")
        .arg(&root)
        .arg("--no-hash")
        .assert()
        .success();

    zipvault(&config)
        .arg("verify")
        .arg("--destination")
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("no hash data"))
        .stdout(predicate::str::contains("0 failure(s)"));
}

#[test]
fn restore_round_trip() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");
    let source = temp.path().join("roundtrip.txt");
    fs::write(&source, b"round trip bytes").unwrap();
    let root = temp.path().join("backups");
    fs::create_dir(&root).unwrap();

    zipvault(&config)
        .arg("backup")
        .arg(&source)
        .arg("--destination")
        .arg(&root)
        .assert()
        .success();

    let out = temp.path().join("out");
    zipvault(&config)
        .arg("restore")
        .arg("--destination")
        .arg(&root)
        .arg("--to")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 succeeded, 0 failed"));

    assert_eq!(fs::read(out.join("roundtrip.txt")).unwrap(), b"round trip bytes");
}

#[test]
fn restore_without_destination_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");
    let root = temp.path().join("backups");
    fs::create_dir(&root).unwrap();

    zipvault(&config)
        .arg("restore")
        .arg("--destination")
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no restore destination"));
}

#[test]
fn prune_requires_force_to_delete() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");
    let root = temp.path().join("backups");
    fs::create_dir(&root).unwrap();
    let old = root.join("2020-01-01");
    fs::create_dir(&old).unwrap();
    fs::write(old.join("stale.zip"), b"old").unwrap();

    zipvault(&config)
        .arg("prune")
        .arg("--destination")
        .arg(&root)
        .arg("--keep")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would delete"))
        .stdout(predicate::str::contains("--force"));
    assert!(old.exists());

    zipvault(&config)
        .arg("prune")
        .arg("--destination")
        .arg(&root)
        .arg("--keep")
        .arg("0")
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));
    assert!(!old.exists());
}

#[test]
fn backup_dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");
    let source = temp.path().join("a.txt");
    fs::write(&source, b"dry").unwrap();
    let root = temp.path().join("backups");
    fs::create_dir(&root).unwrap();

    zipvault(&config)
        .arg("backup")
        .arg(&source)
        .arg("--destination")
        .arg(&root)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Would create"));

    assert!(!root.join(today()).exists());
}
