mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::*;
use simple_audit::audit::JsonlAuditStore;

/// Data directory with two people, one of them renamed and moved
fn seeded_data_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonlAuditStore::open(temp_dir.path().join("audit.log")).unwrap();
    let repo = Repository::new(store);

    let mut person = mihai();
    repo.create_person(&mut person, &person_policy(), Some(&User))
        .unwrap();
    person.name = "Gigi Kent".into();
    person.address = Some(Address::new("Bdul. Victoriei nr. 51", "550150"));
    repo.save_person(&mut person, &person_policy(), Some(&User))
        .unwrap();

    repo.create_person(&mut gabriel(), &person_policy(), None)
        .unwrap();

    temp_dir
}

fn simple_audit(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("simple-audit").unwrap();
    cmd.env("SIMPLE_AUDIT_DATA_DIR", data_dir.path())
        .env_remove("SIMPLE_AUDIT_LOG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_list_entity_trail() {
    let data_dir = seeded_data_dir();

    simple_audit(&data_dir)
        .args(["list", "Person", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Person#1"))
        .stdout(predicate::str::contains("Mihai Tarnovan"))
        .stdout(predicate::str::contains("Total: 2 records"));
}

#[test]
fn test_list_everything_and_by_action() {
    let data_dir = seeded_data_dir();

    simple_audit(&data_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 3 records"));

    simple_audit(&data_dir)
        .args(["list", "--action", "update"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 1 records"));
}

#[test]
fn test_list_empty_log() {
    let data_dir = TempDir::new().unwrap();

    simple_audit(&data_dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No audit records found."));
}

#[test]
fn test_show_record() {
    let data_dir = seeded_data_dir();

    simple_audit(&data_dir)
        .args(["show", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Audit record #2"))
        .stdout(predicate::str::contains("Gigi Kent"));
}

#[test]
fn test_show_missing_record_fails() {
    let data_dir = seeded_data_dir();

    simple_audit(&data_dir)
        .args(["show", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_delta_text_and_json() {
    let data_dir = seeded_data_dir();

    simple_audit(&data_dir)
        .args(["delta", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changes from #1 (create) to #2 (update)"))
        .stdout(predicate::str::contains("name: \"Mihai Tarnovan\" -> \"Gigi Kent\""));

    let output = simple_audit(&data_dir)
        .args(["delta", "1", "2", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let delta: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(delta["name"], serde_json::json!(["Mihai Tarnovan", "Gigi Kent"]));
    assert_eq!(delta["address"][1]["zip"], "550150");
    assert!(delta.get("email").is_none());
}

#[test]
fn test_delta_detailed() {
    let data_dir = seeded_data_dir();

    simple_audit(&data_dir)
        .args(["delta", "1", "2", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("address.zip: \"550350\" -> \"550150\""));
}

#[test]
fn test_export_csv_to_file() {
    let data_dir = seeded_data_dir();
    let output = data_dir.path().join("trail.csv");

    simple_audit(&data_dir)
        .args(["export", "--format", "csv", "--type", "Person", "--id", "1", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 records"));

    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.starts_with("ID,Created At,Type,Entity ID,Action"));
    assert_eq!(contents.lines().count(), 3);
}

#[test]
fn test_export_yaml_to_stdout() {
    let data_dir = seeded_data_dir();

    simple_audit(&data_dir)
        .args(["export", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("record_count: 3"));
}

#[test]
fn test_stats() {
    let data_dir = seeded_data_dir();

    simple_audit(&data_dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Records:  3"))
        .stdout(predicate::str::contains("  update:  1"));
}

#[test]
fn test_log_flag_overrides_data_dir() {
    let data_dir = seeded_data_dir();
    let empty_dir = TempDir::new().unwrap();

    simple_audit(&empty_dir)
        .arg("--log")
        .arg(data_dir.path().join("audit.log"))
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Records:  3"));
}

#[test]
fn test_config_shows_paths() {
    let data_dir = TempDir::new().unwrap();

    simple_audit(&data_dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("audit.log"))
        .stdout(predicate::str::contains("Name strategy:    full"));

    assert!(data_dir.path().join("config.json").exists());
}

#[cfg(not(windows))]
#[test]
fn test_log_flag_works_without_a_data_dir() {
    let data_dir = seeded_data_dir();

    Command::cargo_bin("simple-audit")
        .unwrap()
        .env_remove("SIMPLE_AUDIT_DATA_DIR")
        .env_remove("SIMPLE_AUDIT_LOG")
        .env_remove("HOME")
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .arg("--log")
        .arg(data_dir.path().join("audit.log"))
        .args(["list", "Person", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 2 records"));
}
