use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

use keystore_keygen::DEFAULT_NAMES;
use keystore_keygen::render;

fn keygen() -> Command {
    let mut cmd = Command::cargo_bin("keystore-keygen").expect("built");
    cmd.env_remove("KEYSTORE_KEYGEN_LOG");
    cmd
}

#[test]
fn help() {
    keygen().arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn generate_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");

    keygen().current_dir(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = fs::read_to_string(dir.path().join("keymap.rs"))
        .expect("written");
    let table = render::parse(&text).expect("valid");
    assert_eq!(table.names().collect::<Vec<_>>(), DEFAULT_NAMES);
}

#[test]
fn generate_then_verify() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fixtures.rs");

    keygen()
        .args(["generate", "--jobs", "2", "--output"])
        .arg(&path)
        .args(["--name", "example.com", "--name", "acme.com/services"])
        .assert()
        .success();

    let table = render::parse(&fs::read_to_string(&path).expect("written"))
        .expect("valid");
    assert_eq!(table.names().collect::<Vec<_>>(),
               vec![ "example.com", "acme.com/services" ]);

    keygen().arg("verify").arg(&path)
        .assert()
        .success();
}

#[test]
fn verify_detects_tampering() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("keymap.rs");

    keygen().arg("--output").arg(&path).args(["--name", "example.com"])
        .assert()
        .success();

    let text = fs::read_to_string(&path).expect("written");
    let table = render::parse(&text).expect("valid");
    let fpr = table.get("example.com").expect("present").fingerprint();
    fs::write(&path, text.replace(fpr, &"0".repeat(40))).expect("can write");

    keygen().arg("verify").arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("fingerprint"));
}

#[test]
fn duplicate_names_fail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("keymap.rs");

    keygen().arg("--output").arg(&path)
        .args(["--name", "example.com", "--name", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than once"));
    assert!(! path.exists());
}

#[test]
fn unknown_cipher_suite_fails() {
    keygen().args(["--cipher-suite", "rot13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rot13"));
}
