//! Integration tests for the HoneyVault CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.  The
//! master key comes from `HONEYVAULT_MASTER_KEY` and decoys from the local
//! random oracle, so nothing prompts and nothing needs the network.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const MASTER: &str = "m@ster";

/// Helper: get a Command pointing at the honeyvault binary.
fn honeyvault() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("honeyvault").expect("binary should exist");
    cmd.env_remove("RUST_LOG").env_remove("HONEYVAULT_DATA_DIR");
    cmd
}

/// Data directory with fast key stretching and the random oracle.
fn data_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child("honeyvault.toml")
        .write_str(
            "oracle = \"random\"\n\
             random_decoy_count = 4\n\
             argon2_memory_kib = 8192\n\
             argon2_iterations = 1\n\
             argon2_parallelism = 1\n",
        )
        .unwrap();
    tmp
}

/// Command bound to `dir` with the master key set.
fn with_key(dir: &TempDir, key: &str) -> Command {
    let mut cmd = honeyvault();
    cmd.arg("--data-dir")
        .arg(dir.path())
        .env("HONEYVAULT_MASTER_KEY", key);
    cmd
}

fn create_bank(dir: &TempDir) {
    with_key(dir, MASTER)
        .args(["create-vault", "bank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created vault 'bank'"));
}

#[test]
fn help_flag_shows_usage() {
    honeyvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("decoys"))
        .stdout(predicate::str::contains("create-vault"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("delete-vault"))
        .stdout(predicate::str::contains("alerts"));
}

#[test]
fn version_flag_shows_version() {
    honeyvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("honeyvault"));
}

#[test]
fn no_args_shows_help() {
    honeyvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn create_vault_lays_out_data_dir() {
    let dir = data_dir();
    create_bank(&dir);

    dir.child("master.db").assert(predicate::path::exists());
    dir.child("directory/keys.db")
        .assert(predicate::path::exists());

    honeyvault()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("vaults")
        .assert()
        .success()
        .stdout(predicate::str::contains("bank"));
}

#[test]
fn duplicate_vault_is_rejected() {
    let dir = data_dir();
    create_bank(&dir);

    with_key(&dir, "other")
        .args(["create-vault", "bank"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn invalid_vault_name_is_rejected() {
    let dir = data_dir();
    with_key(&dir, MASTER)
        .args(["create-vault", "my-vault"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid vault name"));
}

#[test]
fn add_then_get_returns_value() {
    let dir = data_dir();
    create_bank(&dir);

    with_key(&dir, MASTER)
        .args(["add", "bank", "login", "p4ss", "mySecretValue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 'login'"));

    dir.child("vaults/bank.vault")
        .assert(predicate::path::exists());

    with_key(&dir, MASTER)
        .args(["get", "bank", "login", "p4ss"])
        .assert()
        .success()
        .stdout("mySecretValue\n");

    with_key(&dir, MASTER)
        .args(["list", "bank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login"));
}

#[test]
fn add_reads_value_from_stdin() {
    let dir = data_dir();
    create_bank(&dir);

    with_key(&dir, MASTER)
        .args(["add", "bank", "pin", "1234"])
        .write_stdin("0000\n")
        .assert()
        .success();

    with_key(&dir, MASTER)
        .args(["get", "bank", "pin", "1234"])
        .assert()
        .success()
        .stdout("0000\n");
}

#[test]
fn wrong_master_key_fails() {
    let dir = data_dir();
    create_bank(&dir);
    with_key(&dir, MASTER)
        .args(["add", "bank", "login", "p4ss", "mySecretValue"])
        .assert()
        .success();

    with_key(&dir, "wrong")
        .args(["get", "bank", "login", "p4ss"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid master key"));
}

#[test]
fn unknown_secret_is_not_found() {
    let dir = data_dir();
    create_bank(&dir);
    with_key(&dir, MASTER)
        .args(["add", "bank", "login", "p4ss", "mySecretValue"])
        .assert()
        .success();

    with_key(&dir, MASTER)
        .args(["get", "bank", "login", "not-a-stored-secret-at-all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    // A miss is not a decoy hit.
    honeyvault()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("alerts")
        .assert()
        .success()
        .stdout(predicate::str::contains("No decoy access recorded"));
}

#[test]
fn delete_with_force_removes_entry() {
    let dir = data_dir();
    create_bank(&dir);
    with_key(&dir, MASTER)
        .args(["add", "bank", "login", "p4ss", "mySecretValue"])
        .assert()
        .success();

    with_key(&dir, MASTER)
        .args(["delete", "bank", "login", "p4ss", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted entry 'login'"));

    with_key(&dir, MASTER)
        .args(["get", "bank", "login", "p4ss"])
        .assert()
        .failure();
}

#[test]
fn delete_vault_with_force_removes_everything() {
    let dir = data_dir();
    create_bank(&dir);
    with_key(&dir, MASTER)
        .args(["add", "bank", "login", "p4ss", "mySecretValue"])
        .assert()
        .success();

    with_key(&dir, MASTER)
        .args(["delete-vault", "bank", "--force"])
        .assert()
        .success();

    dir.child("vaults/bank.vault")
        .assert(predicate::path::missing());

    with_key(&dir, MASTER)
        .args(["get", "bank", "login", "p4ss"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid master key"));
}

#[test]
fn unreachable_oracle_blocks_add() {
    let dir = TempDir::new().unwrap();
    dir.child("honeyvault.toml")
        .write_str(
            "oracle = \"http\"\n\
             oracle_url = \"http://127.0.0.1:1/api\"\n\
             oracle_timeout_secs = 2\n\
             argon2_memory_kib = 8192\n\
             argon2_iterations = 1\n\
             argon2_parallelism = 1\n",
        )
        .unwrap();
    create_bank(&dir);

    with_key(&dir, MASTER)
        .args(["add", "bank", "login", "p4ss", "mySecretValue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decoy oracle unavailable"));

    dir.child("vaults/bank.vault")
        .assert(predicate::path::missing());

    // The command-line flag overrides the settings file.
    with_key(&dir, MASTER)
        .args(["--oracle", "random", "add", "bank", "login", "p4ss", "mySecretValue"])
        .assert()
        .success();
}

#[test]
fn bad_config_is_reported() {
    let dir = TempDir::new().unwrap();
    dir.child("honeyvault.toml")
        .write_str("key_length = 4\n")
        .unwrap();

    honeyvault()
        .arg("--data-dir")
        .arg(dir.path())
        .arg("vaults")
        .assert()
        .failure()
        .stderr(predicate::str::contains("key_length"));
}
