use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::new(cargo_bin!("superpay"));
    cmd.env_remove("RUST_LOG")
        .arg("--db-path")
        .arg(dir.path().join("some_db"))
        .arg("wallet");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("balance: 150000"))
        .stderr(predicate::str::contains(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage.",
        ));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let run = |args: &[&str]| {
        let mut cmd = Command::new(cargo_bin!("superpay"));
        cmd.env_remove("RUST_LOG")
            .arg("--db-path")
            .arg(&db_path)
            .args(args)
            .assert()
            .success()
            .stderr(predicate::str::contains("Falling back").not())
    };

    run(&["top-up", "100"]);
    run(&["wallet"]).stdout(predicate::str::contains("balance: 150100"));
}
