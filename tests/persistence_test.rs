#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: register and credit an account
    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "actor, action, arg1, arg2").unwrap();
    writeln!(csv1, "2, start, , alice").unwrap();
    writeln!(csv1, "1, grant, 2, 100").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("promoledger"));
    cmd1.arg(csv1.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("2,alice,100,,"));

    // 2. Second run: credit again using the same DB path
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "actor, action, arg1, arg2").unwrap();
    writeln!(csv2, "1, grant, 2, 50").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("promoledger"));
    cmd2.arg(csv2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    // Should have recovered 100 and added 50 = 150
    assert!(stdout2.contains("2,alice,150,,"));
}

#[test]
fn test_rocksdb_pending_withdrawal_survives_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "actor, action, arg1, arg2").unwrap();
    writeln!(csv1, "2, start, , alice").unwrap();
    writeln!(csv1, "1, grant, 2, 20000").unwrap();
    writeln!(csv1, "2, withdraw, 8600123412341234").unwrap();

    let output1 = Command::new(cargo_bin!("promoledger"))
        .arg(csv1.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output1.status.success());
    assert!(String::from_utf8_lossy(&output1.stdout).contains("2,alice,0,,"));

    // the request created in the first run resolves in the second
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "actor, action").unwrap();
    writeln!(csv2, "1, withdrawal-paid:1").unwrap();

    let output2 = Command::new(cargo_bin!("promoledger"))
        .arg(csv2.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output2.status.success());
    let stderr2 = String::from_utf8_lossy(&output2.stderr);
    assert!(!stderr2.contains("Error processing command"), "{stderr2}");
}
