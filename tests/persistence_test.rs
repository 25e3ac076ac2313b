#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: request and approve a loan
    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "op, loan, party, amount, rate, periods, date").unwrap();
    writeln!(csv1, "request, L1, B1, 1000, 0.1, 12,").unwrap();
    writeln!(csv1, "approve, L1, Lender1, , , ,").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("loanledger"));
    cmd1.arg(csv1.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("L1,B1,Lender1,1000,0.1,12,Approved,,0,1000,false"));

    // 2. Second run: disburse and repay against the same DB path
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "op, loan, party, amount, rate, periods, date").unwrap();
    writeln!(csv2, "disburse, L1, , , , , 2026-03-01").unwrap();
    writeln!(csv2, "repay, L1, , 1100, , ,").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("loanledger"));
    cmd2.arg(csv2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    // Should have recovered the Approved record and driven it to Repaid
    assert!(stdout2.contains("L1,B1,Lender1,1000,0.1,12,Repaid,2026-03-01,1100,0,false"));
}

#[test]
fn test_rocksdb_duplicate_request_across_runs() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "op, loan, party, amount, rate, periods, date").unwrap();
    writeln!(csv1, "request, L1, B1, 1000, 0.1, 12,").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("loanledger"));
    cmd1.arg(csv1.path()).arg("--db-path").arg(&db_path);
    assert!(cmd1.output().unwrap().status.success());

    // A second run may not recreate the same key
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "op, loan, party, amount, rate, periods, date").unwrap();
    writeln!(csv2, "request, L1, B2, 500, 0.2, 6,").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("loanledger"));
    cmd2.arg(csv2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stderr2 = String::from_utf8_lossy(&output2.stderr);
    assert!(stderr2.contains("loan L1 already exists"));
    let stdout2 = String::from_utf8_lossy(&output2.stdout);
    assert!(stdout2.contains("L1,B1,,1000,0.1,12,Pending,,0,1000,false"));
}
