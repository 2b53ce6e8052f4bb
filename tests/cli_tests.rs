use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_batch_flow() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, party, counterparty, amount, currency, note").unwrap();
    writeln!(file, "register-user, 1, , , ,").unwrap();
    writeln!(file, "register-user, 2, , , ,").unwrap();
    writeln!(file, "register-agent, 10, , , ,").unwrap();
    writeln!(file, "issue-credit, 10, , 1000, USD,").unwrap();
    writeln!(file, "deposit, 1, 10, 100, USD,").unwrap();
    writeln!(file, "transfer, 1, 2, 25, USD, rent").unwrap();

    let mut cmd = Command::new(cargo_bin!("hawala-ledger"));
    cmd.arg(file.path());

    // Deposit nets 99.00 at 1%; transfer costs 25 + 0.13 fee.
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("user,currency,kind,balance,frozen"))
        .stdout(predicate::str::contains("1,USD,personal,73.87,0"))
        .stdout(predicate::str::contains("2,USD,personal,25,0"))
        .stdout(predicate::str::contains("USD: reserve"))
        .stdout(predicate::str::contains("[BALANCED]"))
        .stdout(predicate::str::contains("[INTACT]"));
}

#[test]
fn test_malformed_row_is_reported_and_skipped() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, party, counterparty, amount, currency, note").unwrap();
    writeln!(file, "register-user, 1, , , ,").unwrap();
    writeln!(file, "teleport, 1, , 5, USD,").unwrap();

    let mut cmd = Command::new(cargo_bin!("hawala-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading operation"))
        .stdout(predicate::str::contains("[BALANCED]"));
}

#[test]
fn test_business_failure_does_not_abort_the_batch() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, party, counterparty, amount, currency, note").unwrap();
    writeln!(file, "register-user, 1, , , ,").unwrap();
    writeln!(file, "register-agent, 10, , , ,").unwrap();
    writeln!(file, "issue-credit, 10, , 1000, USD,").unwrap();
    writeln!(file, "deposit, 1, 10, 100, USD,").unwrap();
    // Withdrawal beyond the balance fails but processing continues.
    writeln!(file, "withdraw, 1, 10, 500, USD,").unwrap();

    let mut cmd = Command::new(cargo_bin!("hawala-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Insufficient balance"))
        .stdout(predicate::str::contains("1,USD,personal,99.00,0"))
        .stdout(predicate::str::contains("[BALANCED]"));
}

#[test]
fn test_missing_amount_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, party, counterparty, amount, currency, note").unwrap();
    writeln!(file, "register-agent, 10, , , ,").unwrap();
    writeln!(file, "issue-credit, 10, , , USD,").unwrap();

    let mut cmd = Command::new(cargo_bin!("hawala-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Operation missing amount"));
}
