use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("promoledger"));
    cmd.arg("tests/fixtures/commands.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "account,username,balance,referrer,joined_at",
        ))
        // alice: referral bonus + grant, then withdrawn in full
        .stdout(predicate::str::contains("2,alice,0,,"))
        // bob: referred by alice, credited one 500-point task
        .stdout(predicate::str::contains("3,bob,500,2,"))
        // the task takes id 1, so alice's request is id 2 and resolves
        .stderr(predicate::str::contains("withdrawal request").not());

    Ok(())
}

#[test]
fn test_cli_reports_bad_lines_and_keeps_going() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("promoledger"));
    cmd.arg("tests/fixtures/commands.csv");

    cmd.assert()
        .success()
        // balance query for an account that never registered
        .stderr(predicate::str::contains("Error processing command"))
        // non-numeric actor and an unknown action id
        .stderr(predicate::str::contains("Error reading command"))
        .stderr(predicate::str::contains("teleport"));

    Ok(())
}

#[test]
fn test_cli_admin_override() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = tempfile::NamedTempFile::new()?;
    writeln!(input, "actor, action, arg1, arg2")?;
    writeln!(input, "2, start, , alice")?;
    writeln!(input, "1, grant, 2, 500")?;
    writeln!(input, "42, grant, 2, 500")?;

    let mut cmd = Command::new(cargo_bin!("promoledger"));
    cmd.arg(input.path()).arg("--admin-id").arg("42");

    // account 1 is no longer privileged; only account 42's grant lands
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing command"))
        .stdout(predicate::str::contains("2,alice,500,,"));

    Ok(())
}

#[test]
fn test_cli_missing_input_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("promoledger"));
    cmd.arg("tests/fixtures/does_not_exist.csv");

    cmd.assert().failure();

    Ok(())
}
