use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn script(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "op, actor, entity, amount, note").unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

#[test]
fn test_claim_verify_flow() {
    let file = script(&[
        "register_supplier, acme, , ,",
        "register_admin, dana, , ,",
        "submit, acme, batch1, , registration:ACME GmbH",
        "claim, dana, batch1, ,",
        "verify, dana, batch1, ,",
    ]);

    let mut cmd = Command::new(cargo_bin!("paydesk"));
    cmd.arg(file.path()).arg("--report").arg("submissions");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("batch1,acme,verified,dana,"));
}

#[test]
fn test_claim_contention_is_rejected() {
    let file = script(&[
        "register_supplier, acme, , ,",
        "register_admin, dana, , ,",
        "register_admin, eli, , ,",
        "submit, acme, batch1, , registration:ACME GmbH",
        "claim, dana, batch1, ,",
        "claim, eli, batch1, ,",
        "reject, dana, batch1, , missing doc",
    ]);

    let mut cmd = Command::new(cargo_bin!("paydesk"));
    cmd.arg(file.path()).arg("--report").arg("submissions");

    // Eli's claim fails with lock contention; Dana's rejection lands.
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("already claimed"))
        .stdout(predicate::str::contains(
            "batch1,acme,rejected,dana,missing doc",
        ));
}

#[test]
fn test_release_reopens_the_queue() {
    let file = script(&[
        "register_supplier, acme, , ,",
        "register_admin, dana, , ,",
        "register_admin, eli, , ,",
        "submit, acme, batch1, , registration:ACME GmbH",
        "claim, dana, batch1, ,",
        "release, dana, batch1, ,",
        "claim, eli, batch1, ,",
        "verify, eli, batch1, ,",
    ]);

    let mut cmd = Command::new(cargo_bin!("paydesk"));
    cmd.arg(file.path()).arg("--report").arg("submissions");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("batch1,acme,verified,eli,"));
}

#[test]
fn test_empty_rejection_reason_leaves_submission_in_review() {
    let file = script(&[
        "register_supplier, acme, , ,",
        "register_admin, dana, , ,",
        "submit, acme, batch1, , registration:ACME GmbH",
        "claim, dana, batch1, ,",
        "reject, dana, batch1, ,",
    ]);

    let mut cmd = Command::new(cargo_bin!("paydesk"));
    cmd.arg(file.path()).arg("--report").arg("submissions");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error processing command"))
        .stdout(predicate::str::contains("batch1,acme,in_review,dana,"));
}

#[test]
fn test_terminal_submission_ignores_further_commands() {
    let file = script(&[
        "register_supplier, acme, , ,",
        "register_admin, dana, , ,",
        "submit, acme, batch1, , registration:ACME GmbH",
        "claim, dana, batch1, ,",
        "verify, dana, batch1, ,",
        "claim, dana, batch1, ,",
        "reject, dana, batch1, , too late",
    ]);

    let mut cmd = Command::new(cargo_bin!("paydesk"));
    cmd.arg(file.path()).arg("--report").arg("submissions");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("does not permit"))
        .stdout(predicate::str::contains("batch1,acme,verified,dana,"));
}

#[test]
fn test_supplier_cannot_review() {
    let file = script(&[
        "register_supplier, acme, , ,",
        "register_supplier, bolt, , ,",
        "register_admin, dana, , ,",
        "submit, acme, batch1, , registration:ACME GmbH",
        "claim, bolt, batch1, ,",
    ]);

    let mut cmd = Command::new(cargo_bin!("paydesk"));
    cmd.arg(file.path()).arg("--report").arg("submissions");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("not authorized"))
        .stdout(predicate::str::contains("batch1,acme,pending,,"));
}
