use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("budget_ledger_cli").unwrap();
    cmd.env("BUDGET_LEDGER_CLI_SCRIPT", "1")
        .env("BUDGET_LEDGER_HOME", home.path())
        .env("BUDGET_LEDGER_TODAY", "2024-03-20")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn posting_and_sweeping_through_a_script() {
    let home = TempDir::new().unwrap();
    let script = "\
# setup
user add ana ana@example.com
account add Checking checking
category add Groceries expense
budget add Groceries 100
txn post Groceries 95 --account Checking --note \"big shop\"
account list
sweep
sweep
outbox
save
exit
";
    cli(&home)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("User `ana` created and selected"))
        .stdout(predicate::str::contains("Posted Groceries $95.00 on 2024-03-20"))
        .stdout(predicate::str::contains("$-95.00"))
        .stdout(predicate::str::contains(
            "Sweep 03/2024 checked 1 budget(s), sent 1 alert(s), 0 failure(s).",
        ))
        .stdout(predicate::str::contains(
            "Sweep 03/2024 checked 1 budget(s), sent 0 alert(s), 0 failure(s).",
        ))
        .stdout(predicate::str::contains("Budget Alert: Groceries"))
        .stdout(predicate::str::contains("Ledger saved to"));

    assert!(home.path().join("ledger.json").exists());
}

#[test]
fn saved_ledger_is_picked_up_by_the_next_session() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin(
            "user add ben ben@example.com\n\
             account add Wallet cash 20\n\
             category add Salary income\n\
             txn post Salary 80 --account Wallet\n\
             save\n",
        )
        .assert()
        .success();

    cli(&home)
        .write_stdin("account list\ntxn list\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wallet"))
        .stdout(predicate::str::contains("$100.00"))
        .stdout(predicate::str::contains("Salary"));
}

#[test]
fn errors_are_reported_without_stopping_the_script() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("txn list\nfrobnicate\nuser add ana ana@example.com\nplan due\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("ERROR"))
        .stdout(predicate::str::contains("User `ana` created and selected"));
}

#[test]
fn failing_script_line_is_located() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .write_stdin("# nobody selected yet\n\ntxn list\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("ERROR"))
        .stdout(predicate::str::contains("(script line 3: txn list)"));
}

#[test]
fn invalid_today_override_fails_startup() {
    let home = TempDir::new().unwrap();
    cli(&home)
        .env("BUDGET_LEDGER_TODAY", "not-a-date")
        .write_stdin("exit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
