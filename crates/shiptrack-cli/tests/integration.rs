use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn shiptrack(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("shiptrack").unwrap();
    cmd.current_dir(dir.path()).env("SHIPTRACK_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    shiptrack(dir).arg("init").assert().success();
}

/// Write a config pointing the carrier at `base_url` with a short call
/// timeout, for tests that exercise the reconciliation run.
fn write_config(dir: &TempDir, base_url: &str) {
    let yaml = format!(
        "version: 1\nstore:\n  path: orders.redb\ncarrier:\n  base_url: {base_url}\n\
         tracking:\n  interval_minutes: 30\n  batch_size: 50\n  call_timeout_ms: 500\n"
    );
    std::fs::write(dir.path().join("shiptrack.yaml"), yaml).unwrap();
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// shiptrack init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_store() {
    let dir = TempDir::new().unwrap();
    shiptrack(&dir).arg("init").assert().success();

    assert!(dir.path().join("shiptrack.yaml").exists());
    assert!(dir.path().join("orders.redb").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    shiptrack(&dir).arg("init").assert().success();
    shiptrack(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
}

#[test]
fn commands_fail_before_init() {
    let dir = TempDir::new().unwrap();
    shiptrack(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

// ---------------------------------------------------------------------------
// shiptrack seed / orders / status
// ---------------------------------------------------------------------------

#[test]
fn seed_then_list_orders() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    shiptrack(&dir)
        .args(["seed", "--count", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded 4 orders"));

    shiptrack(&dir)
        .args(["orders", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AUR-"))
        .stdout(predicate::str::contains("shipped"));
}

#[test]
fn create_dispatch_show_roundtrip() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let output = shiptrack(&dir)
        .args([
            "orders",
            "create",
            "--customer",
            "Priya Sharma",
            "--total-cents",
            "125000",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .clone();
    let created = stdout_json(&output);
    assert_eq!(created["status"], "placed");
    let id = created["id"].as_str().unwrap().to_string();

    shiptrack(&dir)
        .args(["orders", "dispatch", &id, "--reference", "SR123456789"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dispatched"));

    let output = shiptrack(&dir)
        .args(["orders", "show", &id, "--json"])
        .assert()
        .success()
        .get_output()
        .clone();
    let shown = stdout_json(&output);
    assert_eq!(shown["status"], "shipped");
    assert_eq!(shown["tracking_reference"], "SR123456789");
}

#[test]
fn dispatch_rejects_malformed_reference() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let output = shiptrack(&dir)
        .args([
            "orders",
            "create",
            "--customer",
            "Arjun Mehta",
            "--total-cents",
            "50000",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .clone();
    let id = stdout_json(&output)["id"].as_str().unwrap().to_string();

    shiptrack(&dir)
        .args(["orders", "dispatch", &id, "--reference", "bad ref"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid tracking reference"));
}

#[test]
fn status_reports_counts() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    shiptrack(&dir)
        .args(["seed", "--count", "4"])
        .assert()
        .success();

    shiptrack(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("orders: 4 total"))
        .stdout(predicate::str::contains("pending tracking update: 2"));
}

// ---------------------------------------------------------------------------
// shiptrack run
// ---------------------------------------------------------------------------

#[test]
fn run_tallies_carrier_failures_without_aborting() {
    let dir = TempDir::new().unwrap();
    // Nothing listens on this port: every carrier call fails fast and
    // the run must still complete with a summary.
    write_config(&dir, "http://127.0.0.1:1");
    init_project(&dir);
    shiptrack(&dir)
        .args(["seed", "--count", "2"])
        .assert()
        .success();

    let output = shiptrack(&dir)
        .args(["run", "--json"])
        .assert()
        .success()
        .get_output()
        .clone();
    let summary = stdout_json(&output);
    // One of the two seeded orders is dispatched.
    assert_eq!(summary["checked"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["updated"], 0);
}

#[test]
fn run_on_empty_store_reports_zero() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let output = shiptrack(&dir)
        .args(["run", "--json"])
        .assert()
        .success()
        .get_output()
        .clone();
    let summary = stdout_json(&output);
    assert_eq!(summary["checked"], 0);
    assert_eq!(summary["terminal_transitions"], serde_json::json!([]));
}
