#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn upstac(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("upstac").unwrap();
    cmd.current_dir(dir.path()).env("UPSTAC_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    upstac(dir).arg("init").assert().success();
}

fn add_user(dir: &TempDir, name: &str, role: &str) {
    upstac(dir)
        .args(["user", "add", name, "--role", role])
        .assert()
        .success();
}

/// Run with `--json` and parse stdout.
fn json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = upstac(dir).arg("--json").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "upstac {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn staffed_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "asha", "user");
    add_user(&dir, "t1", "tester");
    add_user(&dir, "t2", "tester");
    add_user(&dir, "d1", "doctor");
    dir
}

fn file_request(dir: &TempDir) -> u64 {
    let created = json(
        dir,
        &[
            "request",
            "create",
            "--as",
            "asha",
            "--name",
            "Asha Rao",
            "--age",
            "34",
            "--gender",
            "female",
            "--email",
            "asha@example.com",
            "--phone",
            "9876543210",
            "--address",
            "12 MG Road, Pune",
            "--pin-code",
            "411001",
        ],
    );
    assert_eq!(created["status"], "INITIATED");
    created["id"].as_u64().unwrap()
}

fn lab_update(dir: &TempDir, id: u64, tester: &str) -> assert_cmd::assert::Assert {
    upstac(dir)
        .args(["lab", "update", &id.to_string(), "--as", tester])
        .args(["--blood-pressure", "120/80", "--heart-beat", "72"])
        .args(["--temperature", "98.6", "--oxygen-level", "97"])
        .args(["--result", "negative"])
        .assert()
}

// ---------------------------------------------------------------------------
// upstac init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    upstac(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .upstac/config.yaml"));

    assert!(dir.path().join(".upstac").is_dir());
    assert!(dir.path().join(".upstac/requests").is_dir());
    assert!(dir.path().join(".upstac/config.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "t1", "tester");
    upstac(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));

    let users = json(&dir, &["user", "list"]);
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[test]
fn commands_fail_before_init() {
    let dir = TempDir::new().unwrap();
    upstac(&dir)
        .args(["lab", "queue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

// ---------------------------------------------------------------------------
// upstac user
// ---------------------------------------------------------------------------

#[test]
fn user_add_issues_token_and_persists() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let user = json(&dir, &["user", "add", "d1", "--role", "doctor,admin"]);
    assert_eq!(user["username"], "d1");
    assert_eq!(user["api_token"].as_str().unwrap().len(), 32);

    let config = std::fs::read_to_string(dir.path().join(".upstac/config.yaml")).unwrap();
    let parsed: serde_yaml::Value = serde_yaml::from_str(&config).unwrap();
    assert_eq!(parsed["users"][0]["username"], "d1");
}

#[test]
fn user_add_rejects_duplicates_and_unknown_roles() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    add_user(&dir, "t1", "tester");
    upstac(&dir)
        .args(["user", "add", "t1", "--role", "tester"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("user already exists: t1"));
    upstac(&dir)
        .args(["user", "add", "n1", "--role", "nurse"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid role"));
}

#[test]
fn rotate_token_changes_token() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let before = json(&dir, &["user", "add", "t1", "--role", "tester"]);
    let after = json(&dir, &["user", "rotate-token", "t1"]);
    assert_ne!(before["api_token"], after["token"]);
}

#[test]
fn user_check_passes_on_fresh_project() {
    let dir = staffed_project();
    upstac(&dir)
        .args(["user", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config OK (4 users)"));
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

#[test]
fn full_workflow_via_cli() {
    let dir = staffed_project();
    let id = file_request(&dir);
    let id_arg = id.to_string();

    let queue = json(&dir, &["lab", "queue"]);
    assert_eq!(queue.as_array().unwrap().len(), 1);

    upstac(&dir)
        .args(["lab", "assign", &id_arg, "--as", "t1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LAB_TEST_IN_PROGRESS"));

    lab_update(&dir, id, "t2")
        .failure()
        .stderr(predicate::str::contains("'t2' is not assigned"));
    lab_update(&dir, id, "t1").success();

    let mine = json(&dir, &["lab", "mine", "--as", "t1"]);
    assert_eq!(mine[0]["lab_result"]["result"], "NEGATIVE");

    let queue = json(&dir, &["consult", "queue"]);
    assert_eq!(queue.as_array().unwrap().len(), 1);

    upstac(&dir)
        .args(["consult", "assign", &id_arg, "--as", "d1"])
        .assert()
        .success();
    upstac(&dir)
        .args(["consult", "update", &id_arg, "--as", "d1"])
        .args(["--suggestion", "no-issues", "--comments", "all clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("COMPLETED"));

    let shown = json(&dir, &["request", "show", &id_arg]);
    assert_eq!(shown["status"], "COMPLETED");
    assert_eq!(shown["consultation"]["suggestion"], "NO_ISSUES");
    assert_eq!(shown["assigned_doctor"]["username"], "d1");

    let flow = json(&dir, &["request", "flow", &id_arg]);
    assert_eq!(flow.as_array().unwrap().len(), 4);

    let done = json(&dir, &["request", "list", "--status", "completed"]);
    assert_eq!(done.as_array().unwrap().len(), 1);
}

#[test]
fn wrong_role_and_wrong_status_are_reported() {
    let dir = staffed_project();
    let id = file_request(&dir).to_string();

    upstac(&dir)
        .args(["lab", "assign", &id, "--as", "d1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not hold role TESTER"));

    upstac(&dir)
        .args(["lab", "assign", &id, "--as", "t1"])
        .assert()
        .success();
    upstac(&dir)
        .args(["consult", "assign", &id, "--as", "d1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid transition"));
}

#[test]
fn unknown_request_id_fails() {
    let dir = staffed_project();
    upstac(&dir)
        .args(["lab", "assign", "999", "--as", "t1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("test request not found: 999"));
}

#[test]
fn duplicate_intake_is_refused() {
    let dir = staffed_project();
    file_request(&dir);
    upstac(&dir)
        .args(["request", "create", "--as", "asha", "--name", "Asha Rao"])
        .args(["--age", "34", "--gender", "female", "--email", "ASHA@example.com"])
        .args(["--phone", "9000000000", "--address", "Pune", "--pin-code", "411001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn unknown_status_filter_fails() {
    let dir = staffed_project();
    upstac(&dir)
        .args(["request", "list", "--status", "lost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid status: lost"));
}

#[test]
fn acting_as_unknown_user_fails() {
    let dir = staffed_project();
    upstac(&dir)
        .args(["lab", "mine", "--as", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot act as 'ghost'"))
        .stderr(predicate::str::contains("user not found: ghost"));
}
