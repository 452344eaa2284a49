//! End-to-end `bz` workflows.
//!
//! Each test runs the binary as a subprocess in an isolated temp directory
//! with its own user-config home, so no developer settings leak in.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the `bz` binary, rooted in `dir`, acting as
/// `account`.
fn bz_as(dir: &Path, account: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bz"));
    cmd.current_dir(dir);
    cmd.env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd.env("BIZDESK_ACCOUNT", account);
    cmd.env("BIZDESK_EMAIL", format!("{account}@example.com"));
    cmd.env("BIZDESK_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn bz(dir: &Path) -> Command {
    bz_as(dir, "acme")
}

fn init_workspace() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    bz(dir.path()).args(["init"]).assert().success();
    dir
}

/// Run a command with `--json` and parse stdout.
fn json(dir: &Path, account: &str, args: &[&str]) -> Value {
    let output = bz_as(dir, account)
        .args(args)
        .arg("--json")
        .output()
        .expect("bz should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id field").to_string()
}

fn create_ticket(dir: &Path, title: &str) -> String {
    id_of(&json(
        dir,
        "acme",
        &[
            "ticket",
            "create",
            "--title",
            title,
            "--customer",
            "Casey",
            "--customer-email",
            "casey@example.com",
        ],
    ))
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

#[test]
fn init_writes_config_and_store() {
    let dir = init_workspace();
    let workspace = dir.path().join(".bizdesk");
    assert!(workspace.join("config.toml").is_file());
    assert!(workspace.join("bizdesk.sqlite3").is_file());

    bz(dir.path())
        .args(["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    bz(dir.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn record_commands_need_a_workspace() {
    let dir = TempDir::new().expect("temp dir");
    bz(dir.path())
        .args(["ticket", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
}

#[test]
fn record_commands_need_an_account() {
    let dir = init_workspace();
    bz(dir.path())
        .env_remove("BIZDESK_ACCOUNT")
        .args(["ticket", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1003"));
}

#[test]
fn subdirectories_find_the_workspace() {
    let dir = init_workspace();
    let nested = dir.path().join("a/b");
    std::fs::create_dir_all(&nested).expect("mkdir");
    let id = create_ticket(dir.path(), "from the root");

    let listed = json(&nested, "acme", &["ticket", "list"]);
    let ids: Vec<&str> = listed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert_eq!(ids, vec![id.as_str()]);
}

// ---------------------------------------------------------------------------
// Support
// ---------------------------------------------------------------------------

#[test]
fn ticket_lifecycle() {
    let dir = init_workspace();
    let id = create_ticket(dir.path(), "Cannot log in");
    assert!(id.starts_with("tkt-"));

    let shown = json(dir.path(), "acme", &["ticket", "show", &id]);
    assert_eq!(shown["ticket"]["status"], "open");
    assert_eq!(shown["ticket"]["user_id"], "acme");
    assert_eq!(shown["messages"].as_array().map(Vec::len), Some(0));

    let reply = json(dir.path(), "acme", &["ticket", "reply", &id, "Reset link sent"]);
    assert_eq!(reply["sender_type"], "agent");
    assert_eq!(reply["sender"], "acme@example.com");
    assert_eq!(reply["ticket_id"], id.as_str());

    let shown = json(dir.path(), "acme", &["ticket", "show", &id]);
    assert_eq!(shown["ticket"]["status"], "in-progress");
    assert_eq!(shown["messages"][0]["message"], "Reset link sent");

    let resolved = json(dir.path(), "acme", &["ticket", "status", &id, "resolved"]);
    assert_eq!(resolved["status"], "resolved");
    assert!(resolved["updated_at"].is_string());

    let stats = json(dir.path(), "acme", &["stats"]);
    assert_eq!(stats["support"]["open"], 0);
    assert_eq!(stats["support"]["in_progress"], 0);
    assert_eq!(stats["support"]["resolved_today"], 1);
}

#[test]
fn ticket_list_filters_by_status_and_search() {
    let dir = init_workspace();
    let first = create_ticket(dir.path(), "Billing question");
    let second = create_ticket(dir.path(), "Password reset");
    json(dir.path(), "acme", &["ticket", "status", &first, "closed"]);

    let all = json(dir.path(), "acme", &["ticket", "list"]);
    let ids: Vec<&str> = all
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.as_str()) && ids.contains(&second.as_str()));

    let open = json(dir.path(), "acme", &["ticket", "list", "--status", "open"]);
    assert_eq!(open.as_array().map(Vec::len), Some(1));
    assert_eq!(open[0]["id"], second.as_str());

    let searched = json(dir.path(), "acme", &["ticket", "list", "--search", "BILLING"]);
    assert_eq!(searched.as_array().map(Vec::len), Some(1));
    assert_eq!(searched[0]["id"], first.as_str());
}

#[test]
fn underscored_status_values_are_accepted() {
    let dir = init_workspace();
    let id = create_ticket(dir.path(), "Slow dashboard");
    let updated = json(dir.path(), "acme", &["ticket", "status", &id, "IN_PROGRESS"]);
    assert_eq!(updated["status"], "in-progress");
}

#[test]
fn invalid_status_is_e2002() {
    let dir = init_workspace();
    let id = create_ticket(dir.path(), "Slow dashboard");
    bz(dir.path())
        .args(["ticket", "status", &id, "escalated"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2002"));
}

#[test]
fn blank_reply_is_e4001() {
    let dir = init_workspace();
    let id = create_ticket(dir.path(), "Slow dashboard");
    bz(dir.path())
        .args(["ticket", "reply", &id, "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E4001"));
}

#[test]
fn deleted_ticket_is_gone() {
    let dir = init_workspace();
    let id = create_ticket(dir.path(), "Duplicate report");
    let deleted = json(dir.path(), "acme", &["ticket", "delete", &id]);
    assert_eq!(deleted["deleted"], id.as_str());

    let listed = json(dir.path(), "acme", &["ticket", "list"]);
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
    bz(dir.path())
        .args(["ticket", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

// ---------------------------------------------------------------------------
// Account isolation
// ---------------------------------------------------------------------------

#[test]
fn accounts_never_see_each_other() {
    let dir = init_workspace();
    let id = create_ticket(dir.path(), "Private to acme");

    let foreign = json(dir.path(), "globex", &["ticket", "list"]);
    assert_eq!(foreign.as_array().map(Vec::len), Some(0));

    bz_as(dir.path(), "globex")
        .args(["ticket", "status", &id, "closed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));

    let shown = json(dir.path(), "acme", &["ticket", "show", &id]);
    assert_eq!(shown["ticket"]["status"], "open");
}

#[test]
fn account_flag_overrides_env() {
    let dir = init_workspace();
    create_ticket(dir.path(), "Belongs to acme");
    let listed = json(dir.path(), "acme", &["--account", "globex", "ticket", "list"]);
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

// ---------------------------------------------------------------------------
// HR, marketing, chat
// ---------------------------------------------------------------------------

#[test]
fn employee_roster_round_trip() {
    let dir = init_workspace();
    let added = json(
        dir.path(),
        "acme",
        &[
            "employee",
            "add",
            "--name",
            "Dana Reyes",
            "--email",
            "dana@acme.test",
            "--department",
            "Engineering",
            "--salary",
            "80000",
            "--hire-date",
            "2023-04-01",
        ],
    );
    let id = id_of(&added);
    assert_eq!(added["status"], "active");
    assert_eq!(added["hire_date"], "2023-04-01");

    let found = json(dir.path(), "acme", &["employee", "list", "--search", "engineer"]);
    assert_eq!(found.as_array().map(Vec::len), Some(1));

    let stats = json(dir.path(), "acme", &["stats"]);
    assert_eq!(stats["hr"]["headcount"], 1);
    assert_eq!(stats["hr"]["tax_estimate"], 20000.0);

    json(dir.path(), "acme", &["employee", "remove", &id]);
    let listed = json(dir.path(), "acme", &["employee", "list"]);
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

#[test]
fn campaigns_start_as_drafts() {
    let dir = init_workspace();
    let created = json(
        dir.path(),
        "acme",
        &["campaign", "create", "--name", "Spring launch", "--subject", "It's here"],
    );
    let id = id_of(&created);
    assert_eq!(created["status"], "draft");
    assert_eq!(created["type"], "email");
    assert_eq!(created["sent_count"], 0);

    json(dir.path(), "acme", &["campaign", "status", &id, "active"]);
    let active = json(dir.path(), "acme", &["campaign", "list", "--status", "active"]);
    assert_eq!(active.as_array().map(Vec::len), Some(1));

    let stats = json(dir.path(), "acme", &["stats"]);
    assert_eq!(stats["marketing"]["active_campaigns"], 1);
}

#[test]
fn channel_messages_are_oldest_first() {
    let dir = init_workspace();
    let channel = json(dir.path(), "acme", &["channel", "create", "general"]);
    let id = id_of(&channel);
    assert_eq!(channel["description"], "Channel created by acme@example.com");
    assert_eq!(channel["members"][0], "acme");

    json(dir.path(), "acme", &["channel", "post", &id, "first"]);
    json(dir.path(), "acme", &["channel", "post", &id, "second"]);

    let history = json(dir.path(), "acme", &["channel", "show", &id]);
    let texts: Vec<&str> = history["messages"]
        .as_array()
        .expect("messages")
        .iter()
        .filter_map(|m| m["message"].as_str())
        .collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(history["messages"][0]["sender_name"], "acme");
}

// ---------------------------------------------------------------------------
// Output modes
// ---------------------------------------------------------------------------

#[test]
fn text_mode_prints_tab_separated_rows() {
    let dir = init_workspace();
    let id = create_ticket(dir.path(), "Printer jam");
    bz(dir.path())
        .args(["ticket", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{id}\topen\tmedium\tPrinter jam")));
}

#[test]
fn json_errors_are_wrapped() {
    let dir = TempDir::new().expect("temp dir");
    let output = bz(dir.path())
        .args(["stats", "--json"])
        .output()
        .expect("bz should not crash");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"error_code\": \"E1001\""), "stderr: {stderr}");
}

#[test]
fn completions_are_generated() {
    let dir = TempDir::new().expect("temp dir");
    bz(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bz"));
}
