//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary config file and
//! verify its JSON output.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Run a CLI command with the given config file and return output.
fn run_cli(config: &Path, args: &[&str]) -> (i32, String, String) {
    run_cli_with_timezones(config, args, None)
}

fn run_cli_with_timezones(config: &Path, args: &[&str], timezones: Option<&str>) -> (i32, String, String) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_availability-cli"));
    cmd.arg("--config").arg(config).args(args);
    match timezones {
        Some(list) => cmd.env("CAL_TIMEZONES", list),
        None => cmd.env_remove("CAL_TIMEZONES"),
    };
    let output = cmd.output().expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const REQUEST: &str = r#"[
    {"id": 1, "start": "2024-03-04T09:00:00Z", "end": "2024-03-04T10:00:00Z"},
    {"id": 2, "start": "2024-03-04T11:00:00Z", "end": "2024-03-04T12:00:00Z"},
    {"id": 3, "start": "2024-03-05T08:00:00Z", "end": "2024-03-05T18:00:00Z", "allowPartial": true}
]"#;

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let (code, stdout, _) = run_cli(&config, &["config", "get", "capabilities.allow_maybe"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "false");
    assert!(config.exists(), "defaults should be written on first load");

    let (code, _, _) = run_cli(&config, &["config", "set", "capabilities.allow_maybe", "true"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(&config, &["config", "get", "capabilities.allow_maybe"]);
    assert_eq!(stdout.trim(), "true");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (code, _, stderr) = run_cli(&config, &["config", "set", "capabilities.bogus", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "stderr was {stderr}");
}

#[test]
fn test_init_lays_out_request() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let request = write(dir.path(), "request.json", REQUEST);

    let (code, stdout, stderr) = run_cli(&config, &["init", "--request", request.to_str().unwrap()]);
    assert_eq!(code, 0, "stderr: {stderr}");
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["selectable"], true);
    assert_eq!(out["init"]["numberOfDays"], 2);
    assert_eq!(out["init"]["windows"].as_array().unwrap().len(), 1);
    let events = out["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["type"], "slot");
    assert_eq!(events[0]["style"]["label"], "No Answer");
    assert!(events[0]["style"]["color"].is_null());
}

#[test]
fn test_init_timezones_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let request = write(dir.path(), "request.json", REQUEST);
    let args = ["init", "--request", request.to_str().unwrap()];

    let (code, stdout, stderr) = run_cli_with_timezones(&config, &args, Some("UTC, Asia/Tokyo"));
    assert_eq!(code, 0, "stderr: {stderr}");
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["init"]["timezones"], serde_json::json!(["UTC", "Asia/Tokyo"]));
    // "local" is the configured default but is not in the overriding list.
    assert!(out["init"]["defaultTimezone"].is_null());

    let (_, stdout, _) = run_cli(&config, &args);
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["init"]["timezones"], serde_json::json!(["local", "UTC"]));
    assert_eq!(out["init"]["defaultTimezone"], "local");
}

#[test]
fn test_replay_submits_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let init = write(
        dir.path(),
        "init.json",
        r#"{"slots": [
            {"sourceId": "A", "start": "2024-03-04T09:00:00Z", "end": "2024-03-04T10:00:00Z"},
            {"sourceId": "B", "start": "2024-03-04T11:00:00Z", "end": "2024-03-04T12:00:00Z"}
        ]}"#,
    );
    let gestures = write(
        dir.path(),
        "gestures.json",
        r#"[
            {"action": "click", "event": 1},
            {"action": "click", "event": 2},
            {"action": "click", "event": 2},
            {"action": "select", "start": "2024-03-05T09:00:00Z", "end": "2024-03-05T11:00:00Z"},
            {"action": "select", "start": "2024-03-05T13:00:00Z", "end": "2024-03-05T14:00:00Z"},
            {"action": "shift_click", "event": 4},
            {"action": "navigate", "navigation": {"to": "next"}},
            {"action": "submit"},
            {"action": "click", "event": 1},
            {"action": "submit"}
        ]"#,
    );

    let (code, stdout, stderr) = run_cli(
        &config,
        &[
            "replay",
            "--init",
            init.to_str().unwrap(),
            "--gestures",
            gestures.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["submitted"], true);

    let outbound = &out["outbound"];
    assert_eq!(outbound["slots"][0]["availability"], "Available");
    assert_eq!(outbound["slots"][1]["availability"], "Unavailable");
    assert_eq!(outbound["spans"].as_array().unwrap().len(), 1);
    assert_eq!(outbound["spans"][0]["maybe"], false);

    // The click after submitting changes the live calendar, not the payload.
    assert_eq!(out["snapshot"]["slots"][0]["availability"], "Unavailable");
    let submitted = out["changes"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["type"] == "Submitted")
        .count();
    assert_eq!(submitted, 1);
}

#[test]
fn test_replay_strict_config_refuses_unanswered() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(
        dir.path(),
        "config.toml",
        "[capabilities]\nrequire_all_slots_answered = true\n",
    );
    let init = write(
        dir.path(),
        "init.json",
        r#"{"slots": [{"sourceId": 7, "start": 1709542800, "end": 1709546400}]}"#,
    );
    let gestures = write(dir.path(), "gestures.json", r#"[{"action": "submit"}]"#);

    let (code, stdout, stderr) = run_cli(
        &config,
        &[
            "replay",
            "--init",
            init.to_str().unwrap(),
            "--gestures",
            gestures.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["submitted"], false);
    assert!(out["outbound"].is_null());
    assert_eq!(out["refused"].as_array().unwrap().len(), 1);
}

#[test]
fn test_replay_malformed_init_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let init = write(dir.path(), "init.json", r#"{"slots": [{"start": 1709542800, "end": 1709546400}]}"#);
    let gestures = write(dir.path(), "gestures.json", "[]");

    let (code, _, stderr) = run_cli(
        &config,
        &[
            "replay",
            "--init",
            init.to_str().unwrap(),
            "--gestures",
            gestures.to_str().unwrap(),
        ],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("Malformed slot proposal"), "stderr was {stderr}");
}

#[test]
fn test_check_merges_and_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let request = write(dir.path(), "request.json", REQUEST);
    let good = write(
        dir.path(),
        "good.json",
        r#"{"slots": [], "spans": [
            {"start": "2024-03-05T10:00:00Z", "end": "2024-03-05T11:00:00Z", "maybe": false},
            {"start": "2024-03-05T09:00:00Z", "end": "2024-03-05T10:00:00Z", "maybe": false}
        ]}"#,
    );
    let (code, stdout, stderr) = run_cli(
        &config,
        &["check", "--payload", good.to_str().unwrap(), "--request", request.to_str().unwrap()],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["payload"]["spans"].as_array().unwrap().len(), 1);
    assert_eq!(out["summary"]["span_duration"], 7200.0);

    let outside = write(
        dir.path(),
        "outside.json",
        r#"{"spans": [{"start": "2024-03-05T17:00:00Z", "end": "2024-03-05T19:00:00Z"}]}"#,
    );
    let (code, _, stderr) = run_cli(
        &config,
        &["check", "--payload", outside.to_str().unwrap(), "--request", request.to_str().unwrap()],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("requested times"), "stderr was {stderr}");
}

#[test]
fn test_replay_move_of_unknown_event_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let init = write(dir.path(), "init.json", "{}");
    let gestures = write(
        dir.path(),
        "gestures.json",
        r#"[
            {"action": "select", "start": "2024-03-05T09:00:00Z", "end": "2024-03-05T10:00:00Z"},
            {"action": "move", "event": 9, "start": "2024-03-05T12:00:00Z", "end": "2024-03-05T13:00:00Z"},
            {"action": "move", "event": 1, "start": "2024-03-05T10:00:00Z", "end": "2024-03-05T11:30:00Z"},
            {"action": "submit"}
        ]"#,
    );

    let (code, stdout, stderr) = run_cli(
        &config,
        &[
            "replay",
            "--init",
            init.to_str().unwrap(),
            "--gestures",
            gestures.to_str().unwrap(),
        ],
    );
    assert_eq!(code, 0, "stderr: {stderr}");
    let out: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(out["outbound"]["spans"][0]["start"], "2024-03-05T10:00:00+00:00");
    assert_eq!(out["outbound"]["spans"][0]["end"], "2024-03-05T11:30:00+00:00");
}
