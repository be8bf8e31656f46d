//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against request files in a temp directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_slotwise"))
        .args(args)
        .env_remove("SLOTWISE_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let (code, stdout, stderr) = run_cli(args);
    assert_eq!(code, 0, "command {:?} failed: {}", args, stderr);
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

const REQUEST: &str = r#"{
    "now": "2026-02-16T09:00:00Z",
    "items": [
        {"id": "essay", "title": "Essay draft", "estimated_effort_minutes": 150,
         "deadline": "2026-02-17T18:00:00Z", "container_id": "course"},
        {"id": "quiz", "title": "Quiz prep", "estimated_effort_minutes": 30,
         "deadline": "2026-02-16T12:00:00Z"},
        {"id": "done", "title": "Done already", "completed": true}
    ],
    "busy": [{"start": "2026-02-16T09:00:00Z", "end": "2026-02-16T10:00:00Z"}],
    "history": {"consistency_streak_days": 5}
}"#;

#[test]
fn test_plan_single() {
    let ws = Workspace::new();
    let input = ws.write("req.json", REQUEST);
    let blocks = run_json(&["plan", "--input", s(&input), "--config", s(&ws.config())]);
    let blocks = blocks.as_array().unwrap();

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["item_id"], "quiz");
    assert_eq!(blocks[0]["start"], "2026-02-16T10:00:00Z");
    assert_eq!(blocks[1]["item_id"], "essay");
    assert_eq!(blocks[1]["start"], "2026-02-16T10:30:00Z");
    assert_eq!(blocks[1]["container_id"], "course");
}

#[test]
fn test_plan_chunked_override() {
    let ws = Workspace::new();
    let input = ws.write("req.json", REQUEST);
    let blocks = run_json(&[
        "plan",
        "--input",
        s(&input),
        "--mode",
        "chunked",
        "--config",
        s(&ws.config()),
    ]);
    let essay: Vec<i64> = blocks
        .as_array()
        .unwrap()
        .iter()
        .filter(|b| b["item_id"] == "essay")
        .map(|b| {
            let start = chrono::DateTime::parse_from_rfc3339(b["start"].as_str().unwrap()).unwrap();
            let end = chrono::DateTime::parse_from_rfc3339(b["end"].as_str().unwrap()).unwrap();
            (end - start).num_minutes()
        })
        .collect();
    assert_eq!(essay, vec![60, 60, 30]);
}

#[test]
fn test_assess_output_shape() {
    let ws = Workspace::new();
    let input = ws.write("req.json", REQUEST);
    let out = run_json(&["assess", "--input", s(&input), "--config", s(&ws.config())]);

    assert!(out["blocks"].is_array());
    assert!(out["risks"]["essay"]["miss_probability"].is_number());
    assert!(out["risks"].get("done").is_none());
    assert!(out["outcome"]["score"].is_number());
    assert!(out["outcome"]["effort_gap_hours"].is_number());
}

#[test]
fn test_risk_without_schedule_flags_not_scheduled() {
    let ws = Workspace::new();
    let input = ws.write("req.json", REQUEST);
    let out = run_json(&["risk", "--input", s(&input), "--config", s(&ws.config())]);
    assert_eq!(out["quiz"]["reasons"][0], "not scheduled");
}

#[test]
fn test_outcome_completed_override() {
    let ws = Workspace::new();
    let input = ws.write("req.json", REQUEST);
    let out = run_json(&[
        "outcome",
        "--input",
        s(&input),
        "--completed",
        "3",
        "--config",
        s(&ws.config()),
    ]);
    assert_eq!(out["score"], 100);
    assert_eq!(out["effort_gap_hours"], 0);
}

#[test]
fn test_propose_earlier_slot() {
    let ws = Workspace::new();
    let input = ws.write(
        "req.json",
        r#"{
            "now": "2026-02-16T09:00:00Z",
            "items": [{"id": "essay", "title": "Essay", "estimated_effort_minutes": 60,
                       "deadline": "2026-02-16T20:00:00Z"}],
            "schedule": [{"id": "b1", "item_id": "essay", "container_id": "",
                          "start": "2026-02-16T15:00:00Z", "end": "2026-02-16T16:00:00Z",
                          "assigned_day": "2026-02-16"}]
        }"#,
    );
    let out = run_json(&[
        "propose",
        "--input",
        s(&input),
        "--item",
        "essay",
        "--config",
        s(&ws.config()),
    ]);
    assert_eq!(out["proposed_block"]["start"], "2026-02-16T09:00:00Z");
    assert_eq!(out["original_block"]["id"], "b1");
}

#[test]
fn test_propose_unknown_item_prints_null() {
    let ws = Workspace::new();
    let input = ws.write("req.json", REQUEST);
    let out = run_json(&[
        "propose",
        "--input",
        s(&input),
        "--item",
        "nope",
        "--config",
        s(&ws.config()),
    ]);
    assert!(out.is_null());
}

#[test]
fn test_invalid_request_fails() {
    let ws = Workspace::new();
    let input = ws.write(
        "bad.json",
        r#"{"now": "2026-02-16T09:00:00Z",
            "busy": [{"start": "2026-02-16T12:00:00Z", "end": "2026-02-16T10:00:00Z"}]}"#,
    );
    let (code, _, stderr) = run_cli(&["plan", "--input", s(&input), "--config", s(&ws.config())]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_missing_input_fails() {
    let ws = Workspace::new();
    let missing = ws.dir.path().join("missing.json");
    let (code, _, stderr) = run_cli(&["plan", "--input", s(&missing), "--config", s(&ws.config())]);
    assert_ne!(code, 0);
    assert!(stderr.contains("cannot read"));
}

#[test]
fn test_config_set_get_roundtrip() {
    let ws = Workspace::new();
    let cfg = ws.config();

    let (code, stdout, _) = run_cli(&["config", "get", "allocator.chunk_minutes", "--config", s(&cfg)]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60");

    let (code, stdout, _) = run_cli(&["config", "set", "allocator.chunk_minutes", "45", "--config", s(&cfg)]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");
    assert!(cfg.exists());

    let (_, stdout, _) = run_cli(&["config", "get", "allocator.chunk_minutes", "--config", s(&cfg)]);
    assert_eq!(stdout.trim(), "45");
}

#[test]
fn test_config_rejects_invalid_value() {
    let ws = Workspace::new();
    let cfg = ws.config();
    let (code, _, stderr) = run_cli(&["config", "set", "allocator.chunk_minutes", "0", "--config", s(&cfg)]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
    assert!(!cfg.exists());
}

#[test]
fn test_config_unknown_key() {
    let ws = Workspace::new();
    let (code, _, _) = run_cli(&["config", "get", "nope.nothing", "--config", s(&ws.config())]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_list_is_json() {
    let ws = Workspace::new();
    let out = run_json(&["config", "list", "--config", s(&ws.config())]);
    assert_eq!(out["allocator"]["daily_cap_minutes"], 360);
    assert_eq!(out["reschedule"]["search_days"], 7);
}
