// Integration tests for the `tagcalc` binary.
// Run with: cargo test -p tagcalc-cli --test cli_tests -- --nocapture
//
// Manual smoke test (cannot be automated, requires a real TTY):
//   tagcalc --suggestions-file suggestions.json
//   Verify: typing filters, Up/Down scroll the dropdown, Enter adds a chip,
//   clicking [x] removes it, Esc exits and restores the terminal.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const SUGGESTIONS: &str = r#"[
  {"name": "Water", "category": "solvent", "value": 18, "id": "1"},
  {"name": "Salt", "category": "mineral", "value": 58, "id": 2},
  {"name": "Sodium", "category": "element", "value": 23, "id": "3"}
]"#;

fn tagcalc() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tagcalc"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("TAGCALC_ENDPOINT");
    cmd
}

/// Temp dir holding a suggestions file and an empty settings file.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("suggestions.json"), SUGGESTIONS).unwrap();
    std::fs::write(dir.path().join("settings.json"), "{}").unwrap();
    dir
}

fn offline_args(dir: &Path) -> Vec<String> {
    vec![
        "--suggestions-file".to_string(),
        dir.join("suggestions.json").display().to_string(),
        "--config".to_string(),
        dir.join("settings.json").display().to_string(),
    ]
}

fn run_script(dir: &Path, extra: &[&str], script: &str) -> Output {
    let mut child = tagcalc()
        .arg("run")
        .args(offline_args(dir))
        .args(extra)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn tagcalc run");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    child.wait_with_output().expect("tagcalc run")
}

// ---------------------------------------------------------------------------
// eval
// ---------------------------------------------------------------------------

#[test]
fn eval_respects_precedence() {
    let output = tagcalc().args(["eval", "2+3*4"]).output().expect("tagcalc eval");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "14");
}

#[test]
fn eval_power_is_right_associative() {
    let output = tagcalc().args(["eval", "2^3^2"]).output().expect("tagcalc eval");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "512");
}

#[test]
fn eval_malformed_prints_error_marker() {
    let output = tagcalc().args(["eval", "2++"]).output().expect("tagcalc eval");
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Error");
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error:"));
}

#[test]
fn eval_deep_nesting_is_error_not_abort() {
    let expr = format!("{}1{}", "(".repeat(50_000), ")".repeat(50_000));
    let output = tagcalc().arg("eval").arg(&expr).output().expect("tagcalc eval");
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Error");
}

#[test]
fn run_many_open_parens_is_error_not_abort() {
    let dir = fixture();
    let script = "key (\n".repeat(30_000) + "type water\nenter\n";
    let output = run_script(dir.path(), &["--json"], &script);
    assert_eq!(output.status.code(), Some(3), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["result"], "Error");
    assert_eq!(value["formula"].as_array().unwrap().len(), 30_001);
}

// ---------------------------------------------------------------------------
// suggestions
// ---------------------------------------------------------------------------

#[test]
fn suggestions_filter_case_insensitively() {
    let dir = fixture();
    let output = tagcalc()
        .args(["suggestions", "s"])
        .args(offline_args(dir.path()))
        .output()
        .expect("tagcalc suggestions");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<&str> = stdout.lines().map(|l| l.split_whitespace().next().unwrap()).collect();
    assert_eq!(names, ["Salt", "Sodium"]);
    assert!(stdout.contains("mineral"));
}

#[test]
fn suggestions_json_normalizes_ids() {
    let dir = fixture();
    let output = tagcalc()
        .args(["suggestions", "--json"])
        .args(offline_args(dir.path()))
        .output()
        .expect("tagcalc suggestions --json");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let list = value.as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[1]["id"], "2");
    assert_eq!(list[1]["value"], 58.0);
}

#[test]
fn suggestions_missing_file_exit_code() {
    let dir = fixture();
    let output = tagcalc()
        .args(["suggestions", "--suggestions-file"])
        .arg(dir.path().join("nope.json"))
        .arg("--config")
        .arg(dir.path().join("settings.json"))
        .output()
        .expect("tagcalc suggestions");
    assert_eq!(output.status.code(), Some(13));
}

#[test]
fn suggestions_malformed_file_exit_code() {
    let dir = fixture();
    std::fs::write(dir.path().join("suggestions.json"), "{\"not\": \"a list\"}").unwrap();
    let output = tagcalc()
        .arg("suggestions")
        .args(offline_args(dir.path()))
        .output()
        .expect("tagcalc suggestions");
    assert_eq!(output.status.code(), Some(12));
    assert!(String::from_utf8_lossy(&output.stderr).contains("hint:"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_builds_calculation() {
    let dir = fixture();
    let output = run_script(dir.path(), &[], "type water\nenter\nkey *\ntype sal\ndown\nenter\n");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("formula:     Water * Salt"), "{}", stdout);
    assert!(stdout.contains("calculation: 18*58"));
    assert!(stdout.contains("result:      1044"));
}

#[test]
fn run_json_report() {
    let dir = fixture();
    let output = run_script(
        dir.path(),
        &["--json"],
        "type water\nenter\nkey +\ntype salt\nenter\nclick-tag 0\n",
    );
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["formula"], serde_json::json!(["+", "Salt"]));
    assert_eq!(value["calculation"], "+58");
    assert_eq!(value["result"], "58");
    assert_eq!(value["error"], false);
}

#[test]
fn run_error_result_exits_with_eval_code() {
    let dir = fixture();
    let output = run_script(dir.path(), &["--json"], "type water\nenter\nkey +\n");
    assert_eq!(output.status.code(), Some(3));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["result"], "Error");
    assert_eq!(value["error"], true);
}

#[test]
fn run_strict_rejects_double_operator() {
    let dir = fixture();
    let output = run_script(dir.path(), &["--strict", "--json"], "type water\nenter\nkey +\nkey *\n");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["formula"], serde_json::json!(["Water", "+"]));
    assert_eq!(value["rejected"], 1);
}

#[test]
fn run_bad_script_is_usage_error() {
    let dir = fixture();
    let output = run_script(dir.path(), &[], "type water\nfly\n");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 2: unknown event 'fly'"));
}

// ---------------------------------------------------------------------------
// tui / config
// ---------------------------------------------------------------------------

#[test]
fn tui_without_terminal_fails_cleanly() {
    let output = tagcalc()
        .arg("tui")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .output()
        .expect("tagcalc tui");
    assert_eq!(output.status.code(), Some(20));
    assert!(String::from_utf8_lossy(&output.stderr).contains("hint:"));
}

#[test]
fn config_missing_file_is_usage_error() {
    let dir = fixture();
    let output = tagcalc()
        .arg("config")
        .arg("--config")
        .arg(dir.path().join("missing.json"))
        .output()
        .expect("tagcalc config");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn config_shows_effective_settings() {
    let dir = fixture();
    std::fs::write(
        dir.path().join("settings.json"),
        "{\n  // local mock\n  \"suggestions.endpoint\": \"http://localhost:3000\"\n}\n",
    )
    .unwrap();
    let output = tagcalc()
        .arg("config")
        .arg("--config")
        .arg(dir.path().join("settings.json"))
        .output()
        .expect("tagcalc config");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"suggestions.endpoint\": \"http://localhost:3000\""));
    assert!(stdout.contains("\"ui.maxDropdownRows\": 8"));
}
