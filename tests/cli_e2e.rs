//! CLI end-to-end tests.
//!
//! These tests spawn the actual `doorbell` binary and validate stdout/exit codes.
//!
//! Exit code expectations:
//! - 0: Success
//! - 2: Invalid arguments (missing file, malformed JSON)
//! - 3: Declaration error (collision, bad name)
//! - 4: Dispatch error (no operation, overflow)

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run doorbell with given arguments and return (stdout, stderr, exit_code).
fn run_doorbell(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_doorbell"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute doorbell");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

/// Write `contents` to `name` inside `dir` and return the path as a string.
fn write_input(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write input");
    path_str(&path)
}

fn path_str(path: &Path) -> String {
    path.to_str().expect("utf-8 temp path").to_string()
}

fn parse(stdout: &str) -> Value {
    serde_json::from_str(stdout).expect("stdout should be valid JSON")
}

// ============================================================================
// check
// ============================================================================

#[test]
fn check_prints_resolved_table() {
    let dir = TempDir::new().unwrap();
    let path = write_input(
        &dir,
        "kinds.json",
        r#"{
            "kinds": [
                { "kind": "Value", "naming": { "auto": "identity" } },
                { "kind": "Add", "parent": "Value" },
                { "kind": "Mult", "parent": "Add", "naming": { "explicit": "Multiply" } },
                { "kind": "Raw", "parent": "Value", "naming": "suspend" }
            ]
        }"#,
    );

    let (stdout, _stderr, exit_code) = run_doorbell(&["check", &path]);
    assert_eq!(exit_code, 0);

    let json = parse(&stdout);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["schema_version"], "1");
    let methods: Vec<_> = json["kinds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["method"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(methods, ["visit_Value", "visit_Add", "visit_Multiply", "visit_Value"]);
}

#[test]
fn check_reports_collision_with_exit_3() {
    let dir = TempDir::new().unwrap();
    let path = write_input(
        &dir,
        "kinds.json",
        r#"{
            "kinds": [
                { "kind": "MyClass", "naming": { "auto": "upper" } },
                { "kind": "MyClAsS", "parent": "MyClass" }
            ]
        }"#,
    );

    let (stdout, _stderr, exit_code) = run_doorbell(&["check", &path]);
    assert_eq!(exit_code, 3);

    let json = parse(&stdout);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
    assert!(json["error"]["message"].as_str().unwrap().contains("MYCLASS"));
}

#[test]
fn check_missing_file_returns_exit_2() {
    let dir = TempDir::new().unwrap();
    let missing = path_str(&dir.path().join("nope.json"));

    let (stdout, _stderr, exit_code) = run_doorbell(&["check", &missing]);
    assert_eq!(exit_code, 2);
    let json = parse(&stdout);
    assert_eq!(json["error"]["code"], 2);
    assert_eq!(json["error"]["details"]["path"], missing.as_str());
}

#[test]
fn check_malformed_json_returns_exit_2() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "kinds.json", r#"{ "kinds": [ { "kind": "A", "naming": "later" } ] }"#);

    let (stdout, _stderr, exit_code) = run_doorbell(&["check", &path]);
    assert_eq!(exit_code, 2);
    assert_eq!(parse(&stdout)["status"], "error");
}

// ============================================================================
// eval
// ============================================================================

#[test]
fn eval_prints_value_and_rendering() {
    let dir = TempDir::new().unwrap();
    let path = write_input(
        &dir,
        "expr.json",
        r#"{ "multiply": [ { "add": [ { "value": 1 }, { "value": 1 } ] }, { "add": [ { "value": 1 }, { "value": 1 } ] } ] }"#,
    );

    let (stdout, _stderr, exit_code) = run_doorbell(&["eval", &path]);
    assert_eq!(exit_code, 0);

    let json = parse(&stdout);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["value"], 4);
    assert_eq!(json["expression"], "(1 + 1) * (1 + 1)");
    assert_eq!(json["nodes_visited"], 7);
}

#[test]
fn eval_variable_returns_exit_4() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "expr.json", r#"{ "add": [ { "value": 1 }, { "var": "x" } ] }"#);

    let (stdout, _stderr, exit_code) = run_doorbell(&["eval", &path]);
    assert_eq!(exit_code, 4);

    let json = parse(&stdout);
    assert_eq!(json["error"]["code"], 4);
    assert_eq!(json["error"]["details"]["kind"], "Var");
}

#[test]
fn eval_lenient_treats_variable_as_zero() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "expr.json", r#"{ "add": [ { "value": 1 }, { "var": "x" } ] }"#);

    let (stdout, _stderr, exit_code) = run_doorbell(&["eval", &path, "--lenient"]);
    assert_eq!(exit_code, 0);

    let json = parse(&stdout);
    assert_eq!(json["value"], 1);
    assert_eq!(json["expression"], "1 + x");
}

#[test]
fn eval_overflow_returns_exit_4() {
    let dir = TempDir::new().unwrap();
    let path = write_input(
        &dir,
        "expr.json",
        r#"{ "negate": { "value": -9223372036854775808 } }"#,
    );

    let (stdout, _stderr, exit_code) = run_doorbell(&["eval", &path]);
    assert_eq!(exit_code, 4);
    assert!(parse(&stdout)["error"]["message"]
        .as_str()
        .unwrap()
        .contains("overflow"));
}

#[test]
fn trace_log_level_writes_hook_phases_to_stderr() {
    let dir = TempDir::new().unwrap();
    let path = write_input(&dir, "expr.json", r#"{ "value": 3 }"#);

    let (stdout, stderr, exit_code) = run_doorbell(&["--log-level", "trace", "eval", &path]);
    assert_eq!(exit_code, 0);
    assert_eq!(parse(&stdout)["value"], 3);
    assert!(stderr.contains("traversal started"));
    assert!(stderr.contains("node evaluated"));
}
