//! Report targets: console tree, JSON on stdout, report files.

use crate::prelude::*;

fn warning_project() -> Project {
    let temp = Project::empty();
    temp.config(
        r#"
[tools.lint]
command = "bin/lint"

[dimensions.lint]
all = ["lint"]
"#,
    );
    temp.tool(
        "lint",
        "echo 'src/a.ts:3: warning: prefer const'\necho 'src/a.ts:9: warning: no <var>'\nexit 1",
    );
    temp
}

fn schema() -> serde_json::Value {
    let schema_path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("docs/specs/report.schema.json");
    let schema_str = std::fs::read_to_string(&schema_path).unwrap();
    serde_json::from_str(&schema_str).unwrap()
}

/// > The JSON report validates against docs/specs/report.schema.json
#[test]
fn json_report_validates_against_schema() {
    let temp = warning_project();
    let json = qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .json(2);

    let compiled = jsonschema::validator_for(&schema()).expect("schema should be valid");
    assert!(
        compiled.is_valid(&json),
        "report should validate against schema:\n{json:#}"
    );
}

#[test]
fn json_report_has_required_fields() {
    let temp = warning_project();
    let json = qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .json(2);
    for key in [
        "version",
        "timestamp",
        "duration",
        "context",
        "plan",
        "results",
        "statistics",
        "status",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["context"]["branch"]["name"], "unknown");
}

/// > The console tree groups violations by file
#[test]
fn console_tree_groups_by_file() {
    let temp = warning_project();
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .warns()
        .stdout_has("lint: WARNING\n  lint: WARNING (exit 1, ")
        .stdout_has("    src/a.ts\n      3: warning: prefer const\n      9: warning: no <var>\n")
        .stdout_has("1 dimension: 0 passed, 1 warning, 0 failed")
        .stdout_has("Status: WARNING");
}

/// > --limit caps console violations
#[test]
fn limit_truncates_console_output() {
    let temp = warning_project();
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint", "--limit", "1"])
        .warns()
        .stdout_has("Stopped after 1 violations. Use --no-limit to see all.")
        .stdout_lacks("no <var>");
}

/// > --report <file>.json writes JSON and keeps the tree on stdout
#[test]
fn json_file_report() {
    let temp = warning_project();
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint", "--report", "out/run.json"])
        .warns()
        .stdout_has("Status: WARNING");
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(temp.path().join("out/run.json")).unwrap())
            .unwrap();
    assert_eq!(json["status"], "warning");
}

/// > --report html writes .qgate/report.html with escaped content
#[test]
fn html_report_written_to_state_dir() {
    let temp = warning_project();
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint", "--report", "html"])
        .warns()
        .stderr_has("report written to");
    let html = std::fs::read_to_string(temp.path().join(".qgate/report.html")).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("no &lt;var&gt;"));
}

/// > JSON on stdout replaces the tree
#[test]
fn json_stdout_has_no_tree() {
    let temp = warning_project();
    let out = qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint", "--report", "json"])
        .warns()
        .stdout();
    assert!(!out.contains("Status:"));
    assert!(out.trim_start().starts_with('{'));
}
