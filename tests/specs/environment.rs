//! The environment gate: missing or outdated tools abort before anything runs.

use crate::prelude::*;

fn project_with(extra_tool: &str) -> Project {
    let temp = Project::empty();
    temp.config(&format!(
        r#"
[tools.ok]
command = "bin/ok"

{extra_tool}

[dimensions.format]
all = ["ok"]

[dimensions.lint]
all = ["needed"]
"#
    ));
    temp.tool("ok", "touch ok-ran.txt\nexit 0");
    temp
}

/// > A missing binary is fatal and no tool executes
#[test]
fn missing_tool_aborts_before_execution() {
    let temp = project_with("[tools.needed]\ncommand = \"qgate-spec-missing-tool\"");
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "format,lint"])
        .fails()
        .stderr_has("required tool `qgate-spec-missing-tool` not found (needed by needed)")
        .stdout_lacks("Status:");
    assert!(!temp.exists("ok-ran.txt"));
}

/// > Tools outside the plan are not required
#[test]
fn unplanned_missing_tool_is_ignored() {
    let temp = project_with("[tools.needed]\ncommand = \"qgate-spec-missing-tool\"");
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "format"])
        .passes();
    assert!(temp.exists("ok-ran.txt"));
}

/// > A version below min_version is an environment failure
#[test]
fn outdated_tool_fails() {
    let temp = project_with("[tools.needed]\ncommand = \"bin/needed\"\nmin_version = \"2.0\"");
    temp.tool("needed", "exit 0");
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .fails()
        .stderr_has("1.4.2 is older than required 2.0");
}

#[test]
fn satisfied_min_version_runs() {
    let temp = project_with("[tools.needed]\ncommand = \"bin/needed\"\nmin_version = \"1.4\"");
    temp.tool("needed", "exit 0");
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .passes();
}

/// > --plan resolves the plan without checking the environment
#[test]
fn plan_does_not_require_tools() {
    let temp = project_with("[tools.needed]\ncommand = \"qgate-spec-missing-tool\"");
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint", "--plan"])
        .passes()
        .stdout_has("\"qgate-spec-missing-tool\"");
}

/// > Detection is persisted under .qgate/ unless --no-cache is given
#[test]
fn detection_cache_is_persisted() {
    let temp = project_with("[tools.needed]\ncommand = \"bin/needed\"");
    temp.tool("needed", "exit 0");
    qgate_cmd()
        .args(["--dimension", "lint"])
        .current_dir(temp.path())
        .assert()
        .success();
    assert!(temp.exists(".qgate/detect.bin"));

    // A second run reuses the cache and still passes.
    qgate_cmd()
        .args(["--dimension", "lint"])
        .current_dir(temp.path())
        .assert()
        .success();
}

#[test]
fn no_cache_skips_persistence() {
    let temp = project_with("[tools.needed]\ncommand = \"bin/needed\"");
    temp.tool("needed", "exit 0");
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .passes();
    assert!(!temp.exists(".qgate/detect.bin"));
}
