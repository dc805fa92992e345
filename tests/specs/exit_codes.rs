//! Exit codes are derived from violation severity, not raw tool exit codes.

use crate::prelude::*;

fn lint_project(body: &str) -> Project {
    let temp = Project::all_ok();
    temp.config(&ALL_OK_CONFIG.replace(
        "[dimensions.lint]\nall = [\"ok\"]",
        "[tools.check]\ncommand = \"bin/check\"\n\n[dimensions.lint]\nall = [\"check\"]",
    ));
    temp.tool("check", body);
    temp
}

/// > Zero error/warning violations exits 0
#[test]
fn clean_run_exits_zero() {
    let temp = Project::all_ok();
    qgate()
        .pwd(temp.path())
        .passes()
        .stdout_has("Status: PASSED")
        .stdout_has("5 dimensions: 5 passed, 0 warning, 0 failed");
}

/// > Scenario C: exit 1 with only warning violations is a warning run
#[test]
fn warnings_only_exit_two_even_when_tool_exits_nonzero() {
    let temp = lint_project(
        "echo 'src/a.ts:1: warning: prefer const'\n\
         echo 'src/a.ts:2: warning: prefer const'\n\
         echo 'src/b.ts:7: warning: unused import'\n\
         exit 1",
    );
    let json = qgate().pwd(temp.path()).args(&["--dimension", "lint"]).json(2);
    assert_eq!(json["status"], "warning");
    assert_eq!(json["results"][0]["status"], "warning");
    assert_eq!(json["results"][0]["items"][0]["exit_code"], 1);
    assert_eq!(
        json["results"][0]["items"][0]["violations"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
}

/// > P1: an error violation fails the dimension even when the tool exits 0
#[test]
fn error_violation_fails_despite_exit_zero() {
    let temp = lint_project("echo 'src/a.ts:4: error: no-undef'\nexit 0");
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .fails()
        .stdout_has("lint: FAILED")
        .stdout_has("      4: error: no-undef");
}

/// > A crash with no parseable output is never reported as passed
#[test]
fn crash_with_stderr_fails() {
    let temp = lint_project("echo 'segmentation fault' >&2\nexit 139");
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .fails()
        .stdout_has("exited with code 139");
}

/// > One failed dimension fails the run while others pass
#[test]
fn mixed_dimensions_report_each_status() {
    let temp = lint_project("echo 'src/a.ts:4: error: boom'\nexit 1");
    let json = qgate().pwd(temp.path()).json(1);
    assert_eq!(json["statistics"]["total"], 5);
    assert_eq!(json["statistics"]["failed"], 1);
    assert_eq!(json["statistics"]["passed"], 4);
    assert_eq!(json["statistics"]["warnings"], 0);
}

/// > Output is kept when a background job outlives the tool
#[test]
fn error_survives_background_job_holding_output() {
    let temp = lint_project("echo 'src/a.ts:4: error: no-undef'\nsleep 20 &\nexit 1");
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .fails()
        .stdout_has("lint: FAILED")
        .stdout_has("      4: error: no-undef");
}
