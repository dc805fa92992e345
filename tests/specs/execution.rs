//! Execution: timeouts, faults, and parallelism.

use std::time::{Duration, Instant};

use crate::prelude::*;

fn single_tool(body: &str, extra: &str) -> Project {
    let temp = Project::empty();
    temp.config(&format!(
        "[tools.t]\ncommand = \"bin/t\"\n{extra}\n\n[dimensions.lint]\nall = [\"t\"]\n"
    ));
    temp.tool("t", body);
    temp
}

/// > P4: a hanging tool is killed, marked timed out, and the run finishes
#[cfg(unix)]
#[test]
fn hanging_tool_times_out() {
    let temp = single_tool("sleep 30", "timeout = \"300ms\"");
    let start = Instant::now();
    let json = qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .json(1);
    assert!(start.elapsed() < Duration::from_secs(15));

    let item = &json["results"][0]["items"][0];
    assert_eq!(item["timed_out"], true);
    assert_eq!(item["exit_code"], 143);
    assert_eq!(item["violations"][0]["rule"], "timeout");
    assert_eq!(json["status"], "failed");
}

/// > Timed-out tools show inline in the tree
#[cfg(unix)]
#[test]
fn timed_out_tool_shown_in_tree() {
    let temp = single_tool("sleep 30", "timeout = \"200ms\"");
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .fails()
        .stdout_has("  t: FAILED (exit 143")
        .stdout_has("timed out");
}

/// > Parallel execution keeps results in plan order
#[test]
fn parallel_results_keep_plan_order() {
    let temp = Project::empty();
    temp.config(
        r#"
[tools.slow]
command = "bin/slow"

[tools.fast]
command = "bin/fast"

[dimensions.lint]
all = ["slow", "fast"]
"#,
    );
    temp.tool("slow", "sleep 1\nexit 0");
    temp.tool("fast", "exit 0");
    let json = qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint", "-j", "2"])
        .json(0);
    let items = json["results"][0]["items"].as_array().unwrap();
    assert_eq!(items[0]["tool"], "slow");
    assert_eq!(items[1]["tool"], "fast");
}

/// > --sequential runs the same plan one tool at a time
#[test]
fn sequential_run_passes() {
    let temp = Project::all_ok();
    qgate()
        .pwd(temp.path())
        .args(&["--sequential"])
        .passes();
}

/// > Tool env from config reaches the process
#[test]
fn tool_env_is_exported() {
    let temp = single_tool(
        "echo \"$GREETING\" > env.txt\nexit 0",
        "[tools.t.env]\nGREETING = \"hello\"",
    );
    qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .passes();
    assert_eq!(std::fs::read_to_string(temp.path().join("env.txt")).unwrap().trim(), "hello");
}

/// > JSON output tools are parsed into violations
#[test]
fn json_output_tool_is_parsed() {
    let temp = single_tool(
        r#"echo '[{"severity":"warning","message":"shadowed","file":"a.py","line":2,"rule":"W1"}]'"#,
        "output = \"json\"",
    );
    let json = qgate()
        .pwd(temp.path())
        .args(&["--dimension", "lint"])
        .json(2);
    let violation = &json["results"][0]["items"][0]["violations"][0];
    assert_eq!(violation["file"], "a.py");
    assert_eq!(violation["rule"], "W1");
}
