//! Mode selection: fast, scope, dimension override, DoD.

use crate::prelude::*;

const FAST_CONFIG: &str = r#"
[tools.fmt]
command = "bin/fmt"
args = ["{files}"]

[tools.lint]
command = "bin/lint"
args = ["{files}"]

[tools.slow]
command = "bin/slow"

[dimensions.format]
all = ["fmt"]

[dimensions.lint]
all = ["lint"]

[dimensions.test]
all = ["slow"]

[dimensions.security]
all = ["slow"]

[dimensions.build]
all = ["slow"]
"#;

fn fast_project() -> Project {
    let temp = Project::empty();
    temp.config(FAST_CONFIG);
    temp.tool("fmt", "exit 0");
    temp.tool(
        "lint",
        "echo \"$@\" > lint-args.txt\necho \"$QGATE_DISABLED_CHECKS\" > lint-disabled.txt\nexit 0",
    );
    temp.tool("slow", "touch slow-ran.txt\nexit 0");
    temp.file("src/app.ts", "export const a = 1;\n");
    git_init(&temp);
    git_branch(&temp, "feature/x");
    temp
}

fn plan(temp: &Project, args: &[&str]) -> serde_json::Value {
    let mut all = args.to_vec();
    all.push("--plan");
    let out = qgate().pwd(temp.path()).args(&all).passes().stdout();
    serde_json::from_str(&out).expect("plan should be JSON")
}

/// > Scenario A: fast mode plans aggregate tools over the staged files
#[test]
fn fast_plan_uses_staged_files_and_aggregates() {
    let temp = fast_project();
    temp.file("src/a.ts", "let x = 1;\n");
    git_add(&temp, "src/a.ts");

    let plan = plan(&temp, &["--fast"]);
    assert_eq!(plan["mode"], "fast");
    assert_eq!(plan["mapping"], "dimension-aggregate");
    assert_eq!(plan["dimensions"], serde_json::json!(["format", "lint"]));
    assert_eq!(plan["files"], serde_json::json!(["src/a.ts"]));
    for tool in plan["tools"].as_array().unwrap() {
        assert_eq!(tool["config"]["dimension_mode"], true);
        assert_eq!(tool["config"]["files"], serde_json::json!(["src/a.ts"]));
    }
}

/// > P3: no staged files falls back to unstaged changes
#[test]
fn fast_plan_falls_back_to_unstaged() {
    let temp = fast_project();
    temp.file("src/app.ts", "export const a = 2;\n");
    let plan = plan(&temp, &["--fast"]);
    assert_eq!(plan["files"], serde_json::json!(["src/app.ts"]));
}

/// > P3: nothing modified still yields a runnable plan
#[test]
fn fast_with_clean_tree_still_runs() {
    let temp = fast_project();
    qgate().pwd(temp.path()).args(&["--fast"]).passes();
    assert_eq!(temp.read("lint-args.txt").trim(), ".");
}

/// > Fast mode runs only format and lint, passing files and disabled checks
#[test]
fn fast_run_targets_staged_files() {
    let temp = fast_project();
    temp.file("src/a.ts", "let x = 1;\n");
    git_add(&temp, "src/a.ts");

    qgate()
        .pwd(temp.path())
        .args(&["--fast", "-v"])
        .passes()
        .stdout_has("format-aggregate: PASSED")
        .stdout_has("lint-aggregate: PASSED");
    assert_eq!(temp.read("lint-args.txt").trim(), "src/a.ts");
    assert_eq!(temp.read("lint-disabled.txt").trim(), "spelling,duplication");
    assert!(!temp.exists("slow-ran.txt"));
}

/// > An explicit dimension override wins over fast-mode defaults
#[test]
fn dimension_override_wins_in_fast_mode() {
    let temp = fast_project();
    let plan = plan(&temp, &["--fast", "--dimension", "security"]);
    assert_eq!(plan["mode"], "fast");
    assert_eq!(plan["dimensions"], serde_json::json!(["security"]));
}

/// > Scenario B: a path-like scope is passed verbatim as a path filter
#[test]
fn path_scope_is_passed_verbatim() {
    let temp = fast_project();
    let plan = plan(&temp, &["--scope", "src/components/Foo"]);
    assert_eq!(plan["mode"], "scope");
    assert_eq!(plan["scope"], "src/components/Foo");
    for tool in plan["tools"].as_array().unwrap() {
        assert_eq!(tool["config"]["path_filter"], "src/components/Foo");
    }

    qgate()
        .pwd(temp.path())
        .args(&["--scope", "src/components/Foo", "--dimension", "lint"])
        .passes();
    assert_eq!(temp.read("lint-args.txt").trim(), "src/components/Foo");
}

/// > Fast mode under a path scope only targets changes inside that path
#[test]
fn fast_path_scope_ignores_changes_elsewhere() {
    let temp = fast_project();
    temp.file("src/components/Foo/Foo.tsx", "export const Foo = 1;\n");
    temp.file("other/x.ts", "let y = 2;\n");
    git_add(&temp, "src/components/Foo/Foo.tsx");
    git_add(&temp, "other/x.ts");

    let plan = plan(&temp, &["--fast", "--scope", "src/components/Foo"]);
    assert_eq!(plan["files"], serde_json::json!(["src/components/Foo/Foo.tsx"]));

    qgate()
        .pwd(temp.path())
        .args(&["--fast", "--scope", "src/components/Foo"])
        .passes();
    assert_eq!(
        temp.read("lint-args.txt").trim(),
        "src/components/Foo/Foo.tsx"
    );
}

#[test]
fn fast_path_scope_without_changes_targets_the_path() {
    let temp = fast_project();
    temp.file("other/x.ts", "let y = 2;\n");
    git_add(&temp, "other/x.ts");

    qgate()
        .pwd(temp.path())
        .args(&["--fast", "--scope", "src/components/Foo"])
        .passes();
    assert_eq!(temp.read("lint-args.txt").trim(), "src/components/Foo");
}

#[test]
fn unknown_scope_is_a_config_error() {
    let temp = fast_project();
    qgate()
        .pwd(temp.path())
        .args(&["--scope", "mobile"])
        .fails()
        .stderr_has("unknown scope `mobile`");
}

/// > Invalid scope/dimension combinations are refused before execution
#[test]
fn incompatible_dimension_for_scope_fails() {
    let temp = Project::all_ok();
    temp.config(
        "[tools.ok]\ncommand = \"bin/ok\"\n\n[dimensions.build]\nfrontend = [\"ok\"]\n",
    );
    qgate()
        .pwd(temp.path())
        .args(&["--scope", "backend", "--dimension", "build"])
        .fails()
        .stderr_has("not available for scope `backend`");
}

/// > A task label with a DoD profile narrows the dimensions
#[test]
fn dod_profile_selects_dimensions() {
    let temp = fast_project();
    temp.config(&format!(
        "{FAST_CONFIG}\n[dod.release]\ndimensions = [\"test\", \"build\"]\n"
    ));
    let plan = plan(&temp, &["release"]);
    assert_eq!(plan["mode"], "dod");
    assert_eq!(plan["task"], "release");
    assert_eq!(plan["dimensions"], serde_json::json!(["test", "build"]));
}

/// > Full mode runs every dimension with no file filter
#[test]
fn full_mode_runs_everything() {
    let temp = fast_project();
    temp.file("src/a.ts", "let x = 1;\n");
    git_add(&temp, "src/a.ts");
    let plan = plan(&temp, &[]);
    assert_eq!(plan["mode"], "full");
    assert_eq!(plan["dimensions"].as_array().unwrap().len(), 5);
    assert!(plan.get("files").is_none());
}
