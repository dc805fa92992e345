//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for driving the qgate binary against temporary
//! projects whose tools are `sh` scripts under `bin/`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub use assert_cmd::prelude::*;
pub use predicates;
pub use predicates::prelude::{Predicate, PredicateBooleanExt};
use std::path::Path;
use std::process::Command;

/// `&str` means "contains"; any other `Predicate<str>` is used as-is.
pub trait IntoStrPredicate<P: Predicate<str>> {
    fn into_predicate(self) -> P;
}

impl IntoStrPredicate<predicates::str::ContainsPredicate> for &str {
    fn into_predicate(self) -> predicates::str::ContainsPredicate {
        predicates::str::contains(self)
    }
}

impl<P: Predicate<str>> IntoStrPredicate<P> for P {
    fn into_predicate(self) -> P {
        self
    }
}

/// Returns a Command configured to run the qgate binary
pub fn qgate_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("qgate"));
    cmd.env_remove("QGATE_CONFIG")
        .env_remove("QGATE_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Create a validate builder
pub fn qgate() -> Validate {
    Validate::default()
}

/// Config mapping every dimension to the `ok` tool.
pub const ALL_OK_CONFIG: &str = r#"
[tools.ok]
command = "bin/ok"

[dimensions.format]
all = ["ok"]

[dimensions.lint]
all = ["ok"]

[dimensions.test]
all = ["ok"]

[dimensions.security]
all = ["ok"]

[dimensions.build]
all = ["ok"]
"#;

/// Fluent builder for a qgate run
#[derive(Default)]
pub struct Validate {
    dir: Option<std::path::PathBuf>,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

#[allow(dead_code)]
impl Validate {
    /// Set working directory
    pub fn pwd(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn passes(self) -> RunAssert {
        run_exits(self.command(), 0)
    }

    pub fn fails(self) -> RunAssert {
        run_exits(self.command(), 1)
    }

    pub fn warns(self) -> RunAssert {
        run_exits(self.command(), 2)
    }

    pub fn exits(self, code: i32) -> RunAssert {
        run_exits(self.command(), code)
    }

    /// Run with `--report json` and parse stdout, expecting `code`.
    pub fn json(mut self, code: i32) -> serde_json::Value {
        self.args.extend(["--report".to_string(), "json".to_string()]);
        let output = run_exits(self.command(), code);
        serde_json::from_str(&output.stdout()).expect("stdout should be valid JSON")
    }

    /// Build the command without running it
    fn command(self) -> Command {
        let mut cmd = qgate_cmd();
        cmd.arg("--no-cache");
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }
}

fn run_exits(mut cmd: Command, code: i32) -> RunAssert {
    let run = RunAssert {
        output: cmd.output().expect("qgate should start"),
    };
    assert_eq!(
        run.output.status.code(),
        Some(code),
        "unexpected exit status\n--- stdout\n{}\n--- stderr\n{}",
        run.stdout(),
        run.stderr()
    );
    run
}

/// Captured output of a finished run.
pub struct RunAssert {
    output: std::process::Output,
}

#[allow(dead_code)]
impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has<I, P>(self, predicate: I) -> Self
    where
        I: IntoStrPredicate<P>,
        P: Predicate<str>,
    {
        check("stdout", &self.stdout(), predicate.into_predicate(), true);
        self
    }

    pub fn stdout_lacks<I, P>(self, predicate: I) -> Self
    where
        I: IntoStrPredicate<P>,
        P: Predicate<str>,
    {
        check("stdout", &self.stdout(), predicate.into_predicate(), false);
        self
    }

    pub fn stderr_has<I, P>(self, predicate: I) -> Self
    where
        I: IntoStrPredicate<P>,
        P: Predicate<str>,
    {
        check("stderr", &self.stderr(), predicate.into_predicate(), true);
        self
    }
}

fn check(stream: &str, text: &str, predicate: impl Predicate<str>, expected: bool) {
    assert_eq!(
        predicate.eval(text),
        expected,
        "{stream} {} match:\n{text}",
        if expected { "did not" } else { "should not" }
    );
}

// =============================================================================
// Project
// =============================================================================

/// Temporary test project directory with helper methods.
///
/// - Auto-creates parent directories
/// - Adds the `version = 1` prefix to config
/// - Writes tools as executable `sh` scripts answering `--version`
pub struct Project {
    dir: tempfile::TempDir,
}

#[allow(dead_code)]
impl Project {
    /// Create an empty project with no files
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Project where every dimension runs one passing tool.
    pub fn all_ok() -> Self {
        let temp = Self::empty();
        temp.config(ALL_OK_CONFIG);
        temp.tool("ok", "exit 0");
        temp
    }

    /// Get the project path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write qgate.toml (auto-prefixes with `version = 1` if not present)
    pub fn config(&self, content: &str) {
        let content = if content
            .lines()
            .any(|line| line.trim_start().starts_with("version ="))
        {
            content.to_string()
        } else {
            format!("version = 1\n{}", content)
        };
        std::fs::write(self.dir.path().join("qgate.toml"), content).unwrap();
    }

    /// Write a file at the given path (parent directories created automatically)
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }

    /// Write `bin/<name>`, reporting version 1.4.2 and running `body` otherwise.
    pub fn tool(&self, name: &str, body: &str) {
        let script = format!(
            "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then echo \"{name} 1.4.2\"; exit 0; fi\n{body}\n"
        );
        self.file(format!("bin/{name}"), &script);
        make_executable(&self.dir.path().join("bin").join(name));
    }

    /// Read a file written by a tool.
    pub fn read(&self, path: impl AsRef<Path>) -> String {
        std::fs::read_to_string(self.dir.path().join(path.as_ref())).unwrap()
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.dir.path().join(path.as_ref()).exists()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}

// =============================================================================
// GIT TEST HELPERS
// =============================================================================

fn git(project: &Project, args: &[&str]) {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(project.path())
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Initialize a git repo with an identity and an initial commit
pub fn git_init(project: &Project) {
    git(project, &["init", "-b", "main"]);
    git(project, &["config", "user.email", "test@example.com"]);
    git(project, &["config", "user.name", "Test User"]);
    git(project, &["add", "."]);
    git(project, &["commit", "-m", "feat: initial commit"]);
}

/// Create and switch to a branch
pub fn git_branch(project: &Project, name: &str) {
    git(project, &["checkout", "-b", name]);
}

/// Stage a path
pub fn git_add(project: &Project, path: &str) {
    git(project, &["add", path]);
}
