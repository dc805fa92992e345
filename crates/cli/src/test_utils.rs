// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared unit test utilities.
//!
//! Provides temp project helpers and a scripted `ProcessRunner` so adapter,
//! detection and executor tests never depend on installed tools.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;

use crate::adapter::ExecutionEnv;
use crate::config::ToolDef;
use crate::detect::ToolDetectionCache;
use crate::dimension::{Dimension, Scope};
use crate::process::{CancelToken, CommandSpec, ProcessOutput, ProcessRunner};
use crate::tool::{EXIT_TERMINATED, Tool, ToolConfig};

/// Creates a temp directory with a minimal qgate.toml.
pub fn temp_project() -> TempDir {
    temp_project_with_config("version = 1\n")
}

/// Creates a temp directory with custom config content.
pub fn temp_project_with_config(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("qgate.toml"), config).unwrap();
    dir
}

/// Creates a directory tree from a list of (path, content) pairs.
///
/// Parent directories are created automatically.
pub fn create_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
}

/// Creates an executable stub at `root/rel` and returns its path.
pub fn write_executable(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

/// Canned behavior for one program.
#[derive(Debug, Clone)]
pub enum Scripted {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    TimeOut,
    SpawnError,
    Panic,
    /// Sleep, then exit 0. Honors cancellation.
    Sleep(Duration),
}

/// A `ProcessRunner` that answers from a script keyed by program file name.
///
/// Version probes (`--version` as the only argument) answer
/// `<name> 1.0.0` unless overridden with `version`.
#[derive(Debug, Default)]
pub struct FakeRunner {
    script: HashMap<String, Scripted>,
    versions: HashMap<String, String>,
    probe_delays: HashMap<String, Duration>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit(mut self, program: &str, code: i32, stdout: &str, stderr: &str) -> Self {
        self.script.insert(
            program.to_string(),
            Scripted::Exit {
                code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    pub fn behave(mut self, program: &str, behavior: Scripted) -> Self {
        self.script.insert(program.to_string(), behavior);
        self
    }

    pub fn version(mut self, program: &str, output: &str) -> Self {
        self.versions
            .insert(program.to_string(), output.to_string());
        self
    }

    /// Make version probes of `program` take `delay`.
    pub fn probe_delay(mut self, program: &str, delay: Duration) -> Self {
        self.probe_delays.insert(program.to_string(), delay);
        self
    }

    /// Every non-probe invocation, in call order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|spec| !is_probe(spec))
            .cloned()
            .collect()
    }

    /// Number of version probes issued for `program`.
    pub fn probes(&self, program: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|spec| is_probe(spec) && name_of(spec) == program)
            .count()
    }
}

fn name_of(spec: &CommandSpec) -> String {
    spec.program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_probe(spec: &CommandSpec) -> bool {
    spec.args.len() == 1 && spec.args[0].starts_with("--version")
}

fn output(code: i32, stdout: String, stderr: String) -> ProcessOutput {
    ProcessOutput {
        exit_code: code,
        stdout,
        stderr,
        timed_out: false,
        cancelled: false,
        elapsed: Duration::from_millis(5),
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, spec: &CommandSpec, cancel: &CancelToken) -> io::Result<ProcessOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        let name = name_of(spec);

        if is_probe(spec) {
            if let Some(delay) = self.probe_delays.get(&name) {
                std::thread::sleep(*delay);
            }
            let text = self
                .versions
                .get(&name)
                .cloned()
                .unwrap_or_else(|| format!("{name} 1.0.0"));
            return Ok(output(0, text, String::new()));
        }

        match self.script.get(&name).cloned() {
            None => Ok(output(0, String::new(), String::new())),
            Some(Scripted::Exit {
                code,
                stdout,
                stderr,
            }) => Ok(output(code, stdout, stderr)),
            Some(Scripted::TimeOut) => Ok(ProcessOutput {
                exit_code: EXIT_TERMINATED,
                stdout: String::new(),
                stderr: String::new(),
                timed_out: true,
                cancelled: false,
                elapsed: spec.timeout,
            }),
            Some(Scripted::SpawnError) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            )),
            Some(Scripted::Panic) => panic!("scripted panic in {name}"),
            Some(Scripted::Sleep(duration)) => {
                let deadline = std::time::Instant::now() + duration;
                while std::time::Instant::now() < deadline {
                    if cancel.is_cancelled() {
                        let mut out = output(EXIT_TERMINATED, String::new(), String::new());
                        out.cancelled = true;
                        return Ok(out);
                    }
                    std::thread::sleep(Duration::from_millis(5));
                }
                Ok(output(0, String::new(), String::new()))
            }
        }
    }
}

/// A planned per-tool invocation of `def`.
pub fn planned_tool(name: &str, def: &ToolDef, dimension: Dimension) -> Tool {
    Tool {
        name: name.to_string(),
        dimension,
        scope: Scope::All,
        config: ToolConfig {
            command: def.command.clone(),
            args: def.args.clone(),
            timeout: def.effective_timeout(),
            env: def.env.clone(),
            dimension_mode: false,
            class: def.class,
            files: Vec::new(),
            path_filter: None,
            disabled_checks: Vec::new(),
            members: Vec::new(),
        },
    }
}

/// Temp project with stub binaries, a scripted runner and a detection cache.
pub struct Harness {
    pub dir: TempDir,
    pub runner: std::sync::Arc<FakeRunner>,
    pub cache: ToolDetectionCache,
    pub cancel: CancelToken,
}

impl Harness {
    /// Stubs each of `bins` under `node_modules/.bin`.
    pub fn new(bins: &[&str], runner: FakeRunner) -> Self {
        let dir = TempDir::new().unwrap();
        for bin in bins {
            write_executable(dir.path(), &format!("node_modules/.bin/{bin}"));
        }
        let runner = std::sync::Arc::new(runner);
        let cache = ToolDetectionCache::new(
            dir.path(),
            runner.clone() as std::sync::Arc<dyn ProcessRunner>,
        );
        Self {
            dir,
            runner,
            cache,
            cancel: CancelToken::new(),
        }
    }

    pub fn env(&self) -> ExecutionEnv<'_> {
        ExecutionEnv {
            root: self.dir.path(),
            runner: self.runner.as_ref(),
            cache: &self.cache,
            cancel: &self.cancel,
        }
    }
}
