// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized default values for configuration.
//!
//! The built-in dimension table covers common frontend, backend and
//! infrastructure tooling. User `[dimensions.*]` entries replace the
//! built-in entry for the same dimension; user `[tools.*]` add or override.

use std::collections::BTreeMap;
use std::time::Duration;

use super::{DimensionEntry, MappingTable, ToolDef};
use crate::adapter::ViolationFormat;
use crate::dimension::{Dimension, Scope, Severity};
use crate::tool::ToolClass;

/// Fast-mode defaults.
pub mod fast {
    use super::{Dimension, Duration};

    /// Dimensions checked by `--fast` (format and lint).
    pub const DIMENSIONS: [Dimension; 2] = [Dimension::Format, Dimension::Lint];

    /// Sub-checks skipped by `--fast`.
    pub const DISABLED_CHECKS: [&str; 2] = ["spelling", "duplication"];

    pub const SIMPLE_TIMEOUT: Duration = Duration::from_secs(30);
    pub const STANDARD_TIMEOUT: Duration = Duration::from_secs(90);
    pub const HEAVY_TIMEOUT: Duration = Duration::from_secs(300);
}

/// Argument used to probe a tool's version.
pub const VERSION_ARG: &str = "--version";

/// Placeholder in tool args replaced by the file or path targets.
pub const FILES_PLACEHOLDER: &str = "{files}";

/// Built-in tool definitions.
pub fn tools() -> BTreeMap<String, ToolDef> {
    let defs = [
        (
            "prettier",
            ToolDef::new("prettier")
                .args(["--list-different", FILES_PLACEHOLDER])
                .class(ToolClass::Simple)
                .output(ViolationFormat::Files)
                .message("file is not formatted"),
        ),
        (
            "ruff-format",
            ToolDef::new("ruff")
                .args(["format", "--check", FILES_PLACEHOLDER])
                .class(ToolClass::Simple)
                .pattern(r"^Would reformat: (?P<file>.+)$")
                .message("file is not formatted"),
        ),
        (
            "terraform-fmt",
            ToolDef::new("terraform")
                .args(["fmt", "-check", "-list=true", "-recursive"])
                .class(ToolClass::Simple)
                .output(ViolationFormat::Files)
                .message("file is not formatted"),
        ),
        (
            "eslint",
            ToolDef::new("eslint")
                .args(["--format", "unix", FILES_PLACEHOLDER])
                .pattern(
                    r"^(?P<file>[^:]+):(?P<line>\d+):\d+: (?P<message>.*?) \[(?P<severity>Error|Warning)/(?P<rule>[^\]]+)\]$",
                ),
        ),
        (
            "ruff",
            ToolDef::new("ruff")
                .args(["check", "--output-format", "concise", FILES_PLACEHOLDER])
                .class(ToolClass::Simple)
                .pattern(
                    r"^(?P<file>[^:]+):(?P<line>\d+):\d+: (?P<rule>[A-Z]+\d+) (?P<message>.*)$",
                ),
        ),
        (
            "hadolint",
            ToolDef::new("hadolint")
                .args(["--no-color", "Dockerfile"])
                .class(ToolClass::Simple)
                .pattern(
                    r"^(?P<file>[^:\s]+):(?P<line>\d+) (?P<rule>\S+) (?P<severity>\w+): (?P<message>.*)$",
                ),
        ),
        (
            "markdownlint",
            ToolDef::new("markdownlint")
                .args([FILES_PLACEHOLDER])
                .class(ToolClass::Simple)
                .severity(Severity::Warning)
                .pattern(
                    r"^(?P<file>[^:\s]+):(?P<line>\d+)(?::\d+)? (?P<rule>\S+) (?P<message>.*)$",
                ),
        ),
        (
            "vitest",
            ToolDef::new("vitest")
                .args(["run"])
                .output(ViolationFormat::ExitCode)
                .message("test suite failed"),
        ),
        (
            "pytest",
            ToolDef::new("pytest")
                .args(["-q"])
                .output(ViolationFormat::ExitCode)
                .message("test suite failed"),
        ),
        (
            "npm-audit",
            ToolDef::new("npm")
                .args(["audit", "--audit-level=high"])
                .output(ViolationFormat::ExitCode)
                .message("vulnerable dependencies found"),
        ),
        (
            "bandit",
            ToolDef::new("bandit")
                .args([
                    "-r",
                    "-q",
                    "-f",
                    "custom",
                    "--msg-template",
                    "{relpath}:{line}: {severity}: {test_id} {msg}",
                    FILES_PLACEHOLDER,
                ]),
        ),
        (
            "trivy",
            ToolDef::new("trivy")
                .args(["fs", "--exit-code", "1", "--quiet", "."])
                .class(ToolClass::Heavy)
                .output(ViolationFormat::ExitCode)
                .message("vulnerabilities found"),
        ),
        (
            "tsc",
            ToolDef::new("tsc")
                .args(["--noEmit", "--pretty", "false"])
                .pattern(
                    r"^(?P<file>[^(]+)\((?P<line>\d+),\d+\): (?P<severity>\w+) (?P<rule>TS\d+): (?P<message>.*)$",
                ),
        ),
    ];
    defs.into_iter()
        .map(|(name, def)| (name.to_string(), def))
        .collect()
}

/// Built-in dimension table.
pub fn dimensions() -> MappingTable {
    let mut table = MappingTable::default();
    table.insert(
        Dimension::Format,
        DimensionEntry::default()
            .scope(Scope::Frontend, ["prettier"])
            .scope(Scope::Backend, ["ruff-format"])
            .scope(Scope::Infrastructure, ["terraform-fmt"])
            .scope(Scope::All, ["prettier", "ruff-format"]),
    );
    table.insert(
        Dimension::Lint,
        DimensionEntry::default()
            .scope(Scope::Frontend, ["eslint"])
            .scope(Scope::Backend, ["ruff"])
            .scope(Scope::Infrastructure, ["hadolint"])
            .scope(Scope::Docs, ["markdownlint"])
            .scope(Scope::All, ["eslint", "ruff"]),
    );
    table.insert(
        Dimension::Test,
        DimensionEntry::default()
            .scope(Scope::Frontend, ["vitest"])
            .scope(Scope::Backend, ["pytest"])
            .scope(Scope::Testing, ["vitest", "pytest"])
            .scope(Scope::All, ["vitest", "pytest"]),
    );
    table.insert(
        Dimension::Security,
        DimensionEntry::default()
            .scope(Scope::Frontend, ["npm-audit"])
            .scope(Scope::Backend, ["bandit"])
            .scope(Scope::Infrastructure, ["trivy"])
            .scope(Scope::All, ["npm-audit", "bandit"]),
    );
    table.insert(
        Dimension::Build,
        DimensionEntry::default()
            .scope(Scope::Frontend, ["tsc"])
            .scope(Scope::All, ["tsc"]),
    );
    table
}

#[cfg(test)]
#[path = "defaults_tests.rs"]
mod tests;
