// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tool output parsing.
//!
//! Turns raw stdout/stderr into violations. Four formats are supported:
//! - `lines`: one regex match per line, stdout then stderr
//! - `json`: an array (or `{"violations": [...]}`) of violation objects
//! - `files`: one offending file per stdout line
//! - `exit-code`: a single violation when the process exits non-zero

use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dimension::Severity;
use crate::tool::{RULE_EXECUTION_FAULT, Violation};

/// How a tool reports its findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationFormat {
    #[default]
    Lines,
    Json,
    Files,
    ExitCode,
}

/// `file:line[:col]: message`, where message may start with `severity:`.
pub const DEFAULT_LINE_PATTERN: &str =
    r"^(?P<file>[^:\s][^:]*):(?P<line>\d+)(?::\d+)?:\s*(?P<message>.+)$";

/// Longest stderr excerpt carried into a crash violation.
const CRASH_EXCERPT_LINES: usize = 5;

/// Parser for a single tool's output.
#[derive(Debug, Clone)]
pub struct OutputParser {
    format: ViolationFormat,
    pattern: Regex,
    severity: Severity,
    message: Option<String>,
}

impl OutputParser {
    /// Build a parser. `pattern` overrides the default line pattern.
    pub fn new(
        format: ViolationFormat,
        pattern: Option<&str>,
        severity: Option<Severity>,
        message: Option<String>,
    ) -> Result<Self, regex::Error> {
        let pattern = Regex::new(pattern.unwrap_or(DEFAULT_LINE_PATTERN))?;
        Ok(Self {
            format,
            pattern,
            severity: severity.unwrap_or(Severity::Error),
            message,
        })
    }

    pub fn format(&self) -> ViolationFormat {
        self.format
    }

    /// Parse one execution's output.
    pub fn parse(&self, exit_code: i32, stdout: &str, stderr: &str) -> Vec<Violation> {
        let mut violations = match self.format {
            ViolationFormat::Lines => {
                let mut found = self.parse_lines(stdout);
                found.extend(self.parse_lines(stderr));
                found
            }
            ViolationFormat::Json => self.parse_json(stdout),
            ViolationFormat::Files => self.parse_files(stdout),
            ViolationFormat::ExitCode => self.parse_exit_code(exit_code),
        };

        // A crashed tool must never read as passed.
        if exit_code != 0
            && violations.is_empty()
            && self.format != ViolationFormat::ExitCode
            && !stderr.trim().is_empty()
        {
            violations.push(
                Violation::error(crash_message(exit_code, stderr)).with_rule(RULE_EXECUTION_FAULT),
            );
        }
        violations
    }

    fn parse_lines(&self, text: &str) -> Vec<Violation> {
        text.lines()
            .filter_map(|line| self.parse_line(line.trim_end()))
            .collect()
    }

    fn parse_line(&self, line: &str) -> Option<Violation> {
        let caps = self.pattern.captures(line)?;
        let file = caps.name("file").map(|m| m.as_str().trim().to_string());
        let line_no = caps.name("line").and_then(|m| m.as_str().parse::<u32>().ok());
        let rule = caps.name("rule").map(|m| m.as_str().to_string());

        let (severity, message) = match (caps.name("severity"), caps.name("message")) {
            (Some(sev), Some(msg)) => (
                Severity::from_tool_label(sev.as_str()).unwrap_or(self.severity),
                msg.as_str().trim().to_string(),
            ),
            (Some(sev), None) => (
                Severity::from_tool_label(sev.as_str()).unwrap_or(self.severity),
                self.fallback_message(line),
            ),
            (None, Some(msg)) => split_severity_prefix(msg.as_str())
                .map(|(sev, rest)| (sev, rest.to_string()))
                .unwrap_or_else(|| (self.severity, msg.as_str().trim().to_string())),
            (None, None) => (self.severity, self.fallback_message(line)),
        };

        let mut violation = Violation::new(severity, message);
        if let Some(file) = file.filter(|f| !f.is_empty()) {
            violation = violation.at(file, line_no);
        }
        if let Some(rule) = rule {
            violation = violation.with_rule(rule);
        }
        Some(violation)
    }

    fn fallback_message(&self, line: &str) -> String {
        self.message.clone().unwrap_or_else(|| line.trim().to_string())
    }

    fn parse_json(&self, stdout: &str) -> Vec<Violation> {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        let items = match serde_json::from_str::<JsonReport>(trimmed) {
            Ok(JsonReport::List(items)) => items,
            Ok(JsonReport::Wrapped { violations }) => violations,
            Err(e) => {
                return vec![
                    Violation::error(format!("unparseable JSON output: {e}"))
                        .with_rule(RULE_EXECUTION_FAULT),
                ];
            }
        };
        items
            .into_iter()
            .map(|item| {
                let severity = item
                    .severity
                    .as_deref()
                    .and_then(Severity::from_tool_label)
                    .unwrap_or(self.severity);
                Violation {
                    severity,
                    message: item.message,
                    file: item.file,
                    line: item.line,
                    rule: item.rule,
                }
            })
            .collect()
    }

    fn parse_files(&self, stdout: &str) -> Vec<Violation> {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| "file needs attention".to_string());
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|file| Violation::new(self.severity, message.clone()).at(file, None))
            .collect()
    }

    fn parse_exit_code(&self, exit_code: i32) -> Vec<Violation> {
        if exit_code == 0 {
            return Vec::new();
        }
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("exited with code {exit_code}"));
        vec![Violation::new(self.severity, message)]
    }
}

/// Split a leading `severity:` word off a message.
fn split_severity_prefix(message: &str) -> Option<(Severity, &str)> {
    let (word, rest) = message.split_once(':')?;
    let severity = Severity::from_tool_label(word)?;
    let rest = rest.trim();
    (!rest.is_empty()).then_some((severity, rest))
}

fn crash_message(exit_code: i32, stderr: &str) -> String {
    let excerpt: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(CRASH_EXCERPT_LINES)
        .collect();
    format!("exited with code {exit_code}: {}", excerpt.join(" | "))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonReport {
    List(Vec<JsonViolation>),
    Wrapped { violations: Vec<JsonViolation> },
}

#[derive(Deserialize)]
struct JsonViolation {
    #[serde(default)]
    severity: Option<String>,
    message: String,
    #[serde(default)]
    file: Option<PathBuf>,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    rule: Option<String>,
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
