// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Planned tool invocations and their execution results.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};

use crate::dimension::{Dimension, Scope, Severity};

/// Exit code recorded for a process killed on timeout or cancellation (128 + SIGTERM).
pub const EXIT_TERMINATED: i32 = 143;

/// Exit code recorded for synthetic results of tools that never ran.
pub const EXIT_GENERIC_FAILURE: i32 = 1;

/// Rule attached to the synthetic violation of a timed-out tool.
pub const RULE_TIMEOUT: &str = "timeout";

/// Rule attached to the synthetic violation of a tool that could not run.
pub const RULE_EXECUTION_FAULT: &str = "execution-fault";

/// Adapter weight class, used to pick per-class timeout budgets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ToolClass {
    /// Single-purpose formatters and fast linters.
    Simple,
    #[default]
    Standard,
    /// Multi-language or containerized adapters.
    Heavy,
}

impl ToolClass {
    /// Timeout used when a tool definition does not set one.
    pub fn default_timeout(self) -> Duration {
        match self {
            ToolClass::Simple => Duration::from_secs(60),
            ToolClass::Standard => Duration::from_secs(300),
            ToolClass::Heavy => Duration::from_secs(900),
        }
    }
}

/// Per-invocation settings for a planned tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolConfig {
    /// Binary to execute.
    pub command: String,
    pub args: Vec<String>,
    #[serde(rename = "timeout_ms", serialize_with = "serialize_millis")]
    pub timeout: Duration,
    pub env: BTreeMap<String, String>,
    /// True when one adapter covers the whole dimension.
    pub dimension_mode: bool,
    pub class: ToolClass,
    /// Files the tool should restrict itself to (empty = no file filter).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
    /// Path scope, passed verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_filter: Option<String>,
    /// Slow sub-checks the adapter should skip.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_checks: Vec<String>,
    /// Tools covered by a synthetic dimension-aggregate invocation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// A concrete tool invocation within a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tool {
    pub name: String,
    pub dimension: Dimension,
    /// Mapping-table scope this tool was resolved from.
    pub scope: Scope,
    pub config: ToolConfig,
}

impl Tool {
    /// True for a synthetic tool that runs its member tools internally.
    pub fn is_synthetic_aggregate(&self) -> bool {
        !self.config.members.is_empty()
    }

    /// Targets handed to the adapter: the file filter, else the path filter.
    pub fn targets(&self) -> Vec<String> {
        if !self.config.files.is_empty() {
            return self
                .config
                .files
                .iter()
                .map(|f| f.to_string_lossy().into_owned())
                .collect();
        }
        self.config.path_filter.iter().cloned().collect()
    }
}

/// A single finding reported by a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Tool-specific rule identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Violation {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: None,
            line: None,
            rule: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Attach a file and optional line.
    pub fn at(mut self, file: impl Into<PathBuf>, line: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }
}

/// Raw outcome of one executed tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolExecutionResult {
    pub tool: String,
    pub dimension: Dimension,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub execution_time_ms: u64,
    pub violations: Vec<Violation>,
}

impl ToolExecutionResult {
    /// Synthetic result for a tool that could not be executed.
    pub fn fault(tool: &Tool, message: impl Into<String>, elapsed: Duration) -> Self {
        let message = message.into();
        Self {
            tool: tool.name.clone(),
            dimension: tool.dimension,
            exit_code: EXIT_GENERIC_FAILURE,
            stdout: String::new(),
            stderr: message.clone(),
            timed_out: false,
            execution_time_ms: elapsed.as_millis() as u64,
            violations: vec![Violation::error(message).with_rule(RULE_EXECUTION_FAULT)],
        }
    }

    /// Result for a tool killed after exceeding its timeout.
    pub fn timed_out(tool: &Tool, stdout: String, stderr: String, elapsed: Duration) -> Self {
        let message = format!("timed out after {:?}", tool.config.timeout);
        Self {
            tool: tool.name.clone(),
            dimension: tool.dimension,
            exit_code: EXIT_TERMINATED,
            stdout,
            stderr,
            timed_out: true,
            execution_time_ms: elapsed.as_millis() as u64,
            violations: vec![Violation::error(message).with_rule(RULE_TIMEOUT)],
        }
    }

    /// Result for a tool stopped by run cancellation.
    pub fn cancelled(tool: &Tool, elapsed: Duration) -> Self {
        let mut result = Self::fault(tool, "cancelled", elapsed);
        result.exit_code = EXIT_TERMINATED;
        result
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Warning)
    }

    /// True for synthetic results (timeout, spawn failure, missing adapter).
    pub fn is_fault(&self) -> bool {
        self.timed_out
            || self.violations.iter().any(|v| {
                matches!(v.rule.as_deref(), Some(RULE_EXECUTION_FAULT | RULE_TIMEOUT))
            })
    }
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
