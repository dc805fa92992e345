// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run reports: console tree, JSON and HTML.
//!
//! The JSON document is the machine-readable artifact for CI and follows
//! docs/specs/report.schema.json.

mod html;
mod json;
mod tree;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::aggregate::{Aggregation, DimensionResult, Statistics, Status};
use crate::context::ExecutionContext;
use crate::detect::STATE_DIR;
use crate::error::ExitCode;
use crate::plan::ValidationPlan;

pub use html::HtmlFormatter;
pub use json::JsonFormatter;
pub use tree::TreeFormatter;

/// JSON report format version.
pub const REPORT_VERSION: u32 = 1;

/// Default HTML report location under the run root.
pub const DEFAULT_HTML_REPORT: &str = "report.html";

/// Terminal artifact of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub version: u32,
    /// RFC 3339, second precision.
    pub timestamp: String,
    /// Wall-clock run time in milliseconds.
    pub duration: u64,
    pub context: ExecutionContext,
    pub plan: ValidationPlan,
    pub results: Vec<DimensionResult>,
    pub statistics: Statistics,
    pub status: Status,
}

impl RunReport {
    pub fn new(
        context: ExecutionContext,
        plan: ValidationPlan,
        aggregation: Aggregation,
        duration: Duration,
    ) -> Self {
        Self {
            version: REPORT_VERSION,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            duration: duration.as_millis() as u64,
            context,
            plan,
            results: aggregation.results,
            statistics: aggregation.statistics,
            status: aggregation.status,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        self.status.into()
    }
}

/// Trait for formatters that render a whole report at once.
pub trait ReportFormatter {
    fn format(&self, report: &RunReport) -> anyhow::Result<String>;

    fn format_to(
        &self,
        writer: &mut dyn std::io::Write,
        report: &RunReport,
    ) -> anyhow::Result<()> {
        let text = self.format(report)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }
}

/// Console output options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Maximum violations to show (None = unlimited).
    pub limit: Option<usize>,
    /// Show passing tools too.
    pub verbose: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            limit: Some(15),
            verbose: false,
        }
    }
}

impl FormatOptions {
    /// Create options with no limit.
    pub fn no_limit() -> Self {
        Self {
            limit: None,
            ..Self::default()
        }
    }

    /// Create options with a specific limit.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }
}

/// Where `--report` sends the report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReportTarget {
    /// Tree and summary on stdout.
    #[default]
    Console,
    /// JSON on stdout instead of the tree.
    Json,
    /// Tree on stdout, HTML to `.qgate/report.html`.
    Html,
    /// Tree on stdout, JSON to a file.
    JsonFile(PathBuf),
    /// Tree on stdout, HTML to a file.
    HtmlFile(PathBuf),
}

impl ReportTarget {
    /// Path the report file is written to, if any.
    pub fn file(&self, root: &Path) -> Option<PathBuf> {
        match self {
            ReportTarget::Console | ReportTarget::Json => None,
            ReportTarget::Html => Some(root.join(STATE_DIR).join(DEFAULT_HTML_REPORT)),
            ReportTarget::JsonFile(path) | ReportTarget::HtmlFile(path) => Some(path.clone()),
        }
    }

    /// True when the console tree goes to stdout.
    pub fn shows_tree(&self) -> bool {
        *self != ReportTarget::Json
    }
}

impl FromStr for ReportTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" | "text" => return Ok(ReportTarget::Console),
            "json" => return Ok(ReportTarget::Json),
            "html" => return Ok(ReportTarget::Html),
            _ => {}
        }
        let path = PathBuf::from(s);
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ReportTarget::JsonFile(path)),
            Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
                Ok(ReportTarget::HtmlFile(path))
            }
            _ => Err(format!(
                "invalid report `{s}`: expected console, json, html, or a .json/.html file path"
            )),
        }
    }
}

impl fmt::Display for ReportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportTarget::Console => f.write_str("console"),
            ReportTarget::Json => f.write_str("json"),
            ReportTarget::Html => f.write_str("html"),
            ReportTarget::JsonFile(path) | ReportTarget::HtmlFile(path) => {
                write!(f, "{}", path.display())
            }
        }
    }
}

/// Formatter for a report file target.
pub fn file_formatter(target: &ReportTarget) -> Option<Box<dyn ReportFormatter>> {
    match target {
        ReportTarget::Html | ReportTarget::HtmlFile(_) => Some(Box::new(HtmlFormatter)),
        ReportTarget::JsonFile(_) => Some(Box::new(JsonFormatter::new(false))),
        ReportTarget::Console | ReportTarget::Json => None,
    }
}

/// Human-readable duration: `850ms`, `4.2s`, `2m05s`.
pub fn human_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{}m{:02}s", ms / 60_000, (ms % 60_000) / 1000)
    }
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
