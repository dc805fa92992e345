// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Console tree output.
//!
//! ```text
//! <dimension>: <STATUS>
//!   <tool>: <STATUS> (exit <code>, <time>)
//!     <file>
//!       <line>: <severity>: <message> [<rule>]
//! ```
//!
//! Passing tools are listed only in verbose mode.

use std::io::Write;

use termcolor::WriteColor;

use super::{FormatOptions, RunReport, human_duration};
use crate::aggregate::{DimensionResult, Statistics, Status, classify};
use crate::color::{self, scheme};
use crate::tool::{ToolExecutionResult, Violation};

/// Tree formatter with color support.
pub struct TreeFormatter<W: WriteColor> {
    out: W,
    options: FormatOptions,
    violations_shown: usize,
    truncated: bool,
}

impl<W: WriteColor> TreeFormatter<W> {
    pub fn new(out: W, options: FormatOptions) -> Self {
        Self {
            out,
            options,
            violations_shown: 0,
            truncated: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write every dimension, the truncation notice, and the summary.
    pub fn write_report(&mut self, report: &RunReport) -> std::io::Result<()> {
        for dimension in &report.results {
            self.write_dimension(dimension)?;
        }
        let total: usize = report
            .results
            .iter()
            .flat_map(|d| &d.items)
            .map(|i| i.violations.len())
            .sum();
        self.write_truncation_message(total)?;
        self.write_summary(&report.statistics, report.status, report.duration)
    }

    /// Write one dimension and its non-passing tools.
    pub fn write_dimension(&mut self, dimension: &DimensionResult) -> std::io::Result<()> {
        self.out.set_color(&scheme::dimension())?;
        write!(self.out, "{}", dimension.dimension)?;
        self.out.reset()?;
        write!(self.out, ": ")?;
        self.write_status(dimension.status)?;
        if dimension.items.is_empty() {
            self.out.set_color(&scheme::muted())?;
            write!(self.out, " (no tools ran)")?;
            self.out.reset()?;
        }
        writeln!(self.out)?;

        for item in &dimension.items {
            let status = classify(item);
            if status == Status::Passed && !self.options.verbose {
                continue;
            }
            self.write_item(item, status)?;
        }
        Ok(())
    }

    fn write_item(&mut self, item: &ToolExecutionResult, status: Status) -> std::io::Result<()> {
        write!(self.out, "  {}: ", item.tool)?;
        self.write_status(status)?;
        self.out.set_color(&scheme::muted())?;
        write!(
            self.out,
            " (exit {}, {}",
            item.exit_code,
            human_duration(item.execution_time_ms)
        )?;
        if item.timed_out {
            write!(self.out, ", timed out")?;
        }
        write!(self.out, ")")?;
        self.out.reset()?;
        writeln!(self.out)?;

        // Group by file, keeping first-appearance order.
        let mut groups: Vec<(Option<&std::path::Path>, Vec<&Violation>)> = Vec::new();
        for violation in &item.violations {
            let file = violation.file.as_deref();
            match groups.iter_mut().find(|(f, _)| *f == file) {
                Some((_, list)) => list.push(violation),
                None => groups.push((file, vec![violation])),
            }
        }

        for (file, violations) in groups {
            let indent = match file {
                Some(path) => {
                    write!(self.out, "    ")?;
                    self.out.set_color(&scheme::path())?;
                    write!(self.out, "{}", path.display())?;
                    self.out.reset()?;
                    writeln!(self.out)?;
                    "      "
                }
                None => "    ",
            };
            for violation in violations {
                if let Some(limit) = self.options.limit
                    && self.violations_shown >= limit
                {
                    self.truncated = true;
                    return Ok(());
                }
                self.write_violation(indent, violation)?;
                self.violations_shown += 1;
            }
        }
        Ok(())
    }

    fn write_violation(&mut self, indent: &str, v: &Violation) -> std::io::Result<()> {
        write!(self.out, "{indent}")?;
        if v.file.is_some()
            && let Some(line) = v.line
        {
            self.out.set_color(&scheme::line_number())?;
            write!(self.out, "{line}")?;
            self.out.reset()?;
            write!(self.out, ": ")?;
        }
        self.out.set_color(&color::severity(v.severity))?;
        write!(self.out, "{}", v.severity)?;
        self.out.reset()?;
        write!(self.out, ": {}", v.message)?;
        if let Some(rule) = &v.rule {
            self.out.set_color(&scheme::muted())?;
            write!(self.out, " [{rule}]")?;
            self.out.reset()?;
        }
        writeln!(self.out)
    }

    fn write_status(&mut self, status: Status) -> std::io::Result<()> {
        self.out.set_color(&color::status(status))?;
        write!(self.out, "{}", status.label())?;
        self.out.reset()
    }

    /// Write the summary and overall status lines.
    pub fn write_summary(
        &mut self,
        stats: &Statistics,
        status: Status,
        duration_ms: u64,
    ) -> std::io::Result<()> {
        writeln!(self.out)?;
        write!(
            self.out,
            "{} dimension{}: {} passed, {} warning, {} failed",
            stats.total,
            if stats.total == 1 { "" } else { "s" },
            stats.passed,
            stats.warnings,
            stats.failed
        )?;
        if stats.pending > 0 {
            write!(self.out, ", {} pending", stats.pending)?;
        }
        writeln!(self.out, " in {}", human_duration(duration_ms))?;
        write!(self.out, "Status: ")?;
        self.write_status(status)?;
        writeln!(self.out)
    }

    /// Write truncation message if applicable.
    pub fn write_truncation_message(&mut self, total: usize) -> std::io::Result<()> {
        if let Some(limit) = self.options.limit
            && self.truncated
            && total > limit
        {
            writeln!(
                self.out,
                "Stopped after {limit} violations. Use --no-limit to see all."
            )?;
        }
        Ok(())
    }

    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    pub fn violations_shown(&self) -> usize {
        self.violations_shown
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
