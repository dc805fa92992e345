// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON format report output.
//!
//! The report struct serializes directly; field order is the schema order.

use super::{ReportFormatter, RunReport};

/// JSON format report formatter.
pub struct JsonFormatter {
    compact: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter.
    ///
    /// If `compact` is true, outputs single-line JSON without whitespace.
    pub fn new(compact: bool) -> Self {
        Self { compact }
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &RunReport) -> anyhow::Result<String> {
        let mut text = if self.compact {
            serde_json::to_string(report)?
        } else {
            serde_json::to_string_pretty(report)?
        };
        text.push('\n');
        Ok(text)
    }

    fn format_to(
        &self,
        writer: &mut dyn std::io::Write,
        report: &RunReport,
    ) -> anyhow::Result<()> {
        if self.compact {
            serde_json::to_writer(&mut *writer, report)?;
        } else {
            serde_json::to_writer_pretty(&mut *writer, report)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
