// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTML format report output.

use std::fmt::Write as _;

use crate::aggregate::{DimensionResult, Status, classify};
use crate::tool::{ToolExecutionResult, Violation};

use super::{ReportFormatter, RunReport, human_duration};

/// HTML format report formatter.
pub struct HtmlFormatter;

impl HtmlFormatter {
    /// Generate CSS styles for the report.
    fn css() -> &'static str {
        r#":root {
      --bg: #1a1a2e;
      --card-bg: #16213e;
      --text: #eef;
      --muted: #8892b0;
      --accent: #64ffda;
      --pass: #10b981;
      --warn: #f59e0b;
      --fail: #ef4444;
    }
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
      background: var(--bg);
      color: var(--text);
      padding: 2rem;
      line-height: 1.6;
    }
    .container { max-width: 1200px; margin: 0 auto; }
    header {
      margin-bottom: 2rem;
      padding-bottom: 1rem;
      border-bottom: 1px solid var(--card-bg);
    }
    h1 { color: var(--accent); font-size: 1.5rem; }
    h2 { font-size: 1.1rem; margin: 1.5rem 0 0.75rem; }
    .meta { color: var(--muted); font-size: 0.875rem; margin-top: 0.5rem; }
    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(160px, 1fr));
      gap: 1rem;
      margin-bottom: 2rem;
    }
    .card {
      background: var(--card-bg);
      padding: 1.5rem;
      border-radius: 8px;
      border-left: 4px solid var(--accent);
    }
    .card.passed { border-color: var(--pass); }
    .card.warning { border-color: var(--warn); }
    .card.failed { border-color: var(--fail); }
    .card.pending { border-color: var(--muted); }
    .card-title { color: var(--muted); font-size: 0.75rem; text-transform: uppercase; }
    .card-value { font-size: 2rem; font-weight: 600; margin-top: 0.5rem; }
    .status { font-weight: 600; text-transform: uppercase; font-size: 0.75rem; }
    .status.passed { color: var(--pass); }
    .status.warning { color: var(--warn); }
    .status.failed { color: var(--fail); }
    .status.pending { color: var(--muted); }
    table {
      width: 100%;
      border-collapse: collapse;
      background: var(--card-bg);
      border-radius: 8px;
      overflow: hidden;
    }
    th, td { padding: 0.75rem 1rem; text-align: left; vertical-align: top; }
    th { background: rgba(0,0,0,0.2); color: var(--muted); font-size: 0.75rem; text-transform: uppercase; }
    tr:not(:last-child) td { border-bottom: 1px solid var(--bg); }
    ul.violations { list-style: none; font-family: monospace; font-size: 0.8rem; }
    ul.violations li { margin-bottom: 0.25rem; }
    .muted { color: var(--muted); }"#
    }

    /// Render a statistics card.
    fn render_card(title: &str, value: usize, class: &str) -> String {
        format!(
            r#"      <div class="card {class}">
        <div class="card-title">{title}</div>
        <div class="card-value">{value}</div>
      </div>"#
        )
    }

    fn render_status(status: Status) -> String {
        format!(r#"<span class="status {status}">{status}</span>"#)
    }

    fn render_violation(violation: &Violation) -> String {
        let mut location = String::new();
        if let Some(file) = &violation.file {
            location.push_str(&escape(&file.display().to_string()));
            if let Some(line) = violation.line {
                let _ = write!(location, ":{line}");
            }
            location.push_str(": ");
        }
        let rule = violation
            .rule
            .as_deref()
            .map(|r| format!(r#" <span class="muted">[{}]</span>"#, escape(r)))
            .unwrap_or_default();
        format!(
            "<li>{location}{}: {}{rule}</li>",
            violation.severity,
            escape(&violation.message)
        )
    }

    fn render_item(dimension: &DimensionResult, item: &ToolExecutionResult) -> String {
        let violations = if item.violations.is_empty() {
            String::from(r#"<span class="muted">none</span>"#)
        } else {
            let items: Vec<String> = item.violations.iter().map(Self::render_violation).collect();
            format!(r#"<ul class="violations">{}</ul>"#, items.join(""))
        };
        let timed_out = if item.timed_out { " (timed out)" } else { "" };
        format!(
            "        <tr><td>{}</td><td>{}</td><td>{}</td><td>{}{timed_out}</td><td>{}</td><td>{violations}</td></tr>",
            dimension.dimension,
            escape(&item.tool),
            Self::render_status(classify(item)),
            item.exit_code,
            human_duration(item.execution_time_ms),
        )
    }

    fn render_rows(report: &RunReport) -> String {
        let mut rows = Vec::new();
        for dimension in &report.results {
            if dimension.items.is_empty() {
                rows.push(format!(
                    r#"        <tr><td>{}</td><td class="muted">no tools ran</td><td>{}</td><td></td><td></td><td></td></tr>"#,
                    dimension.dimension,
                    Self::render_status(dimension.status)
                ));
                continue;
            }
            for item in &dimension.items {
                rows.push(Self::render_item(dimension, item));
            }
        }
        rows.join("\n")
    }

    /// Render the complete HTML document.
    fn render_document(report: &RunReport, cards: &str, rows: &str) -> String {
        let css = Self::css();
        let branch = escape(&report.context.branch.name);
        let mode = report.plan.mode;
        let scope = escape(&report.plan.scope.to_string());
        let timestamp = escape(&report.timestamp);
        let duration = human_duration(report.duration);
        let status = Self::render_status(report.status);
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>qgate Report</title>
  <style>
    {css}
  </style>
</head>
<body>
  <div class="container">
    <header>
      <h1>qgate Report</h1>
      <div class="meta">Branch: {branch} &middot; Mode: {mode} &middot; Scope: {scope} &middot; {timestamp} &middot; {duration}</div>
      <div class="meta">Status: {status}</div>
    </header>
    <section class="cards">
{cards}
    </section>
    <section>
      <table>
        <thead><tr><th>Dimension</th><th>Tool</th><th>Status</th><th>Exit</th><th>Time</th><th>Violations</th></tr></thead>
        <tbody>
{rows}
        </tbody>
      </table>
    </section>
  </div>
</body>
</html>
"#
        )
    }
}

impl ReportFormatter for HtmlFormatter {
    fn format(&self, report: &RunReport) -> anyhow::Result<String> {
        let stats = &report.statistics;
        let cards = [
            Self::render_card("Dimensions", stats.total, "total"),
            Self::render_card("Passed", stats.passed, "passed"),
            Self::render_card("Warnings", stats.warnings, "warning"),
            Self::render_card("Failed", stats.failed, "failed"),
            Self::render_card("Pending", stats.pending, "pending"),
        ]
        .join("\n");
        let rows = Self::render_rows(report);
        Ok(Self::render_document(report, &cards, &rows))
    }
}

/// Escape text for HTML element and attribute content.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "html_tests.rs"]
mod tests;
