// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color for the console report.
//!
//! `NO_COLOR` always wins, then `COLOR` forces color on. Otherwise color is
//! used only on an interactive stdout outside CI and agent sessions.

use std::io::IsTerminal;
use termcolor::{ColorChoice, ColorSpec};

use crate::aggregate::Status;
use crate::dimension::Severity;

/// Pick the color choice for stdout. An empty `NO_COLOR` still disables color.
pub fn resolve_color() -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    if std::env::var_os("COLOR").is_some() {
        return ColorChoice::Always;
    }
    if !std::io::stdout().is_terminal() {
        return ColorChoice::Never;
    }
    if is_agent_environment() {
        return ColorChoice::Never;
    }
    ColorChoice::Auto
}

const NON_INTERACTIVE_VARS: [&str; 4] = ["CI", "CLAUDE_CODE", "CODEX", "CURSOR"];

fn is_agent_environment() -> bool {
    NON_INTERACTIVE_VARS
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Color scheme for the report tree.
pub mod scheme {
    use termcolor::{Color, ColorSpec};

    fn spec(fg: Option<Color>, bold: bool) -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(fg).set_bold(bold);
        spec
    }

    pub fn dimension() -> ColorSpec {
        spec(None, true)
    }

    pub fn fail() -> ColorSpec {
        spec(Some(Color::Red), true)
    }

    pub fn pass() -> ColorSpec {
        spec(Some(Color::Green), true)
    }

    pub fn warn() -> ColorSpec {
        spec(Some(Color::Yellow), true)
    }

    /// Pending dimensions and secondary details (timings, exit codes).
    pub fn muted() -> ColorSpec {
        spec(Some(Color::Ansi256(245)), false)
    }

    pub fn path() -> ColorSpec {
        spec(Some(Color::Cyan), false)
    }

    pub fn line_number() -> ColorSpec {
        spec(Some(Color::Yellow), false)
    }
}

/// Color for a status label.
pub fn status(status: Status) -> ColorSpec {
    match status {
        Status::Passed => scheme::pass(),
        Status::Warning => scheme::warn(),
        Status::Failed => scheme::fail(),
        Status::Pending => scheme::muted(),
    }
}

/// Color for a severity label.
pub fn severity(severity: Severity) -> ColorSpec {
    match severity {
        Severity::Error => scheme::fail(),
        Severity::Warning => scheme::warn(),
        Severity::Info => scheme::muted(),
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
