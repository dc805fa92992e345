// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing with clap derive.

use std::path::PathBuf;

use clap::Parser;

use crate::dimension::Dimension;
use crate::report::{FormatOptions, ReportTarget};

/// Plan, run and aggregate quality checks across format, lint, test,
/// security and build
#[derive(Debug, Parser)]
#[command(name = "qgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Task identifier or Definition-of-Done label
    #[arg(value_name = "TASK")]
    pub task: Option<String>,

    /// Pre-commit mode: format and lint over staged changes
    #[arg(long)]
    pub fast: bool,

    /// frontend, backend, infrastructure, testing, docs, all, or a path
    #[arg(long, default_value = "all", value_name = "SCOPE")]
    pub scope: String,

    /// Run only these dimensions (overrides mode defaults)
    #[arg(long = "dimension", value_enum, value_delimiter = ',', value_name = "DIMENSION")]
    pub dimensions: Vec<Dimension>,

    /// Use specific config file
    #[arg(short = 'C', long = "config", env = "QGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show passing tools and enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// console, json, html, or a .json/.html file path
    #[arg(long, default_value = "console", value_name = "TARGET")]
    pub report: ReportTarget,

    /// Worker threads for parallel execution
    #[arg(short = 'j', long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    /// Run tools one at a time
    #[arg(long, conflicts_with = "jobs")]
    pub sequential: bool,

    /// Bypass the tool detection cache
    #[arg(long)]
    pub no_cache: bool,

    /// Print the resolved plan as JSON and exit without running
    #[arg(long)]
    pub plan: bool,

    /// Maximum violations to display (default: 15)
    #[arg(long, default_value_t = 15, value_name = "N")]
    pub limit: usize,

    /// Show all violations (no limit)
    #[arg(long)]
    pub no_limit: bool,
}

impl Cli {
    /// Console output options from `--limit`, `--no-limit` and `--verbose`.
    pub fn format_options(&self) -> FormatOptions {
        let mut options = if self.no_limit {
            FormatOptions::no_limit()
        } else {
            FormatOptions::with_limit(self.limit)
        };
        options.verbose = self.verbose;
        options
    }

    /// Whether tools run concurrently, given the config's `run.parallel`.
    ///
    /// `--sequential` always wins; `--jobs` turns parallelism on.
    pub fn parallel(&self, configured: bool) -> bool {
        !self.sequential && (self.jobs.is_some() || configured)
    }
}

fn parse_jobs(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
