// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for report formatter tests.

// Test helpers that use unwrap for clarity (tests should panic on unexpected failures).
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::PathBuf;
use std::time::Duration;

use crate::aggregate::ResultAggregator;
use crate::context::{BranchInfo, ExecutionContext};
use crate::dimension::{Dimension, ScopeSelector};
use crate::mapper::MappingMode;
use crate::plan::ValidationPlan;
use crate::strategy::Mode;
use crate::tool::{ToolExecutionResult, Violation};

use super::{ReportFormatter, RunReport};

/// Assert that buffered and streamed output match for a formatter.
pub fn assert_buffered_matches_streamed<F: ReportFormatter>(formatter: &F, report: &RunReport) {
    let buffered = formatter.format(report).unwrap();
    let mut streamed = Vec::new();
    formatter.format_to(&mut streamed, report).unwrap();
    let streamed_str = String::from_utf8(streamed).unwrap();
    assert_eq!(
        buffered, streamed_str,
        "Buffered and streamed output should match"
    );
}

pub fn tool_result(
    tool: &str,
    dimension: Dimension,
    exit_code: i32,
    violations: Vec<Violation>,
) -> ToolExecutionResult {
    ToolExecutionResult {
        tool: tool.to_string(),
        dimension,
        exit_code,
        stdout: String::new(),
        stderr: String::new(),
        timed_out: false,
        execution_time_ms: 120,
        violations,
    }
}

/// Report over the given results, planned for `dimensions`.
pub fn report_with(dimensions: &[Dimension], results: Vec<ToolExecutionResult>) -> RunReport {
    let mut context = ExecutionContext::degraded("/repo");
    context.branch = BranchInfo::new("feature/login");
    context.files.staged = vec![PathBuf::from("src/app.ts")];
    let plan = ValidationPlan {
        mode: Mode::Full,
        dimensions: dimensions.to_vec(),
        scope: ScopeSelector::default(),
        mapping: MappingMode::PerTool,
        task: None,
        files: Vec::new(),
        tools: Vec::new(),
    };
    let aggregation = ResultAggregator::aggregate(dimensions, results);
    RunReport::new(context, plan, aggregation, Duration::from_millis(1500))
}

/// A report with one failing, one warning, and one passing dimension.
pub fn create_test_report() -> RunReport {
    report_with(
        &[Dimension::Format, Dimension::Lint, Dimension::Test],
        vec![
            tool_result("prettier", Dimension::Format, 0, vec![]),
            tool_result(
                "eslint",
                Dimension::Lint,
                1,
                vec![
                    Violation::error("'x' is never used")
                        .at("src/app.ts", Some(3))
                        .with_rule("no-unused-vars"),
                    Violation::warning("prefer const").at("src/app.ts", Some(9)),
                    Violation::warning("missing semicolon <script>").at("src/util.ts", None),
                ],
            ),
            tool_result(
                "vitest",
                Dimension::Test,
                1,
                vec![Violation::warning("2 tests skipped")],
            ),
        ],
    )
}
