// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Result aggregation.
//!
//! Status comes from violation severity, never from a raw exit code: a tool
//! may exit non-zero because it found warnings, or exit zero while still
//! reporting errors. Each tool result lands in exactly one bucket.

use std::fmt;

use serde::Serialize;

use crate::dimension::{Dimension, Severity};
use crate::error::ExitCode;
use crate::tool::ToolExecutionResult;

/// Classification of a tool result, a dimension, or the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Warning,
    Failed,
    /// No tool ran for this dimension.
    Pending,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Warning => "warning",
            Status::Failed => "failed",
            Status::Pending => "pending",
        }
    }

    /// Upper-case label for terminal output.
    pub fn label(self) -> &'static str {
        match self {
            Status::Passed => "PASSED",
            Status::Warning => "WARNING",
            Status::Failed => "FAILED",
            Status::Pending => "PENDING",
        }
    }

    /// The more severe of two statuses. Pending yields to anything.
    pub fn worst(self, other: Status) -> Status {
        fn rank(s: Status) -> u8 {
            match s {
                Status::Pending => 0,
                Status::Passed => 1,
                Status::Warning => 2,
                Status::Failed => 3,
            }
        }
        if rank(other) > rank(self) { other } else { self }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Passed | Status::Pending => ExitCode::Success,
            Status::Warning => ExitCode::Warnings,
            Status::Failed => ExitCode::Failed,
        }
    }
}

/// Classify one tool result by its violations.
pub fn classify(result: &ToolExecutionResult) -> Status {
    let mut status = Status::Passed;
    for violation in &result.violations {
        match violation.severity {
            Severity::Error => return Status::Failed,
            Severity::Warning => status = Status::Warning,
            Severity::Info => {}
        }
    }
    status
}

/// Tool results grouped under one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionResult {
    pub dimension: Dimension,
    pub status: Status,
    pub items: Vec<ToolExecutionResult>,
    /// Sum of item execution times.
    pub duration_ms: u64,
}

impl DimensionResult {
    fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            status: Status::Pending,
            items: Vec::new(),
            duration_ms: 0,
        }
    }

    fn push(&mut self, result: ToolExecutionResult) {
        self.status = self.status.worst(classify(&result));
        self.duration_ms += result.execution_time_ms;
        self.items.push(result);
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().map(|r| r.count(Severity::Error)).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.items.iter().map(|r| r.count(Severity::Warning)).sum()
    }
}

/// Counts over dimensions by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
    pub pending: usize,
}

impl Statistics {
    pub fn record(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Passed => self.passed += 1,
            Status::Warning => self.warnings += 1,
            Status::Failed => self.failed += 1,
            Status::Pending => self.pending += 1,
        }
    }

    /// Buckets add up to the total.
    pub fn is_consistent(&self) -> bool {
        self.passed + self.warnings + self.failed + self.pending == self.total
    }
}

/// Output of `ResultAggregator::aggregate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub results: Vec<DimensionResult>,
    pub statistics: Statistics,
    pub status: Status,
}

impl Aggregation {
    pub fn exit_code(&self) -> ExitCode {
        self.status.into()
    }
}

pub struct ResultAggregator;

impl ResultAggregator {
    /// Group results by dimension, in `dimensions` order.
    ///
    /// A planned dimension without results is `pending` and does not affect
    /// the overall status. Results for unplanned dimensions are appended.
    pub fn aggregate(dimensions: &[Dimension], results: Vec<ToolExecutionResult>) -> Aggregation {
        let mut grouped: Vec<DimensionResult> =
            dimensions.iter().map(|&d| DimensionResult::new(d)).collect();

        for result in results {
            let index = match grouped.iter().position(|g| g.dimension == result.dimension) {
                Some(index) => index,
                None => {
                    grouped.push(DimensionResult::new(result.dimension));
                    grouped.len() - 1
                }
            };
            grouped[index].push(result);
        }

        let mut statistics = Statistics::default();
        let mut status = Status::Passed;
        for dimension in &grouped {
            statistics.record(dimension.status);
            if dimension.status != Status::Pending {
                status = status.worst(dimension.status);
            }
        }

        tracing::debug!(
            "aggregated {} dimension(s): {:?} -> {status}",
            grouped.len(),
            statistics
        );
        Aggregation {
            results: grouped,
            statistics,
            status,
        }
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
