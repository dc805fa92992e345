// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod adapter;
pub mod aggregate;
pub mod cli;
pub mod color;
pub mod config;
pub mod context;
pub mod detect;
pub mod dimension;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod executor;
pub mod git;
pub mod mapper;
pub mod plan;
pub mod process;
pub mod report;
pub mod strategy;
pub mod tool;

pub use aggregate::{DimensionResult, ResultAggregator, Statistics, Status};
pub use cli::Cli;
pub use context::{ContextDetector, ExecutionContext};
pub use dimension::{Dimension, Scope, ScopeSelector, Severity};
pub use error::{Error, ExitCode, Result};
pub use plan::{PlanRequest, PlanSelector, ValidationPlan};
pub use tool::{Tool, ToolExecutionResult, Violation};

#[cfg(test)]
pub mod test_utils;
