// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Execution controller.
//!
//! Runs every planned tool through its adapter, in parallel using rayon
//! unless sequential execution is requested. Adapter errors and panics are
//! isolated per tool and become synthetic fault results, so one broken tool
//! never stops the others. Results come back in plan order.

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::adapter::{AdapterRegistry, ExecutionEnv};
use crate::plan::ValidationPlan;
use crate::tool::{Tool, ToolExecutionResult};

pub struct ExecutionController<'a> {
    registry: &'a AdapterRegistry,
    env: ExecutionEnv<'a>,
    parallel: bool,
    jobs: Option<usize>,
}

impl<'a> ExecutionController<'a> {
    pub fn new(registry: &'a AdapterRegistry, env: ExecutionEnv<'a>) -> Self {
        Self {
            registry,
            env,
            parallel: true,
            jobs: None,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Worker count for parallel runs (None = one per CPU).
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn execute(&self, plan: &ValidationPlan) -> Vec<ToolExecutionResult> {
        let start = Instant::now();
        let results = if self.parallel && plan.tools.len() > 1 {
            self.execute_parallel(&plan.tools)
        } else {
            plan.tools.iter().map(|tool| self.execute_one(tool)).collect()
        };
        tracing::debug!(
            "executed {} tool(s) in {:?}",
            results.len(),
            start.elapsed()
        );
        results
    }

    fn execute_parallel(&self, tools: &[Tool]) -> Vec<ToolExecutionResult> {
        let run = || -> Vec<ToolExecutionResult> {
            tools.par_iter().map(|tool| self.execute_one(tool)).collect()
        };

        let Some(jobs) = self.jobs else {
            return run();
        };
        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                tracing::warn!("could not build a {jobs}-thread pool ({e}), running sequentially");
                tools.iter().map(|tool| self.execute_one(tool)).collect()
            }
        }
    }

    fn execute_one(&self, tool: &Tool) -> ToolExecutionResult {
        let start = Instant::now();
        if self.env.cancel.is_cancelled() {
            return ToolExecutionResult::cancelled(tool, Duration::ZERO);
        }

        let Some(adapter) = self.registry.adapter_for(tool) else {
            return ToolExecutionResult::fault(
                tool,
                format!("no adapter registered for tool `{}`", tool.name),
                start.elapsed(),
            );
        };

        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            adapter.execute(tool, &self.env)
        })) {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::debug!("{} failed before producing output: {e}", tool.name);
                ToolExecutionResult::fault(tool, e.to_string(), start.elapsed())
            }
            Err(payload) => {
                let detail = payload
                    .downcast_ref::<String>()
                    .map(String::as_str)
                    .or_else(|| payload.downcast_ref::<&str>().copied())
                    .unwrap_or("unknown panic");
                ToolExecutionResult::fault(
                    tool,
                    format!("internal error: adapter panicked: {detail}"),
                    start.elapsed(),
                )
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
