// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synthetic adapter covering a whole dimension.
//!
//! Runs each member tool in order within the aggregate's single timeout
//! budget and folds the member results into one.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{Adapter, AdapterError, Capabilities, CommandAdapter, ExecutionEnv};
use crate::dimension::Dimension;
use crate::mapper::aggregate_tool_name;
use crate::tool::{
    EXIT_TERMINATED, RULE_EXECUTION_FAULT, RULE_TIMEOUT, Tool, ToolConfig, ToolExecutionResult,
    Violation,
};

pub struct DimensionAggregateAdapter {
    name: String,
    dimension: Dimension,
    members: BTreeMap<String, Arc<CommandAdapter>>,
}

impl DimensionAggregateAdapter {
    pub fn new(dimension: Dimension, members: BTreeMap<String, Arc<CommandAdapter>>) -> Self {
        Self {
            name: aggregate_tool_name(dimension),
            dimension,
            members,
        }
    }
}

/// A member invocation inheriting the aggregate's targets.
fn member_tool(member: &CommandAdapter, parent: &Tool, timeout: Duration) -> Tool {
    let def = member.def();
    let mut env = def.env.clone();
    env.extend(parent.config.env.clone());
    Tool {
        name: member.name().to_string(),
        dimension: parent.dimension,
        scope: parent.scope,
        config: ToolConfig {
            command: def.command.clone(),
            args: def.args.clone(),
            timeout,
            env,
            dimension_mode: false,
            class: def.class,
            files: parent.config.files.clone(),
            path_filter: parent.config.path_filter.clone(),
            disabled_checks: parent.config.disabled_checks.clone(),
            members: Vec::new(),
        },
    }
}

fn append_section(buf: &mut String, name: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    buf.push_str(&format!("[{name}]\n{text}"));
    if !text.ends_with('\n') {
        buf.push('\n');
    }
}

impl Adapter for DimensionAggregateAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supported_dimensions: vec![self.dimension],
            fast_mode_supported: true,
        }
    }

    fn execute(
        &self,
        tool: &Tool,
        env: &ExecutionEnv<'_>,
    ) -> Result<ToolExecutionResult, AdapterError> {
        let start = Instant::now();
        let mut result = ToolExecutionResult {
            tool: tool.name.clone(),
            dimension: tool.dimension,
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
            execution_time_ms: 0,
            violations: Vec::new(),
        };

        for name in &tool.config.members {
            let member = self.members.get(name).ok_or_else(|| {
                AdapterError::Invalid(format!(
                    "`{name}` is not a member of the `{}` aggregate",
                    self.dimension
                ))
            })?;

            if env.cancel.is_cancelled() {
                result.exit_code = EXIT_TERMINATED;
                result
                    .violations
                    .push(Violation::error("cancelled").with_rule(RULE_EXECUTION_FAULT));
                break;
            }
            let remaining = tool.config.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                result.exit_code = EXIT_TERMINATED;
                result.timed_out = true;
                result.violations.push(
                    Violation::error(format!(
                        "timed out after {:?} before `{name}` ran",
                        tool.config.timeout
                    ))
                    .with_rule(RULE_TIMEOUT),
                );
                break;
            }

            let invocation = member_tool(member, tool, remaining);
            let outcome = match member.execute(&invocation, env) {
                Ok(outcome) => outcome,
                Err(e) => {
                    ToolExecutionResult::fault(&invocation, format!("{name}: {e}"), Duration::ZERO)
                }
            };
            tracing::debug!(
                "{} member {name} exited {}",
                tool.name,
                outcome.exit_code
            );

            append_section(&mut result.stdout, name, &outcome.stdout);
            append_section(&mut result.stderr, name, &outcome.stderr);
            if result.exit_code == 0 {
                result.exit_code = outcome.exit_code;
            }
            result.violations.extend(outcome.violations);
            if outcome.timed_out {
                result.timed_out = true;
                break;
            }
        }

        result.execution_time_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
