// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter for a single configured command-line tool.

use super::{Adapter, AdapterError, Capabilities, ExecutionEnv, OutputParser};
use crate::config::ToolDef;
use crate::config::defaults::FILES_PLACEHOLDER;
use crate::dimension::Dimension;
use crate::process::CommandSpec;
use crate::tool::{Tool, ToolClass, ToolExecutionResult};

/// Environment variable listing fast-mode disabled checks.
pub const DISABLED_CHECKS_ENV: &str = "QGATE_DISABLED_CHECKS";

/// Runs one `[tools.<name>]` definition and parses its output.
#[derive(Debug, Clone)]
pub struct CommandAdapter {
    name: String,
    def: ToolDef,
    parser: OutputParser,
    dimensions: Vec<Dimension>,
}

impl CommandAdapter {
    pub fn new(
        name: impl Into<String>,
        def: ToolDef,
        dimensions: Vec<Dimension>,
    ) -> Result<Self, regex::Error> {
        let parser = def.parser()?;
        Ok(Self {
            name: name.into(),
            def,
            parser,
            dimensions,
        })
    }

    pub fn def(&self) -> &ToolDef {
        &self.def
    }
}

impl Adapter for CommandAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supported_dimensions: self.dimensions.clone(),
            fast_mode_supported: self.def.class != ToolClass::Heavy,
        }
    }

    fn execute(
        &self,
        tool: &Tool,
        env: &ExecutionEnv<'_>,
    ) -> Result<ToolExecutionResult, AdapterError> {
        let command = &tool.config.command;
        let detection = env
            .cache
            .resolve(command, &self.def.version_arg)
            .ok_or_else(|| AdapterError::NotFound {
                command: command.clone(),
            })?;

        let args = expand_args(
            &tool.config.args,
            &tool.targets(),
            &tool.config.disabled_checks,
            self.def.disable_flag.as_deref(),
        );
        let mut spec = CommandSpec::new(&detection.path, env.root, tool.config.timeout).args(args);
        spec.env = tool.config.env.clone();
        if !tool.config.disabled_checks.is_empty() {
            spec.env.insert(
                DISABLED_CHECKS_ENV.to_string(),
                tool.config.disabled_checks.join(","),
            );
        }

        tracing::debug!(
            "running {}: {} {}",
            tool.name,
            spec.program.display(),
            spec.args.join(" ")
        );
        let out = env
            .runner
            .run(&spec, env.cancel)
            .map_err(|source| AdapterError::Spawn {
                command: command.clone(),
                source,
            })?;

        if out.timed_out {
            return Ok(ToolExecutionResult::timed_out(
                tool, out.stdout, out.stderr, out.elapsed,
            ));
        }
        if out.cancelled {
            let mut result = ToolExecutionResult::cancelled(tool, out.elapsed);
            result.stdout = out.stdout;
            return Ok(result);
        }

        let violations = self.parser.parse(out.exit_code, &out.stdout, &out.stderr);
        tracing::debug!(
            "{} exited {} with {} violation(s) in {:?}",
            tool.name,
            out.exit_code,
            violations.len(),
            out.elapsed
        );
        Ok(ToolExecutionResult {
            tool: tool.name.clone(),
            dimension: tool.dimension,
            exit_code: out.exit_code,
            stdout: out.stdout,
            stderr: out.stderr,
            timed_out: false,
            execution_time_ms: out.elapsed.as_millis() as u64,
            violations,
        })
    }
}

/// Substitute targets for `{files}` and add disable flags.
///
/// Disable flags precede the targets. Without a placeholder the targets are
/// appended; an empty target list expands `{files}` to `.`.
pub fn expand_args(
    args: &[String],
    targets: &[String],
    disabled_checks: &[String],
    disable_flag: Option<&str>,
) -> Vec<String> {
    let flags: Vec<String> = disable_flag
        .map(|flag| {
            disabled_checks
                .iter()
                .flat_map(|check| [flag.to_string(), check.clone()])
                .collect()
        })
        .unwrap_or_default();

    let mut out = Vec::with_capacity(args.len() + flags.len() + targets.len());
    let mut placed = false;
    for arg in args {
        if arg == FILES_PLACEHOLDER {
            if !placed {
                out.extend(flags.iter().cloned());
                placed = true;
            }
            if targets.is_empty() {
                out.push(".".to_string());
            } else {
                out.extend(targets.iter().cloned());
            }
        } else {
            out.push(arg.clone());
        }
    }
    if !placed {
        out.extend(flags);
        out.extend(targets.iter().cloned());
    }
    out
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
