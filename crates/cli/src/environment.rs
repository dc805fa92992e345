// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-execution environment gate.
//!
//! Every distinct binary the plan needs is resolved once through the shared
//! detection cache. Any missing or outdated binary fails the whole run
//! before a single tool executes.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Config;
use crate::config::defaults::VERSION_ARG;
use crate::detect::{Detection, ToolDetectionCache, compare_versions};
use crate::error::{Error, Result};
use crate::plan::ValidationPlan;

/// Outcome of an environment check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Resolved binaries keyed by command.
    pub detections: BTreeMap<String, Detection>,
    /// Commands that could not be found.
    pub missing: Vec<String>,
    /// Commands found below their minimum version.
    pub outdated: Vec<String>,
}

impl EnvironmentReport {
    /// Convert a failed report into `Error::Environment`.
    pub fn into_result(self) -> Result<Self> {
        if self.success {
            return Ok(self);
        }
        let message = self
            .error
            .clone()
            .unwrap_or_else(|| "environment check failed".to_string());
        Err(Error::Environment(message))
    }
}

/// One binary needed by the plan.
#[derive(Debug, Default)]
struct Requirement {
    version_arg: Option<String>,
    min_version: Option<String>,
    /// Plan tools that need it.
    needed_by: Vec<String>,
}

pub struct EnvironmentChecker<'a> {
    config: &'a Config,
    cache: &'a ToolDetectionCache,
}

impl<'a> EnvironmentChecker<'a> {
    pub fn new(config: &'a Config, cache: &'a ToolDetectionCache) -> Self {
        Self { config, cache }
    }

    pub fn check(&self, plan: &ValidationPlan) -> EnvironmentReport {
        let requirements = self.requirements(plan);
        let mut report = EnvironmentReport::default();
        let mut problems = Vec::new();

        for (command, req) in &requirements {
            let needed_by = req.needed_by.join(", ");
            let version_arg = req.version_arg.as_deref().unwrap_or(VERSION_ARG);
            let Some(detection) = self.cache.resolve(command, version_arg) else {
                problems.push(format!(
                    "required tool `{command}` not found (needed by {needed_by})"
                ));
                report.missing.push(command.clone());
                continue;
            };

            if let Some(min) = &req.min_version {
                match &detection.version {
                    Some(found) if compare_versions(found, min) == Ordering::Less => {
                        problems.push(format!(
                            "`{command}` {found} is older than required {min} (needed by {needed_by})"
                        ));
                        report.outdated.push(command.clone());
                    }
                    Some(_) => {}
                    None => tracing::warn!(
                        "could not determine `{command}` version, skipping minimum {min} check"
                    ),
                }
            }
            report.detections.insert(command.clone(), detection);
        }

        report.success = problems.is_empty();
        if !report.success {
            report.error = Some(problems.join("; "));
        }
        tracing::debug!(
            "environment check: {} binary(ies), {} missing, {} outdated",
            requirements.len(),
            report.missing.len(),
            report.outdated.len()
        );
        report
    }

    /// Distinct binaries the plan needs, with the strictest version bound.
    fn requirements(&self, plan: &ValidationPlan) -> BTreeMap<String, Requirement> {
        let mut requirements: BTreeMap<String, Requirement> = BTreeMap::new();
        let mut add = |command: &str, tool: &str| {
            let def = self.config.tool(tool);
            let req = requirements.entry(command.to_string()).or_default();
            req.version_arg.get_or_insert_with(|| {
                def.map(|d| d.version_arg.clone())
                    .unwrap_or_else(|| VERSION_ARG.to_string())
            });
            if let Some(min) = def.and_then(|d| d.min_version.as_ref()) {
                let stricter = req
                    .min_version
                    .as_deref()
                    .is_none_or(|current| compare_versions(min, current) == Ordering::Greater);
                if stricter {
                    req.min_version = Some(min.clone());
                }
            }
            if !req.needed_by.iter().any(|n| n == tool) {
                req.needed_by.push(tool.to_string());
            }
        };

        for tool in &plan.tools {
            if tool.is_synthetic_aggregate() {
                for member in &tool.config.members {
                    if let Some(def) = self.config.tool(member) {
                        add(&def.command, member);
                    }
                }
            } else if !tool.config.command.is_empty() {
                add(&tool.config.command, &tool.name);
            }
        }
        requirements
    }
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;
