// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Validation plan selection.
//!
//! Exactly one plan is built per invocation. The explicit dimension override
//! is applied here, at the composition site, through `DimensionStrategy`
//! whatever the mode, so no other strategy can drop it.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::Config;
use crate::context::ExecutionContext;
use crate::dimension::{Dimension, Scope, ScopeSelector};
use crate::error::{Error, Result};
use crate::mapper::{MappingMode, ToolMapper};
use crate::strategy::{DimensionStrategy, Mode, ModeStrategy, SelectionOptions, strategy_for};
use crate::tool::Tool;

/// What the user asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanRequest {
    pub fast: bool,
    pub scope: ScopeSelector,
    /// Explicit `--dimension` values.
    pub dimensions: Vec<Dimension>,
    /// Task identifier or DoD label.
    pub task: Option<String>,
}

impl PlanRequest {
    /// Resolve the run mode: task, then fast, then dimension, then scope.
    pub fn mode(&self) -> Mode {
        if self.task.is_some() {
            Mode::Dod
        } else if self.fast {
            Mode::Fast
        } else if !self.dimensions.is_empty() {
            Mode::Dimension
        } else if self.scope != ScopeSelector::Named(Scope::All) {
            Mode::Scope
        } else {
            Mode::Full
        }
    }
}

/// The resolved set of tools for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationPlan {
    pub mode: Mode,
    pub dimensions: Vec<Dimension>,
    pub scope: ScopeSelector,
    pub mapping: MappingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// File filter shared by every tool.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
    pub tools: Vec<Tool>,
}

impl ValidationPlan {
    /// Every tool must be compatible with the plan scope.
    pub fn verify_scope(&self) -> Result<()> {
        let plan_scope = self.scope.table_scope();
        for tool in &self.tools {
            if !tool.scope.is_compatible_with(plan_scope) {
                return Err(Error::config(format!(
                    "tool `{}` is registered for scope `{}` and cannot run in scope `{}`",
                    tool.name, tool.scope, self.scope
                )));
            }
        }
        Ok(())
    }

    pub fn tools_for(&self, dimension: Dimension) -> impl Iterator<Item = &Tool> {
        self.tools.iter().filter(move |t| t.dimension == dimension)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Builds the plan from a request, a context, and the config.
pub struct PlanSelector<'a> {
    config: &'a Config,
    mapper: ToolMapper<'a>,
}

impl<'a> PlanSelector<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            mapper: ToolMapper::new(config),
        }
    }

    pub fn select(
        &self,
        context: &ExecutionContext,
        request: &PlanRequest,
    ) -> Result<ValidationPlan> {
        let mode = request.mode();
        let strategy = strategy_for(mode, self.config);
        let available = self.mapper.available(&request.scope);

        let options = SelectionOptions {
            scope: &request.scope,
            requested: &request.dimensions,
            task: request.task.as_deref(),
            available: &available,
        };
        let dimensions = if request.dimensions.is_empty() {
            strategy.select_dimensions(context, &options)
        } else {
            // The override replaces whatever the mode would pick.
            self.check_explicit(&request.dimensions, &request.scope)?;
            DimensionStrategy.select_dimensions(context, &options)
        };

        let mapping = strategy.mapping_mode();
        let tools = self
            .mapper
            .map_dimensions_to_tools(&dimensions, &request.scope, mapping);

        let plan = strategy.apply_optimizations(ValidationPlan {
            mode,
            dimensions,
            scope: request.scope.clone(),
            mapping,
            task: request.task.clone(),
            files: strategy.select_files(context),
            tools,
        });
        plan.verify_scope()?;

        tracing::debug!(
            "plan: mode={} scope={} dimensions={:?} tools={}",
            plan.mode,
            plan.scope,
            plan.dimensions,
            plan.tools.len()
        );
        Ok(plan)
    }

    /// The explicit override always wins, but must fit the scope.
    fn check_explicit(&self, requested: &[Dimension], scope: &ScopeSelector) -> Result<()> {
        let compat = self.mapper.validate(requested, scope);
        if compat.compatible {
            return Ok(());
        }
        let list = |dims: &[Dimension]| {
            dims.iter()
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        Err(Error::config(format!(
            "dimension(s) {} not available for scope `{}` (available: {})",
            list(&compat.incompatible),
            scope,
            list(&compat.available)
        )))
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
