// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Mode strategies.
//!
//! Each mode decides which dimensions run, how they map to tools, which
//! files are targeted, and what optimizations apply to the built plan.
//! The strategy is selected once per run from the closed `Mode` set.

mod explicit;
mod fast;
mod full;
mod scope;

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

pub use explicit::DimensionStrategy;
pub use fast::FastStrategy;
pub use full::{FullStrategy, TaskStrategy};
pub use scope::ScopeStrategy;

use crate::config::Config;
use crate::context::ExecutionContext;
use crate::dimension::{Dimension, ScopeSelector};
use crate::mapper::MappingMode;
use crate::plan::ValidationPlan;

/// Execution strategy for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Fast,
    Full,
    Scope,
    Dimension,
    Dod,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Fast => "fast",
            Mode::Full => "full",
            Mode::Scope => "scope",
            Mode::Dimension => "dimension",
            Mode::Dod => "dod",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs a strategy may consult when choosing dimensions.
#[derive(Debug, Clone, Copy)]
pub struct SelectionOptions<'a> {
    pub scope: &'a ScopeSelector,
    /// Dimensions requested with `--dimension`.
    pub requested: &'a [Dimension],
    /// Task identifier or DoD label.
    pub task: Option<&'a str>,
    /// Dimensions that have tools for the scope.
    pub available: &'a [Dimension],
}

/// One implementation per `Mode`.
pub trait ModeStrategy {
    fn mode(&self) -> Mode;

    /// Dimensions this mode runs when no explicit override is given.
    fn select_dimensions(
        &self,
        context: &ExecutionContext,
        options: &SelectionOptions<'_>,
    ) -> Vec<Dimension>;

    fn mapping_mode(&self) -> MappingMode {
        MappingMode::PerTool
    }

    /// Files to restrict tools to. Empty means no file filter.
    fn select_files(&self, _context: &ExecutionContext) -> Vec<PathBuf> {
        Vec::new()
    }

    fn apply_optimizations(&self, plan: ValidationPlan) -> ValidationPlan {
        plan
    }
}

/// Strategy for a mode.
pub fn strategy_for(mode: Mode, config: &Config) -> Box<dyn ModeStrategy + '_> {
    match mode {
        Mode::Fast => Box::new(FastStrategy::new(&config.fast)),
        Mode::Full => Box::new(FullStrategy),
        Mode::Scope => Box::new(ScopeStrategy),
        Mode::Dimension => Box::new(DimensionStrategy),
        Mode::Dod => Box::new(TaskStrategy::new(&config.dod)),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
