// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-commit fast mode.
//!
//! Runs the configured fast dimensions through one aggregate tool per
//! dimension, restricted to the changed files. Timeouts come from per-class
//! budgets so heavy adapters are not starved while simple ones stay short.

use std::path::PathBuf;

use super::{Mode, ModeStrategy, SelectionOptions};
use crate::config::FastConfig;
use crate::context::ExecutionContext;
use crate::dimension::Dimension;
use crate::mapper::MappingMode;
use crate::plan::ValidationPlan;

pub struct FastStrategy<'a> {
    config: &'a FastConfig,
}

impl<'a> FastStrategy<'a> {
    pub fn new(config: &'a FastConfig) -> Self {
        Self { config }
    }
}

impl ModeStrategy for FastStrategy<'_> {
    fn mode(&self) -> Mode {
        Mode::Fast
    }

    fn select_dimensions(
        &self,
        _context: &ExecutionContext,
        options: &SelectionOptions<'_>,
    ) -> Vec<Dimension> {
        self.config
            .dimensions
            .iter()
            .copied()
            .filter(|dim| options.available.contains(dim))
            .collect()
    }

    fn mapping_mode(&self) -> MappingMode {
        MappingMode::DimensionAggregate
    }

    /// Staged files, else unstaged, else all modified. Deleted files never
    /// count toward a set.
    fn select_files(&self, context: &ExecutionContext) -> Vec<PathBuf> {
        let files = &context.files;
        let live = |set: &[PathBuf]| -> Vec<PathBuf> {
            set.iter()
                .filter(|f| !files.is_deleted(f))
                .cloned()
                .collect()
        };

        for (label, set) in [
            ("staged", &files.staged),
            ("unstaged", &files.unstaged),
            ("modified", &files.modified_all),
        ] {
            let selected = live(set.as_slice());
            if !selected.is_empty() {
                tracing::debug!("fast mode: {} {label} file(s)", selected.len());
                return selected;
            }
        }
        tracing::debug!("fast mode: no changed files");
        Vec::new()
    }

    /// A path scope narrows the changed files to those under it. When none
    /// remain, tools fall back to the path filter itself.
    fn apply_optimizations(&self, mut plan: ValidationPlan) -> ValidationPlan {
        if plan.scope.is_path() {
            let scope = plan.scope.clone();
            plan.files.retain(|file| scope.contains(file));
            tracing::debug!("fast mode: {} changed file(s) under {scope}", plan.files.len());
        }
        for tool in &mut plan.tools {
            tool.config.files = plan.files.clone();
            tool.config.disabled_checks = self.config.disabled_checks.clone();
            tool.config.timeout = self.config.timeouts.for_class(tool.config.class);
        }
        plan
    }
}

#[cfg(test)]
#[path = "fast_tests.rs"]
mod tests;
