// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;

use super::{Mode, ModeStrategy, SelectionOptions};
use crate::config::DodProfile;
use crate::context::ExecutionContext;
use crate::dimension::Dimension;

/// Default run: every available dimension, no file filter.
pub struct FullStrategy;

impl ModeStrategy for FullStrategy {
    fn mode(&self) -> Mode {
        Mode::Full
    }

    fn select_dimensions(
        &self,
        _context: &ExecutionContext,
        options: &SelectionOptions<'_>,
    ) -> Vec<Dimension> {
        options.available.to_vec()
    }
}

/// Task / Definition-of-Done run.
///
/// A `[dod.<label>]` profile matching the task narrows the dimensions;
/// otherwise every available dimension runs.
pub struct TaskStrategy<'a> {
    profiles: &'a BTreeMap<String, DodProfile>,
}

impl<'a> TaskStrategy<'a> {
    pub fn new(profiles: &'a BTreeMap<String, DodProfile>) -> Self {
        Self { profiles }
    }
}

impl ModeStrategy for TaskStrategy<'_> {
    fn mode(&self) -> Mode {
        Mode::Dod
    }

    fn select_dimensions(
        &self,
        _context: &ExecutionContext,
        options: &SelectionOptions<'_>,
    ) -> Vec<Dimension> {
        let Some(profile) = options.task.and_then(|label| self.profiles.get(label)) else {
            return options.available.to_vec();
        };
        profile
            .dimensions
            .iter()
            .copied()
            .filter(|dim| {
                let ok = options.available.contains(dim);
                if !ok {
                    tracing::warn!("DoD dimension `{dim}` has no tools for this scope, skipping");
                }
                ok
            })
            .collect()
    }
}
