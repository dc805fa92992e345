// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{Mode, ModeStrategy, SelectionOptions};
use crate::context::ExecutionContext;
use crate::dimension::Dimension;

/// `--scope`: every dimension with tools for the scope.
///
/// Path scopes reach the tools through the mapper's path filter.
pub struct ScopeStrategy;

impl ModeStrategy for ScopeStrategy {
    fn mode(&self) -> Mode {
        Mode::Scope
    }

    fn select_dimensions(
        &self,
        _context: &ExecutionContext,
        options: &SelectionOptions<'_>,
    ) -> Vec<Dimension> {
        options.available.to_vec()
    }
}
