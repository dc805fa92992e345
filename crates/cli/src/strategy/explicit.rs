// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{Mode, ModeStrategy, SelectionOptions};
use crate::context::ExecutionContext;
use crate::dimension::Dimension;

/// `--dimension`: exactly the requested dimensions, no inference.
pub struct DimensionStrategy;

impl ModeStrategy for DimensionStrategy {
    fn mode(&self) -> Mode {
        Mode::Dimension
    }

    fn select_dimensions(
        &self,
        _context: &ExecutionContext,
        options: &SelectionOptions<'_>,
    ) -> Vec<Dimension> {
        let mut dims = options.requested.to_vec();
        dims.sort();
        dims.dedup();
        dims
    }
}
