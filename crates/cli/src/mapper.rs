// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Dimension → tool mapping.
//!
//! Two modes:
//! - per-tool: one `Tool` per configured tool name
//! - dimension-aggregate: one `Tool` per dimension that covers the whole
//!   dimension, either a configured `aggregate` adapter or a synthetic tool
//!   that runs the member tools internally

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::{Config, ToolDef};
use crate::dimension::{Dimension, Scope, ScopeSelector};
use crate::tool::{Tool, ToolClass, ToolConfig};

/// How dimensions expand into tools.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MappingMode {
    #[default]
    PerTool,
    DimensionAggregate,
}

/// Name of the synthetic aggregate tool for a dimension.
pub fn aggregate_tool_name(dimension: Dimension) -> String {
    format!("{dimension}-aggregate")
}

/// Outcome of checking dimensions against a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compatibility {
    pub compatible: bool,
    /// Requested dimensions with no tools for the scope.
    pub incompatible: Vec<Dimension>,
    /// Every dimension that has tools for the scope.
    pub available: Vec<Dimension>,
}

/// Resolves dimensions to concrete tools using the config's mapping table.
pub struct ToolMapper<'a> {
    config: &'a Config,
}

impl<'a> ToolMapper<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Dimensions that have at least one tool for `scope`, in canonical order.
    pub fn available(&self, scope: &ScopeSelector) -> Vec<Dimension> {
        let table_scope = scope.table_scope();
        self.config
            .dimensions
            .dimensions()
            .filter(|dim| {
                self.config.dimensions.get(*dim).is_some_and(|entry| {
                    entry.aggregate.is_some() || entry.tools_for(table_scope).is_some()
                })
            })
            .collect()
    }

    /// Check that every requested dimension can run in `scope`.
    pub fn validate(&self, dimensions: &[Dimension], scope: &ScopeSelector) -> Compatibility {
        let available = self.available(scope);
        let incompatible: Vec<Dimension> = dimensions
            .iter()
            .copied()
            .filter(|dim| !available.contains(dim))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Compatibility {
            compatible: incompatible.is_empty(),
            incompatible,
            available,
        }
    }

    /// Expand dimensions into tools.
    ///
    /// Dimensions without a table entry or without tools for the scope are
    /// logged and skipped.
    pub fn map_dimensions_to_tools(
        &self,
        dimensions: &[Dimension],
        scope: &ScopeSelector,
        mode: MappingMode,
    ) -> Vec<Tool> {
        let table_scope = scope.table_scope();
        let mut tools = Vec::new();

        for &dimension in dimensions {
            let Some(entry) = self.config.dimensions.get(dimension) else {
                tracing::warn!("dimension `{dimension}` has no mapping table entry, skipping");
                continue;
            };

            if mode == MappingMode::DimensionAggregate
                && let Some(name) = &entry.aggregate
            {
                if let Some(def) = self.config.tool(name) {
                    let mut tool = self.build_tool(name, def, dimension, Scope::All, scope);
                    tool.config.dimension_mode = true;
                    tools.push(tool);
                    continue;
                }
                tracing::warn!("aggregate tool `{name}` for `{dimension}` is undefined");
            }

            let Some((found_scope, names)) = entry.tools_for(table_scope) else {
                tracing::warn!("dimension `{dimension}` has no tools for scope `{table_scope}`, skipping");
                continue;
            };

            let mut seen = BTreeSet::new();
            let members: Vec<(&str, &ToolDef)> = names
                .iter()
                .filter(|name| seen.insert(name.as_str()))
                .filter_map(|name| match self.config.tool(name) {
                    Some(def) => Some((name.as_str(), def)),
                    None => {
                        tracing::warn!("tool `{name}` is undefined, skipping");
                        None
                    }
                })
                .collect();

            match mode {
                MappingMode::PerTool => {
                    for (name, def) in members {
                        tools.push(self.build_tool(name, def, dimension, found_scope, scope));
                    }
                }
                MappingMode::DimensionAggregate => {
                    if let Some(tool) = synthetic_aggregate(dimension, found_scope, scope, &members)
                    {
                        tools.push(tool);
                    }
                }
            }
        }

        tracing::debug!(
            "mapped {} dimension(s) to {} tool(s) ({:?})",
            dimensions.len(),
            tools.len(),
            mode
        );
        tools
    }

    fn build_tool(
        &self,
        name: &str,
        def: &ToolDef,
        dimension: Dimension,
        tool_scope: Scope,
        selector: &ScopeSelector,
    ) -> Tool {
        Tool {
            name: name.to_string(),
            dimension,
            scope: tool_scope,
            config: ToolConfig {
                command: def.command.clone(),
                args: def.args.clone(),
                timeout: def.effective_timeout(),
                env: def.env.clone(),
                dimension_mode: false,
                class: def.class,
                files: Vec::new(),
                path_filter: selector.path_filter().map(String::from),
                disabled_checks: Vec::new(),
                members: Vec::new(),
            },
        }
    }
}

/// One tool standing in for every member of a dimension.
///
/// Takes the heaviest member class and the longest member timeout.
fn synthetic_aggregate(
    dimension: Dimension,
    tool_scope: Scope,
    selector: &ScopeSelector,
    members: &[(&str, &ToolDef)],
) -> Option<Tool> {
    if members.is_empty() {
        return None;
    }
    let class = members
        .iter()
        .map(|(_, def)| def.class)
        .max()
        .unwrap_or(ToolClass::Standard);
    let timeout = members
        .iter()
        .map(|(_, def)| def.effective_timeout())
        .max()
        .unwrap_or_else(|| class.default_timeout());

    Some(Tool {
        name: aggregate_tool_name(dimension),
        dimension,
        scope: tool_scope,
        config: ToolConfig {
            command: String::new(),
            args: Vec::new(),
            timeout,
            env: Default::default(),
            dimension_mode: true,
            class,
            files: Vec::new(),
            path_filter: selector.path_filter().map(String::from),
            disabled_checks: Vec::new(),
            members: members.iter().map(|(name, _)| name.to_string()).collect(),
        },
    })
}

#[cfg(test)]
#[path = "mapper_tests.rs"]
mod tests;
