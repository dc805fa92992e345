// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tool adapters execute planned tools and report violations.
//!
//! Every adapter satisfies the same contract: `execute(tool)` returns a
//! `ToolExecutionResult` for anything the tool itself reports, and an
//! `AdapterError` only for environment-level failures (binary vanished,
//! spawn refused). The executor turns those errors into fault results.
//!
//! ```text
//! AdapterRegistry
//! ├── CommandAdapter            one per [tools.<name>] definition
//! └── DimensionAggregateAdapter one per dimension ("<dim>-aggregate")
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

pub mod aggregate;
pub mod command;
pub mod parse;

pub use aggregate::DimensionAggregateAdapter;
pub use command::{CommandAdapter, expand_args};
pub use parse::{OutputParser, ViolationFormat};

use crate::config::Config;
use crate::detect::ToolDetectionCache;
use crate::dimension::Dimension;
use crate::error::{Error, Result};
use crate::plan::ValidationPlan;
use crate::process::{CancelToken, ProcessRunner};
use crate::strategy::Mode;
use crate::tool::{Tool, ToolExecutionResult};

/// What an adapter can do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub supported_dimensions: Vec<Dimension>,
    /// Safe to run under `--fast` budgets.
    pub fast_mode_supported: bool,
}

impl Capabilities {
    pub fn supports(&self, dimension: Dimension) -> bool {
        self.supported_dimensions.contains(&dimension)
    }
}

/// Shared collaborators for one run.
#[derive(Clone, Copy)]
pub struct ExecutionEnv<'a> {
    /// Working directory for every tool.
    pub root: &'a Path,
    pub runner: &'a dyn ProcessRunner,
    /// Same cache the environment checker filled.
    pub cache: &'a ToolDetectionCache,
    pub cancel: &'a CancelToken,
}

/// Environment-level adapter failure.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("`{command}` is not available")]
    NotFound { command: String },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

/// An adapter executes one kind of planned tool.
pub trait Adapter: Send + Sync {
    /// Adapter identifier; matches the planned tool name.
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Run the tool to completion.
    ///
    /// Tool-reported violations are never errors.
    fn execute(
        &self,
        tool: &Tool,
        env: &ExecutionEnv<'_>,
    ) -> std::result::Result<ToolExecutionResult, AdapterError>;
}

/// Registry of available adapters, keyed by tool name.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under its name, replacing any previous one.
    pub fn register(&mut self, adapter: Arc<dyn Adapter>) {
        self.adapters.insert(adapter.name().to_string(), adapter);
    }

    /// One command adapter per tool definition, plus a dimension-aggregate
    /// adapter per dimension in the mapping table.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut supported: HashMap<&str, BTreeSet<Dimension>> = HashMap::new();
        for dimension in config.dimensions.dimensions() {
            let Some(entry) = config.dimensions.get(dimension) else {
                continue;
            };
            for name in entry.tools.values().flatten().chain(entry.aggregate.iter()) {
                supported.entry(name.as_str()).or_default().insert(dimension);
            }
        }

        let mut registry = Self::new();
        let mut commands: HashMap<&str, Arc<CommandAdapter>> = HashMap::new();
        for (name, def) in &config.tools {
            let dimensions = supported
                .get(name.as_str())
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            let adapter = CommandAdapter::new(name, def.clone(), dimensions)
                .map_err(|e| Error::config(format!("tools.{name}.pattern: {e}")))?;
            let adapter = Arc::new(adapter);
            commands.insert(name.as_str(), Arc::clone(&adapter));
            registry.register(adapter);
        }

        for dimension in config.dimensions.dimensions() {
            let Some(entry) = config.dimensions.get(dimension) else {
                continue;
            };
            let members = entry
                .tools
                .values()
                .flatten()
                .filter_map(|name| commands.get(name.as_str()).map(Arc::clone))
                .map(|adapter| (adapter.name().to_string(), adapter))
                .collect();
            registry.register(Arc::new(DimensionAggregateAdapter::new(dimension, members)));
        }

        tracing::debug!("registered {} adapter(s)", registry.adapters.len());
        Ok(registry)
    }

    pub fn adapter_for(&self, tool: &Tool) -> Option<&dyn Adapter> {
        self.adapters.get(&tool.name).map(|a| a.as_ref())
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Every plan tool needs an adapter that supports its dimension.
    ///
    /// Fast-mode support is advisory and only warns.
    pub fn validate_plan(&self, plan: &ValidationPlan) -> Result<()> {
        for tool in &plan.tools {
            let Some(adapter) = self.adapter_for(tool) else {
                return Err(Error::config(format!(
                    "no adapter registered for tool `{}`",
                    tool.name
                )));
            };
            let capabilities = adapter.capabilities();
            if !capabilities.supports(tool.dimension) {
                return Err(Error::config(format!(
                    "adapter `{}` does not support dimension `{}`",
                    adapter.name(),
                    tool.dimension
                )));
            }
            if plan.mode == Mode::Fast && !capabilities.fast_mode_supported {
                tracing::warn!(
                    "adapter `{}` is not fast-mode capable, running with the fast budget anyway",
                    adapter.name()
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
