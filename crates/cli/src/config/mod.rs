// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration parsing and validation.
//!
//! Handles qgate.toml parsing with version validation and unknown key warnings.
//! Parsed values are layered over the built-in defaults.

pub mod defaults;
pub mod duration;
mod parse;
mod suggest;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::adapter::{OutputParser, ViolationFormat};
use crate::dimension::{Dimension, Scope, Severity};
use crate::error::{Error, Result};
use crate::tool::ToolClass;
use parse::{parse_dimensions, parse_dod, parse_fast, parse_run, parse_tools, warn_unknown_key};

/// Currently supported config version.
pub const SUPPORTED_VERSION: i64 = 1;

/// Config with flexible parsing that captures unknown keys.
#[derive(Deserialize)]
struct FlexibleConfig {
    version: Option<i64>,

    #[serde(default)]
    run: Option<toml::Value>,

    #[serde(default)]
    fast: Option<toml::Value>,

    #[serde(default)]
    dimensions: Option<toml::Value>,

    #[serde(default)]
    tools: Option<toml::Value>,

    #[serde(default)]
    dod: Option<toml::Value>,

    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub version: i64,
    pub run: RunConfig,
    pub fast: FastConfig,
    pub dimensions: MappingTable,
    pub tools: BTreeMap<String, ToolDef>,
    /// Definition-of-Done profiles keyed by task label.
    pub dod: BTreeMap<String, DodProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION,
            run: RunConfig::default(),
            fast: FastConfig::default(),
            dimensions: defaults::dimensions(),
            tools: defaults::tools(),
            dod: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Check cross-references between the dimension table and tool definitions.
    pub fn validate(&self) -> Result<()> {
        if self.run.jobs == Some(0) {
            return Err(Error::config("run.jobs must be at least 1"));
        }

        for dim in self.dimensions.dimensions() {
            let Some(entry) = self.dimensions.get(dim) else {
                continue;
            };
            for (scope, names) in &entry.tools {
                for name in names {
                    if !self.tools.contains_key(name) {
                        return Err(Error::config(format!(
                            "dimensions.{dim}.{scope} references undefined tool `{name}`"
                        )));
                    }
                }
            }
            if let Some(name) = &entry.aggregate
                && !self.tools.contains_key(name)
            {
                return Err(Error::config(format!(
                    "dimensions.{dim}.aggregate references undefined tool `{name}`"
                )));
            }
        }

        for (name, def) in &self.tools {
            if def.command.trim().is_empty() {
                return Err(Error::config(format!("tools.{name}: empty command")));
            }
            def.parser()
                .map_err(|e| Error::config(format!("tools.{name}.pattern: {e}")))?;
        }
        Ok(())
    }

    /// Look up a tool definition by name.
    pub fn tool(&self, name: &str) -> Option<&ToolDef> {
        self.tools.get(name)
    }

    pub fn dod_profile(&self, label: &str) -> Option<&DodProfile> {
        self.dod.get(label)
    }
}

/// `[run]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Run tools concurrently.
    #[serde(default = "RunConfig::default_parallel")]
    pub parallel: bool,

    /// Worker thread count (defaults to available parallelism).
    #[serde(default)]
    pub jobs: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel: Self::default_parallel(),
            jobs: None,
        }
    }
}

impl RunConfig {
    fn default_parallel() -> bool {
        true
    }
}

/// `[fast]` section: what `--fast` trades away for speed.
#[derive(Debug, Clone, PartialEq)]
pub struct FastConfig {
    pub dimensions: Vec<Dimension>,
    pub disabled_checks: Vec<String>,
    pub timeouts: ClassTimeouts,
}

impl Default for FastConfig {
    fn default() -> Self {
        Self {
            dimensions: defaults::fast::DIMENSIONS.to_vec(),
            disabled_checks: defaults::fast::DISABLED_CHECKS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeouts: ClassTimeouts::default(),
        }
    }
}

/// Per-class timeout budgets used in fast mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassTimeouts {
    pub simple: Duration,
    pub standard: Duration,
    pub heavy: Duration,
}

impl Default for ClassTimeouts {
    fn default() -> Self {
        Self {
            simple: defaults::fast::SIMPLE_TIMEOUT,
            standard: defaults::fast::STANDARD_TIMEOUT,
            heavy: defaults::fast::HEAVY_TIMEOUT,
        }
    }
}

impl ClassTimeouts {
    pub fn for_class(&self, class: ToolClass) -> Duration {
        match class {
            ToolClass::Simple => self.simple,
            ToolClass::Standard => self.standard,
            ToolClass::Heavy => self.heavy,
        }
    }
}

/// The dimension → scope → tools table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: BTreeMap<Dimension, DimensionEntry>,
}

impl MappingTable {
    pub fn get(&self, dimension: Dimension) -> Option<&DimensionEntry> {
        self.entries.get(&dimension)
    }

    /// Insert or replace the entry for a dimension.
    pub fn insert(&mut self, dimension: Dimension, entry: DimensionEntry) {
        self.entries.insert(dimension, entry);
    }

    /// Dimensions with a table entry, in canonical order.
    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> + '_ {
        self.entries.keys().copied()
    }
}

/// One dimension's tools, keyed by scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionEntry {
    pub tools: BTreeMap<Scope, Vec<String>>,
    /// Adapter that covers the whole dimension in one invocation.
    pub aggregate: Option<String>,
}

impl DimensionEntry {
    /// Builder used for table literals.
    pub fn scope<I, S>(mut self, scope: Scope, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools
            .insert(scope, names.into_iter().map(Into::into).collect());
        self
    }

    /// Tools for `scope`, falling back to the `all` list.
    ///
    /// Returns the scope the list was found under.
    pub fn tools_for(&self, scope: Scope) -> Option<(Scope, &[String])> {
        self.tools
            .get(&scope)
            .map(|names| (scope, names.as_slice()))
            .or_else(|| {
                self.tools
                    .get(&Scope::All)
                    .map(|names| (Scope::All, names.as_slice()))
            })
            .filter(|(_, names)| !names.is_empty())
    }
}

/// `[tools.<name>]`: how to invoke and interpret one tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolDef {
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default, deserialize_with = "duration::deserialize_timeout")]
    pub timeout: Option<Duration>,

    #[serde(default)]
    pub class: ToolClass,

    #[serde(default)]
    pub output: ViolationFormat,

    /// Line regex with named groups `file`, `line`, `severity`, `message`, `rule`.
    #[serde(default)]
    pub pattern: Option<String>,

    /// Severity for violations that do not carry one.
    #[serde(default)]
    pub severity: Option<Severity>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default = "ToolDef::default_version_arg")]
    pub version_arg: String,

    #[serde(default)]
    pub min_version: Option<String>,

    /// Flag used to pass each fast-mode disabled check.
    #[serde(default)]
    pub disable_flag: Option<String>,
}

impl ToolDef {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout: None,
            class: ToolClass::default(),
            output: ViolationFormat::default(),
            pattern: None,
            severity: None,
            message: None,
            env: BTreeMap::new(),
            version_arg: Self::default_version_arg(),
            min_version: None,
            disable_flag: None,
        }
    }

    fn default_version_arg() -> String {
        defaults::VERSION_ARG.to_string()
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn class(mut self, class: ToolClass) -> Self {
        self.class = class;
        self
    }

    pub fn output(mut self, output: ViolationFormat) -> Self {
        self.output = output;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn min_version(mut self, version: impl Into<String>) -> Self {
        self.min_version = Some(version.into());
        self
    }

    pub fn disable_flag(mut self, flag: impl Into<String>) -> Self {
        self.disable_flag = Some(flag.into());
        self
    }

    /// Configured timeout, or the class default.
    pub fn effective_timeout(&self) -> Duration {
        self.timeout.unwrap_or_else(|| self.class.default_timeout())
    }

    /// Build the output parser for this tool.
    pub fn parser(&self) -> std::result::Result<OutputParser, regex::Error> {
        OutputParser::new(
            self.output,
            self.pattern.as_deref(),
            self.severity,
            self.message.clone(),
        )
    }
}

/// `[dod.<label>]`: dimensions required to call a task done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DodProfile {
    pub dimensions: Vec<Dimension>,
}

/// Load and validate config from a file path.
pub fn load(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse(&content, path)
}

/// Parse config, warning on unknown top-level keys.
pub fn parse(content: &str, path: &Path) -> Result<Config> {
    let at_path = |message: String| Error::Config {
        message,
        path: Some(path.to_path_buf()),
    };

    let flexible: FlexibleConfig =
        toml::from_str(content).map_err(|e| at_path(e.to_string()))?;

    let version = flexible
        .version
        .ok_or_else(|| at_path("missing required field: version".to_string()))?;
    if version != SUPPORTED_VERSION {
        return Err(at_path(format!(
            "unsupported config version {} (supported: {})",
            version, SUPPORTED_VERSION
        )));
    }

    for key in flexible.unknown.keys() {
        warn_unknown_key(path, key);
    }

    let mut config = Config::default();
    if let Some(value) = flexible.run {
        config.run = parse_run(value).map_err(at_path)?;
    }
    if let Some(value) = flexible.fast {
        parse_fast(value, &mut config.fast).map_err(at_path)?;
    }
    if let Some(value) = flexible.dimensions {
        for (dimension, entry) in parse_dimensions(value).map_err(at_path)? {
            config.dimensions.insert(dimension, entry);
        }
    }
    if let Some(value) = flexible.tools {
        config.tools.extend(parse_tools(value).map_err(at_path)?);
    }
    if let Some(value) = flexible.dod {
        config.dod.extend(parse_dod(value).map_err(at_path)?);
    }

    config.validate().map_err(|e| match e {
        Error::Config { message, .. } => at_path(message),
        other => other,
    })?;
    Ok(config)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
