// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Quality dimensions, scopes, and violation severities.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// A quality category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Format,
    Lint,
    Test,
    Security,
    Build,
}

impl Dimension {
    /// All dimensions in canonical execution order.
    pub const ALL: [Dimension; 5] = [
        Dimension::Format,
        Dimension::Lint,
        Dimension::Test,
        Dimension::Security,
        Dimension::Build,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Format => "format",
            Dimension::Lint => "lint",
            Dimension::Test => "test",
            Dimension::Security => "security",
            Dimension::Build => "build",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::config(format!(
                    "unknown dimension `{s}` (expected one of: format, lint, test, security, build)"
                ))
            })
    }
}

/// A predefined logical subset of the repository.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Frontend,
    Backend,
    Infrastructure,
    Testing,
    Docs,
    All,
}

impl Scope {
    pub const ALL: [Scope; 6] = [
        Scope::Frontend,
        Scope::Backend,
        Scope::Infrastructure,
        Scope::Testing,
        Scope::Docs,
        Scope::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Frontend => "frontend",
            Scope::Backend => "backend",
            Scope::Infrastructure => "infrastructure",
            Scope::Testing => "testing",
            Scope::Docs => "docs",
            Scope::All => "all",
        }
    }

    /// Whether a tool registered under `self` may run in a plan for `plan_scope`.
    pub fn is_compatible_with(self, plan_scope: Scope) -> bool {
        self == Scope::All || self == plan_scope
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Scope::ALL
            .into_iter()
            .find(|scope| scope.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::config(format!("unknown scope `{s}`")))
    }
}

/// The scope a run is restricted to: a predefined token or a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeSelector {
    Named(Scope),
    /// Passed verbatim to every tool as a path filter.
    Path(String),
}

impl Default for ScopeSelector {
    fn default() -> Self {
        ScopeSelector::Named(Scope::All)
    }
}

impl ScopeSelector {
    /// Parse a `--scope` value.
    ///
    /// Named tokens win. Anything else must look like a path (separator,
    /// extension, leading dot) or name an existing directory under `root`.
    pub fn parse(raw: &str, root: &Path) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::config("empty scope"));
        }
        if let Ok(scope) = trimmed.parse::<Scope>() {
            return Ok(ScopeSelector::Named(scope));
        }
        if is_path_like(trimmed) || root.join(trimmed).is_dir() {
            return Ok(ScopeSelector::Path(trimmed.to_string()));
        }
        Err(Error::config(format!(
            "unknown scope `{trimmed}` (expected frontend, backend, infrastructure, testing, docs, all, or a path)"
        )))
    }

    /// The scope used to look up tools in the mapping table.
    ///
    /// Path scopes resolve against the `all` table.
    pub fn table_scope(&self) -> Scope {
        match self {
            ScopeSelector::Named(scope) => *scope,
            ScopeSelector::Path(_) => Scope::All,
        }
    }

    pub fn path_filter(&self) -> Option<&str> {
        match self {
            ScopeSelector::Named(_) => None,
            ScopeSelector::Path(path) => Some(path),
        }
    }

    pub fn is_path(&self) -> bool {
        matches!(self, ScopeSelector::Path(_))
    }

    /// Whether a root-relative file lies inside this scope. Named scopes
    /// contain every file; a path scope contains itself and its descendants.
    pub fn contains(&self, file: &Path) -> bool {
        let ScopeSelector::Path(path) = self else {
            return true;
        };
        let prefix: PathBuf = Path::new(path)
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        prefix.as_os_str().is_empty() || file.starts_with(&prefix)
    }
}

/// Heuristic for path-like scope values.
pub fn is_path_like(raw: &str) -> bool {
    raw.contains('/')
        || raw.contains('\\')
        || raw.starts_with('.')
        || Path::new(raw).extension().is_some()
}

impl fmt::Display for ScopeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeSelector::Named(scope) => scope.fmt(f),
            ScopeSelector::Path(path) => f.write_str(path),
        }
    }
}

impl Serialize for ScopeSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Severity of a single violation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Map the many spellings tools use onto the three severities.
    ///
    /// Returns None for words that are not severities.
    pub fn from_tool_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "error" | "err" | "e" | "fatal" | "critical" | "high" | "failure" => {
                Some(Severity::Error)
            }
            "warning" | "warn" | "w" | "medium" | "moderate" => Some(Severity::Warning),
            "info" | "information" | "note" | "hint" | "low" | "style" | "convention" => {
                Some(Severity::Info)
            }
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "dimension_tests.rs"]
mod tests;
