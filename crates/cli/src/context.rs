// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Execution context detection.
//!
//! Reads branch and file state once per invocation. Outside a repository
//! (or when git state is unreadable) a degraded context is returned so the
//! engine stays runnable.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;

use crate::dimension::Scope;
use crate::git;

/// Branch name used when git state is unavailable.
pub const UNKNOWN_BRANCH: &str = "unknown";

/// Branch category derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchType {
    Main,
    Feature,
    Fix,
    Release,
    Hotfix,
    Unknown,
}

impl BranchType {
    /// Classify by name: `main`/`master`/`develop`/`trunk`, or a
    /// `feature/`, `fix/`, `release/`, `hotfix/` style prefix.
    pub fn classify(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        if matches!(lower.as_str(), "main" | "master" | "develop" | "trunk") {
            return BranchType::Main;
        }
        let Some((prefix, _)) = lower.split_once(['/', '-', '_']) else {
            return BranchType::Unknown;
        };
        match prefix {
            "feature" | "feat" => BranchType::Feature,
            "fix" | "bugfix" | "bug" => BranchType::Fix,
            "release" | "rel" => BranchType::Release,
            "hotfix" => BranchType::Hotfix,
            _ => BranchType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BranchType,
}

impl BranchInfo {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = BranchType::classify(&name);
        Self { name, kind }
    }

    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_BRANCH.to_string(),
            kind: BranchType::Unknown,
        }
    }
}

/// Changed files, relative to the run root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSets {
    pub staged: Vec<PathBuf>,
    pub unstaged: Vec<PathBuf>,
    /// Staged, unstaged and untracked files combined.
    pub modified_all: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    /// Count of modified files per technology stack.
    pub by_stack: BTreeMap<Scope, usize>,
}

impl FileSets {
    pub fn is_deleted(&self, file: &Path) -> bool {
        self.deleted.iter().any(|d| d == file)
    }
}

/// Immutable snapshot of the invocation's environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionContext {
    pub root: PathBuf,
    pub branch: BranchInfo,
    pub files: FileSets,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionContext {
    /// Context for a run where git state could not be read.
    pub fn degraded(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            branch: BranchInfo::unknown(),
            files: FileSets::default(),
            timestamp: Utc::now(),
        }
    }
}

/// Maps file paths onto technology stacks.
///
/// Rules are checked in order; the first match wins.
pub struct StackClassifier {
    rules: Vec<(Scope, GlobSet)>,
}

impl Default for StackClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl StackClassifier {
    pub fn new() -> Self {
        let rules = vec![
            (
                Scope::Testing,
                build_glob_set(&[
                    "**/test/**",
                    "**/tests/**",
                    "**/__tests__/**",
                    "**/*.test.*",
                    "**/*.spec.*",
                    "**/test_*.py",
                    "**/*_test.py",
                    "**/*_test.go",
                ]),
            ),
            (
                Scope::Infrastructure,
                build_glob_set(&[
                    "**/Dockerfile*",
                    "**/*.Dockerfile",
                    "**/docker-compose*.{yml,yaml}",
                    "**/*.{tf,tfvars,hcl}",
                    "**/k8s/**",
                    "**/helm/**",
                    ".github/workflows/**",
                ]),
            ),
            (
                Scope::Docs,
                build_glob_set(&["docs/**", "**/*.{md,mdx,rst,adoc}"]),
            ),
            (
                Scope::Frontend,
                build_glob_set(&[
                    "**/*.{ts,tsx,js,jsx,mjs,cjs,vue,svelte}",
                    "**/*.{css,scss,sass,less,html}",
                ]),
            ),
            (
                Scope::Backend,
                build_glob_set(&["**/*.{py,go,rb,java,kt,rs,php,cs,sql}"]),
            ),
        ];
        Self { rules }
    }

    pub fn classify(&self, path: &Path) -> Option<Scope> {
        self.rules
            .iter()
            .find(|(_, set)| set.is_match(path))
            .map(|(scope, _)| *scope)
    }

    /// Count files per stack; unclassified files are not counted.
    pub fn count(&self, files: &[PathBuf]) -> BTreeMap<Scope, usize> {
        let mut counts = BTreeMap::new();
        for file in files {
            if let Some(scope) = self.classify(file) {
                *counts.entry(scope).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Build a GlobSet from pattern strings.
///
/// Invalid patterns are logged and skipped.
fn build_glob_set(patterns: &[&str]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => {
                tracing::warn!("invalid glob pattern '{}': {}", pattern, e);
            }
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Detects the execution context for a run root.
pub struct ContextDetector {
    root: PathBuf,
    classifier: StackClassifier,
}

impl ContextDetector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            classifier: StackClassifier::new(),
        }
    }

    /// Read branch and file state. Never fails.
    pub fn detect(&self) -> ExecutionContext {
        let tree = match git::read_status(&self.root) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::debug!("git state unavailable, using degraded context: {e:#}");
                return ExecutionContext::degraded(&self.root);
            }
        };

        let modified_all: Vec<PathBuf> = tree
            .staged
            .iter()
            .chain(&tree.unstaged)
            .chain(&tree.untracked)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let by_stack = self.classifier.count(&modified_all);

        let branch = tree
            .branch
            .map(BranchInfo::new)
            .unwrap_or_else(BranchInfo::unknown);

        tracing::debug!(
            "context: branch={} ({:?}), staged={}, unstaged={}, modified={}",
            branch.name,
            branch.kind,
            tree.staged.len(),
            tree.unstaged.len(),
            modified_all.len()
        );

        ExecutionContext {
            root: self.root.clone(),
            branch,
            files: FileSets {
                staged: tree.staged,
                unstaged: tree.unstaged,
                modified_all,
                deleted: tree.deleted,
                by_stack,
            },
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
