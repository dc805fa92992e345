// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Git working-tree status for context detection.
//!
//! Uses git2 (libgit2) for all git operations to avoid subprocess overhead.
//!
//! ## File Sets
//!
//! - Staged: index differs from HEAD (new, modified, renamed, type change)
//! - Unstaged: worktree differs from index for tracked files
//! - Untracked: new worktree files not ignored
//! - Deleted: removed from the index or the worktree
//!
//! All paths are relative to the repository workdir.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use git2::{Repository, Status, StatusOptions};

/// Snapshot of a repository's branch and changed files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTree {
    /// Repository workdir.
    pub root: PathBuf,
    /// Current branch, or None for a detached HEAD.
    pub branch: Option<String>,
    pub staged: Vec<PathBuf>,
    pub unstaged: Vec<PathBuf>,
    pub untracked: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
}

/// Check if a path is in a git repository.
pub fn is_git_repo(root: &Path) -> bool {
    Repository::discover(root).is_ok()
}

/// Workdir of the repository containing `path`.
pub fn workdir(path: &Path) -> Option<PathBuf> {
    let repo = Repository::discover(path).ok()?;
    repo.workdir().map(Path::to_path_buf)
}

/// Name of the checked-out branch.
///
/// Works on unborn branches (fresh `git init`) by reading the symbolic HEAD.
fn current_branch(repo: &Repository) -> anyhow::Result<Option<String>> {
    match repo.head() {
        Ok(head) if head.is_branch() => Ok(head.shorthand().map(String::from)),
        Ok(_) => Ok(None),
        Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
            let head = repo
                .find_reference("HEAD")
                .context("Failed to read HEAD")?;
            Ok(head
                .symbolic_target()
                .and_then(|t| t.strip_prefix("refs/heads/"))
                .map(String::from))
        }
        Err(e) => Err(e).context("Failed to get HEAD"),
    }
}

/// Read branch and file status for the repository containing `path`.
pub fn read_status(path: &Path) -> anyhow::Result<WorkingTree> {
    let repo = Repository::discover(path).context("Failed to open repository")?;
    let root = repo
        .workdir()
        .ok_or_else(|| anyhow::anyhow!("repository has no workdir"))?
        .to_path_buf();
    let branch = current_branch(&repo)?;

    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false)
        .renames_head_to_index(true);
    let statuses = repo
        .statuses(Some(&mut options))
        .context("Failed to read repository status")?;

    let mut staged = BTreeSet::new();
    let mut unstaged = BTreeSet::new();
    let mut untracked = BTreeSet::new();
    let mut deleted = BTreeSet::new();

    for entry in statuses.iter() {
        let Some(file) = entry.path() else {
            continue;
        };
        let file = PathBuf::from(file);
        let status = entry.status();

        if status.intersects(
            Status::INDEX_NEW
                | Status::INDEX_MODIFIED
                | Status::INDEX_RENAMED
                | Status::INDEX_TYPECHANGE,
        ) {
            staged.insert(file.clone());
        }
        if status.intersects(Status::WT_MODIFIED | Status::WT_RENAMED | Status::WT_TYPECHANGE) {
            unstaged.insert(file.clone());
        }
        if status.contains(Status::WT_NEW) {
            untracked.insert(file.clone());
        }
        if status.intersects(Status::INDEX_DELETED | Status::WT_DELETED) {
            deleted.insert(file);
        }
    }

    Ok(WorkingTree {
        root,
        branch,
        staged: staged.into_iter().collect(),
        unstaged: unstaged.into_iter().collect(),
        untracked: untracked.into_iter().collect(),
        deleted: deleted.into_iter().collect(),
    })
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
