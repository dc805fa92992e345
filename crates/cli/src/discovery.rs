// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Config file discovery.
//!
//! Walks from the current directory up to the git root looking for qgate.toml.

use std::path::{Path, PathBuf};

use crate::config::{self, Config};
use crate::error::{Error, Result};

/// Config file name.
pub const CONFIG_FILE: &str = "qgate.toml";

/// Find the nearest qgate.toml at or above `start_dir`.
///
/// The search never leaves the repository: a directory holding `.git`
/// is the last one checked.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

/// An explicit path (`-C` or `QGATE_CONFIG`) must exist; otherwise the
/// nearest discovered file is used, if any.
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            };
            if path.is_file() {
                Ok(Some(path))
            } else {
                Err(Error::Config {
                    message: format!("config file not found: {}", path.display()),
                    path: Some(path),
                })
            }
        }
        None => Ok(find_config(cwd)),
    }
}

/// Resolve and load the config, falling back to built-in defaults.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<(Config, Option<PathBuf>)> {
    match resolve_config(explicit, cwd)? {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            Ok((config::load(&path)?, Some(path)))
        }
        None => {
            tracing::debug!("no {CONFIG_FILE} found, using built-in defaults");
            Ok((Config::default(), None))
        }
    }
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
