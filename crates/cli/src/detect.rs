// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tool binary detection with a shared, persisted cache.
//!
//! The environment checker and the command adapter resolve binaries through
//! the same `ToolDetectionCache`, so they cannot disagree on availability.
//!
//! Invalidation:
//! - `reset()` when the manifest fingerprint (dependency manifests,
//!   lockfiles, config content, `PATH`) changes
//! - `invalidate(key)` when a tool's `version_arg` changes or its cached
//!   binary disappears

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, RwLock};
use std::time::Duration;

use dashmap::DashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::process::{CancelToken, CommandSpec, ProcessRunner};

/// Cache format version.
pub const DETECT_CACHE_VERSION: u32 = 1;

/// Directory for qgate state under the run root.
pub const STATE_DIR: &str = ".qgate";

/// Cache file name within the state directory.
pub const DETECT_CACHE_FILE: &str = "detect.bin";

/// Upper bound for a `--version` probe.
const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Files whose content changes what binaries are installed.
const MANIFESTS: &[&str] = &[
    "package.json",
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "bun.lockb",
    "pyproject.toml",
    "poetry.lock",
    "uv.lock",
    "requirements.txt",
    "requirements-dev.txt",
    "Pipfile.lock",
    "Gemfile.lock",
    "go.sum",
    "Cargo.lock",
];

/// Project-local binary directories, searched before `PATH`.
const LOCAL_BIN_DIRS: &[&str] = &["node_modules/.bin", ".venv/bin"];

#[allow(clippy::expect_used)]
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+(?:\.\d+)?)").expect("valid regex"));

/// Error type for detection cache persistence.
#[derive(Debug, thiserror::Error)]
pub enum DetectCacheError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Postcard(#[from] postcard::Error),

    #[error("cache version mismatch")]
    VersionMismatch,
}

/// A located tool binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub command: String,
    pub path: PathBuf,
    /// First `x.y[.z]` in the probe output.
    pub version: Option<String>,
    /// Argument the version was probed with.
    pub version_arg: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistentDetections {
    version: u32,
    qgate_version: String,
    fingerprint: u64,
    entries: HashMap<String, Detection>,
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// Shared detection cache.
///
/// Lookups and probes hold the gate for reading; `reset` takes it for
/// writing, so a reset never races an in-flight detection.
pub struct ToolDetectionCache {
    root: PathBuf,
    runner: Arc<dyn ProcessRunner>,
    entries: DashMap<String, Detection>,
    gate: RwLock<()>,
    fingerprint: AtomicU64,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl ToolDetectionCache {
    pub fn new(root: impl Into<PathBuf>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            root: root.into(),
            runner,
            entries: DashMap::new(),
            gate: RwLock::new(()),
            fingerprint: AtomicU64::new(0),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Load a persisted cache.
    pub fn load(
        path: &Path,
        root: impl Into<PathBuf>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Result<Self, DetectCacheError> {
        let bytes = std::fs::read(path)?;
        let persisted: PersistentDetections = postcard::from_bytes(&bytes)?;
        if persisted.version != DETECT_CACHE_VERSION
            || persisted.qgate_version != env!("CARGO_PKG_VERSION")
        {
            return Err(DetectCacheError::VersionMismatch);
        }

        let cache = Self::new(root, runner);
        cache.fingerprint.store(persisted.fingerprint, Ordering::SeqCst);
        for (key, detection) in persisted.entries {
            cache.entries.insert(key, detection);
        }
        Ok(cache)
    }

    /// Persist to disk, writing atomically via a temp file.
    pub fn persist(&self, path: &Path) -> Result<(), DetectCacheError> {
        let persisted = PersistentDetections {
            version: DETECT_CACHE_VERSION,
            qgate_version: env!("CARGO_PKG_VERSION").to_string(),
            fingerprint: self.fingerprint.load(Ordering::SeqCst),
            entries: self
                .entries
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        let bytes = postcard::to_allocvec(&persisted)?;
        std::fs::write(&temp_path, &bytes)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Adopt a manifest fingerprint, resetting the cache if it changed.
    ///
    /// Returns true when a reset happened.
    pub fn sync_manifest(&self, fingerprint: u64) -> bool {
        let previous = self.fingerprint.swap(fingerprint, Ordering::SeqCst);
        if previous == fingerprint {
            return false;
        }
        if !self.entries.is_empty() {
            tracing::debug!("dependency manifest changed, resetting detection cache");
        }
        self.reset();
        true
    }

    /// Drop every entry. Waits for in-flight detections to finish.
    pub fn reset(&self) {
        let _guard = self.gate.write().unwrap_or_else(|e| e.into_inner());
        self.entries.clear();
    }

    /// Drop one entry. Returns true if it existed.
    pub fn invalidate(&self, key: &str) -> bool {
        let _guard = self.gate.read().unwrap_or_else(|e| e.into_inner());
        self.entries.remove(key).is_some()
    }

    /// Cached detection without probing.
    pub fn get(&self, key: &str) -> Option<Detection> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    /// Locate `command` and probe its version, using the cache when valid.
    ///
    /// Returns None when the binary cannot be found. Misses are not cached.
    pub fn resolve(&self, command: &str, version_arg: &str) -> Option<Detection> {
        let _guard = self.gate.read().unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = self.entries.get(command) {
            if entry.version_arg == version_arg && entry.path.is_file() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value().clone());
            }
            drop(entry);
            tracing::debug!("invalidating stale detection for `{command}`");
            self.entries.remove(command);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let detection = self.probe(command, version_arg)?;
        self.entries.insert(command.to_string(), detection.clone());
        Some(detection)
    }

    fn probe(&self, command: &str, version_arg: &str) -> Option<Detection> {
        let path = locate(&self.root, command)?;
        let version = if version_arg.is_empty() {
            None
        } else {
            let spec =
                CommandSpec::new(&path, &self.root, VERSION_PROBE_TIMEOUT).args([version_arg]);
            match self.runner.run(&spec, &CancelToken::new()) {
                Ok(out) if !out.timed_out => parse_version(&out.stdout)
                    .or_else(|| parse_version(&out.stderr)),
                Ok(_) => {
                    tracing::warn!("`{command} {version_arg}` timed out");
                    None
                }
                Err(e) => {
                    tracing::debug!("version probe for `{command}` failed: {e}");
                    None
                }
            }
        };
        tracing::debug!(
            "detected `{command}` at {} (version {})",
            path.display(),
            version.as_deref().unwrap_or("unknown")
        );
        Some(Detection {
            command: command.to_string(),
            path,
            version,
            version_arg: version_arg.to_string(),
        })
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

/// Path of the detection cache under a run root.
pub fn cache_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join(DETECT_CACHE_FILE)
}

/// Hash of everything that can change which binaries are installed.
pub fn manifest_fingerprint(root: &Path, config_content: Option<&str>) -> u64 {
    let mut hasher = DefaultHasher::new();
    for name in MANIFESTS {
        if let Ok(bytes) = std::fs::read(root.join(name)) {
            name.hash(&mut hasher);
            bytes.hash(&mut hasher);
        }
    }
    config_content.hash(&mut hasher);
    std::env::var_os("PATH").hash(&mut hasher);
    hasher.finish()
}

/// Find an executable: explicit path, project-local bin dirs, then `PATH`.
pub fn locate(root: &Path, command: &str) -> Option<PathBuf> {
    if command.contains('/') || command.contains('\\') {
        let path = Path::new(command);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        return is_executable(&path).then_some(path);
    }

    let local = LOCAL_BIN_DIRS.iter().map(|dir| root.join(dir));
    let system = std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).collect::<Vec<_>>())
        .unwrap_or_default();

    local
        .chain(system)
        .map(|dir| dir.join(command))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// First `x.y[.z]` version in probe output.
pub fn parse_version(text: &str) -> Option<String> {
    VERSION_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Compare dotted versions numerically; missing components count as zero.
pub fn compare_versions(a: &str, b: &str) -> CmpOrdering {
    let parse = |v: &str| -> Vec<u64> {
        v.trim()
            .trim_start_matches('v')
            .split('.')
            .map(|part| {
                part.chars()
                    .take_while(char::is_ascii_digit)
                    .collect::<String>()
                    .parse()
                    .unwrap_or(0)
            })
            .collect()
    };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let (x, y) = (
            a.get(i).copied().unwrap_or(0),
            b.get(i).copied().unwrap_or(0),
        );
        match x.cmp(&y) {
            CmpOrdering::Equal => continue,
            other => return other,
        }
    }
    CmpOrdering::Equal
}

#[cfg(test)]
#[path = "detect_tests.rs"]
mod tests;
