//! Optional lock-file and cache cleanup.
//!
//! Not part of the default campaign. Each path is removed independently;
//! one failure never stops the rest.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{debug, warn};

/// Lock files and caches a stuck package manager may leave behind,
/// relative to the project root.
pub const LOCK_PATHS: &[&str] = &[
    ".pnpm-lock.yaml",
    "package-lock.json",
    "yarn.lock",
    "node_modules/.cache",
];

/// What happened to one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "result", content = "reason")]
pub enum CleanupResult {
    Removed,
    RemovedDir,
    Missing,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockCleanup {
    pub path: PathBuf,
    pub result: CleanupResult,
}

/// Remove every entry of `LOCK_PATHS` under `root`.
pub async fn clean_lock_files(root: &Path) -> Vec<LockCleanup> {
    clean_paths(root, LOCK_PATHS).await
}

/// Remove each of `paths` under `root`, file or directory.
pub async fn clean_paths(root: &Path, paths: &[&str]) -> Vec<LockCleanup> {
    let mut results = Vec::with_capacity(paths.len());

    for relative in paths {
        let path = root.join(relative);
        let result = remove(&path).await;
        match &result {
            CleanupResult::Failed(reason) => {
                warn!(path = %path.display(), reason = %reason, "Failed to remove lock path");
            }
            other => debug!(path = %path.display(), result = ?other, "Lock path handled"),
        }
        results.push(LockCleanup {
            path: PathBuf::from(relative),
            result,
        });
    }

    results
}

async fn remove(path: &Path) -> CleanupResult {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CleanupResult::Missing,
        Err(e) => return CleanupResult::Failed(e.to_string()),
    };

    if metadata.is_dir() {
        match fs::remove_dir_all(path).await {
            Ok(()) => CleanupResult::RemovedDir,
            Err(e) => CleanupResult::Failed(e.to_string()),
        }
    } else {
        match fs::remove_file(path).await {
            Ok(()) => CleanupResult::Removed,
            Err(e) => CleanupResult::Failed(e.to_string()),
        }
    }
}
