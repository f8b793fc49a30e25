//! Local snapshots of a saved-item collection.
//!
//! A snapshot is a JSON document holding the ordered items of one run. It is
//! written atomically and never over an existing file: a colliding target is
//! replaced by the lowest free numbered sibling before anything is written.
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::{debug, error, info, trace, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{next_free_path, Collection, Item, Result, SavedError};

/// Snapshot format written by this version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// File name used when `--backup-read`/`--backup-write` are given bare.
pub const DEFAULT_BACKUP_FILE: &str = "redditsaved_backup.json";

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a [Item],
}

#[derive(Deserialize)]
struct SnapshotIn {
    version: u32,
    #[allow(dead_code)]
    saved_at: Option<DateTime<Utc>>,
    items: Vec<Item>,
}

/// Where a snapshot actually ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
    /// Final path of the snapshot file
    pub path: PathBuf,
    /// Whether the requested path was taken and a sibling was used instead
    pub renamed: bool,
    /// Number of items written
    pub items: usize,
}

/// Loads and stores collections as snapshot files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotStore;

impl SnapshotStore {
    pub fn new() -> Self {
        Self
    }

    /// Reads the items of a snapshot, in stored order.
    ///
    /// Every failure is a [`SavedError::RestoreFailed`], which callers treat
    /// as "no backup available".
    pub fn load(&self, path: &Path) -> Result<Vec<Item>> {
        debug!("Loading snapshot from {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            warn!("Failed to read snapshot {}: {}", path.display(), e);
            SavedError::RestoreFailed {
                message: format!("cannot read {}: {}", path.display(), e),
            }
        })?;

        let snapshot: SnapshotIn =
            serde_json::from_str(&content).map_err(|e| SavedError::RestoreFailed {
                message: format!("corrupt snapshot {}: {}", path.display(), e),
            })?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SavedError::RestoreFailed {
                message: format!(
                    "unsupported snapshot version {} in {}",
                    snapshot.version,
                    path.display()
                ),
            });
        }

        info!(
            "Loaded {} items from snapshot {}",
            snapshot.items.len(),
            path.display()
        );
        Ok(snapshot.items)
    }

    /// Writes `collection` to `path`, or to the first free numbered sibling
    /// if `path` already exists.
    pub fn store(&self, collection: &Collection, path: &Path) -> Result<StoredSnapshot> {
        self.store_announcing(collection, path, |_| {})
    }

    /// Like [`store`](Self::store), but hands a renamed target to `announce`
    /// before anything is written.
    pub fn store_announcing<F>(
        &self,
        collection: &Collection,
        path: &Path,
        announce: F,
    ) -> Result<StoredSnapshot>
    where
        F: FnOnce(&Path),
    {
        let target = next_free_path(path);
        let renamed = target != path;
        if renamed {
            info!(
                "{} already exists, writing snapshot to {}",
                path.display(),
                target.display()
            );
            announce(&target);
        }

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            debug!("Creating snapshot directory: {}", dir.display());
            fs::create_dir_all(&dir).map_err(|e| backup_failed(&target, e))?;
        }

        trace!("Serializing {} items", collection.len());
        let json = serde_json::to_string_pretty(&SnapshotOut {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            items: collection.items(),
        })?;

        let mut temp_file = NamedTempFile::new_in(&dir).map_err(|e| backup_failed(&target, e))?;
        temp_file
            .write_all(json.as_bytes())
            .and_then(|_| temp_file.flush())
            .map_err(|e| backup_failed(&target, e))?;

        // persist_noclobber: a file that appeared meanwhile is never replaced
        temp_file
            .persist_noclobber(&target)
            .map_err(|e| backup_failed(&target, e.error))?;

        info!(
            "Snapshot with {} items written to {}",
            collection.len(),
            target.display()
        );

        Ok(StoredSnapshot {
            path: target,
            renamed,
            items: collection.len(),
        })
    }
}

fn backup_failed(target: &Path, e: std::io::Error) -> SavedError {
    error!("Failed to write snapshot {}: {}", target.display(), e);
    SavedError::BackupFailed {
        message: format!("{}: {}", target.display(), e),
    }
}
