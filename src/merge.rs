use std::path::Path;

use log::{info, warn};

use crate::{Collection, Item, RawItem, SnapshotStore};

/// Builds the run's collection: fetched items first, in listing order, then
/// the restored backup items in stored order.
///
/// Ids are handed out from one counter across both sources. Backup items
/// keep no trace of their old ids and are never deduplicated against the
/// fetched ones.
pub fn merge(raw_items: Vec<RawItem>, backup_items: Option<Vec<Item>>) -> Collection {
    let backup_len = backup_items.as_ref().map_or(0, Vec::len);
    let mut collection = Collection::with_capacity(raw_items.len() + backup_len);

    for raw in raw_items {
        collection.push_raw(raw);
    }

    if let Some(backup) = backup_items {
        for item in backup {
            collection.push_restored(item);
        }
        info!(
            "Merged {} fetched and {} restored items",
            collection.len() - backup_len,
            backup_len
        );
    }

    collection
}

/// Loads backup items, or `None` if the snapshot cannot be used.
///
/// A missing or corrupt snapshot is not fatal: the failure is logged and the
/// run continues with fetched items only.
pub fn restore_backup(store: &SnapshotStore, path: &Path) -> Option<Vec<Item>> {
    match store.load(path) {
        Ok(items) => Some(items),
        Err(e) => {
            warn!("Ignoring backup {}: {}", path.display(), e);
            None
        }
    }
}
