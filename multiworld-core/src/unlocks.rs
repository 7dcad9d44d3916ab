use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::items::{find_item, ItemDef, ItemId};
use crate::{BridgeError, Result, DEFAULT_UNLOCK_PREFIX};

/// Prefix given to an unlock file once it has been granted, so later
/// scans no longer match it.
pub const GRANTED_PREFIX: &str = "granted_";

/// Inbound document dropped by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnlockFile {
    pub player: String,
    pub item_id: ItemId,
}

/// An unlock file with its item resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Unlock {
    pub path: PathBuf,
    pub player: String,
    pub item: &'static ItemDef,
}

#[derive(Debug, Clone)]
pub struct UnlockPoller {
    prefix: String,
}

impl Default for UnlockPoller {
    fn default() -> Self {
        Self::new(DEFAULT_UNLOCK_PREFIX)
    }
}

impl UnlockPoller {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Scans `seed_dir` recursively for unlock files.
    ///
    /// Nothing is removed: a file stays deliverable until it is archived,
    /// so every poll before that returns it again. Unreadable directories,
    /// malformed documents and unknown item ids are skipped.
    pub fn poll(&self, seed_dir: &Path) -> Vec<Unlock> {
        let mut unlocks = Vec::new();

        let walker = WalkDir::new(seed_dir).sort_by_file_name().into_iter();
        for entry in walker.filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(&self.prefix));
            if !matches {
                continue;
            }

            match read_unlock(entry.path()) {
                Ok(file) => match find_item(file.item_id) {
                    Some(item) => unlocks.push(Unlock {
                        path: entry.path().to_path_buf(),
                        player: file.player,
                        item,
                    }),
                    None => warn!(
                        path = %entry.path().display(),
                        item_id = file.item_id,
                        "unlock references unknown item"
                    ),
                },
                Err(err) => warn!(path = %entry.path().display(), %err, "skipping unreadable unlock file"),
            }
        }

        debug!(dir = %seed_dir.display(), count = unlocks.len(), "polled unlocks");
        unlocks
    }

    /// Marks a delivered unlock as granted by renaming it in place.
    pub fn archive(&self, unlock: &Unlock) -> Result<PathBuf> {
        let name = unlock
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| BridgeError::StorageUnavailable {
                path: unlock.path.clone(),
            })?;
        let target = unlock.path.with_file_name(format!("{GRANTED_PREFIX}{name}"));
        fs::rename(&unlock.path, &target)?;
        Ok(target)
    }
}

fn read_unlock(path: &Path) -> Result<UnlockFile> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|source| BridgeError::CorruptDocument {
        path: path.to_path_buf(),
        source,
    })
}
