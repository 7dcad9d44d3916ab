use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::tracker::CompletedChecks;
use crate::{seed_dir, BridgeError, CheckId, Result, SeedId};

pub const CHECK_FILE_PREFIX: &str = "check";

/// Outbound `check<id>.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: CheckId,
    pub name: String,
    pub timestamp: f64,
}

impl CheckEvent {
    pub fn new(id: CheckId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            kind: "check".to_string(),
            id,
            name: name.into(),
            timestamp: now.timestamp_micros() as f64 / 1_000_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Written,
    /// Already reported, either this session or by an earlier run.
    AlreadySent,
}

/// Characters that are path separators or reserved on Windows volumes
/// are replaced with `_`. The event body keeps the id unchanged.
pub fn check_file_name(id: &CheckId) -> String {
    let safe: String = id
        .as_str()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{CHECK_FILE_PREFIX}{safe}.json")
}

/// Writes check events into per-seed directories under the base directory.
#[derive(Debug, Clone)]
pub struct EventStore {
    comm_dir: PathBuf,
}

impl EventStore {
    pub fn new(comm_dir: impl Into<PathBuf>) -> Self {
        Self {
            comm_dir: comm_dir.into(),
        }
    }

    pub fn check_path(&self, seed: &SeedId, id: &CheckId) -> PathBuf {
        seed_dir(&self.comm_dir, seed).join(check_file_name(id))
    }

    /// Reports `id` once per seed.
    ///
    /// The completed set short-circuits repeats within a session. A readable
    /// event file already on disk is never rewritten, so a restart with an
    /// empty set still leaves the first report untouched. A file that does
    /// not parse as this check's event is replaced. The seed directory is
    /// created by the coordinator; if it is missing the check is not marked
    /// completed and will be retried when the game event recurs.
    pub fn send_check(
        &self,
        seed: &SeedId,
        completed: &mut CompletedChecks,
        id: &CheckId,
        name: &str,
    ) -> Result<CheckOutcome> {
        if completed.contains(id) {
            return Ok(CheckOutcome::AlreadySent);
        }

        let dir = seed_dir(&self.comm_dir, seed);
        if !dir.is_dir() {
            return Err(BridgeError::StorageUnavailable { path: dir });
        }

        let path = dir.join(check_file_name(id));
        let event = CheckEvent::new(id.clone(), name);
        match write_new(&path, &event) {
            Ok(()) => {
                completed.add(id.clone());
                info!(seed = %seed, check = %id, name, "check sent");
                Ok(CheckOutcome::Written)
            }
            Err(BridgeError::Io(err)) if err.kind() == ErrorKind::AlreadyExists => {
                if read_event(&path).is_some_and(|existing| existing.id == *id) {
                    completed.add(id.clone());
                    debug!(seed = %seed, check = %id, "check file already on disk");
                    return Ok(CheckOutcome::AlreadySent);
                }

                // Left torn by an interrupted write; replace it.
                warn!(seed = %seed, check = %id, path = %path.display(), "rewriting unreadable check file");
                fs::write(&path, serde_json::to_vec(&event)?)?;
                completed.add(id.clone());
                info!(seed = %seed, check = %id, name, "check sent");
                Ok(CheckOutcome::Written)
            }
            Err(err) => Err(err),
        }
    }

    /// Every check event recorded for `seed`, ordered by file name.
    /// Unreadable or foreign files are skipped.
    pub fn sent_checks(&self, seed: &SeedId) -> Result<Vec<CheckEvent>> {
        let dir = seed_dir(&self.comm_dir, seed);
        if !dir.is_dir() {
            return Err(BridgeError::StorageUnavailable { path: dir });
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_check_file(path))
            .collect();
        paths.sort();

        let mut events = Vec::with_capacity(paths.len());
        for path in paths {
            match read_event(&path) {
                Some(event) => events.push(event),
                None => warn!(path = %path.display(), "skipping unreadable check file"),
            }
        }
        Ok(events)
    }
}

fn is_check_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(CHECK_FILE_PREFIX) && n.ends_with(".json"))
}

fn read_event(path: &Path) -> Option<CheckEvent> {
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

fn write_new(path: &Path, event: &CheckEvent) -> Result<()> {
    let data = serde_json::to_vec(event)?;
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(&data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with_seed(seed: &str) -> (TempDir, EventStore, SeedId) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(seed)).unwrap();
        let store = EventStore::new(dir.path());
        (dir, store, SeedId::new(seed))
    }

    fn count_check_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter(|e| is_check_file(&e.as_ref().unwrap().path()))
            .count()
    }

    #[test]
    fn repeated_send_writes_one_file_with_first_name() {
        let (dir, store, seed) = store_with_seed("S1");
        let mut completed = CompletedChecks::new();
        let id = CheckId::new("boss_1");

        let first = store.send_check(&seed, &mut completed, &id, "Kill Boss").unwrap();
        let second = store.send_check(&seed, &mut completed, &id, "Other Name").unwrap();

        assert_eq!(first, CheckOutcome::Written);
        assert_eq!(second, CheckOutcome::AlreadySent);
        assert!(completed.contains(&id));
        assert_eq!(count_check_files(&dir.path().join("S1")), 1);

        let written: CheckEvent =
            serde_json::from_str(&fs::read_to_string(store.check_path(&seed, &id)).unwrap())
                .unwrap();
        assert_eq!(written.kind, "check");
        assert_eq!(written.name, "Kill Boss");
        assert_eq!(written.id, id);
        assert!(written.timestamp > 0.0);
    }

    #[test]
    fn file_name_is_prefix_plus_id() {
        let (_dir, store, seed) = store_with_seed("S1");
        let path = store.check_path(&seed, &CheckId::new("1042"));
        assert!(path.ends_with("S1/check1042.json"));
    }

    #[test]
    fn fresh_session_does_not_overwrite_existing_event() {
        let (_dir, store, seed) = store_with_seed("S1");
        let id = CheckId::new("7");

        let mut before_restart = CompletedChecks::new();
        store.send_check(&seed, &mut before_restart, &id, "Enter Sanctuary").unwrap();
        let original = fs::read_to_string(store.check_path(&seed, &id)).unwrap();

        let mut after_restart = CompletedChecks::new();
        let outcome = store.send_check(&seed, &mut after_restart, &id, "Enter Sanctuary").unwrap();

        assert_eq!(outcome, CheckOutcome::AlreadySent);
        assert!(after_restart.contains(&id));
        assert_eq!(fs::read_to_string(store.check_path(&seed, &id)).unwrap(), original);
    }

    #[test]
    fn torn_check_file_is_rewritten() {
        let (_dir, store, seed) = store_with_seed("S1");
        let id = CheckId::new("1001");
        let path = store.check_path(&seed, &id);
        fs::write(&path, "").unwrap();

        let mut completed = CompletedChecks::new();
        let outcome = store
            .send_check(&seed, &mut completed, &id, "Enter Southern Shelf")
            .unwrap();

        assert_eq!(outcome, CheckOutcome::Written);
        assert!(completed.contains(&id));
        let listed = store.sent_checks(&seed).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Enter Southern Shelf");
    }

    #[test]
    fn partial_check_file_is_rewritten() {
        let (_dir, store, seed) = store_with_seed("S1");
        let id = CheckId::new("2002");
        let path = store.check_path(&seed, &id);
        fs::write(&path, r#"{"type":"check","id":"20"#).unwrap();

        let mut completed = CompletedChecks::new();
        let outcome = store
            .send_check(&seed, &mut completed, &id, "Defeat Captain Flynt")
            .unwrap();

        assert_eq!(outcome, CheckOutcome::Written);
        let written: CheckEvent = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.id, id);
    }

    #[test]
    fn path_hostile_ids_stay_inside_seed_directory() {
        let (dir, store, seed) = store_with_seed("S1");
        let id = CheckId::new("mission_Dr. T/Bandit: Part 1?");
        assert_eq!(check_file_name(&id), "checkmission_Dr. T_Bandit_ Part 1_.json");

        let mut completed = CompletedChecks::new();
        let outcome = store.send_check(&seed, &mut completed, &id, "Completed it").unwrap();
        assert_eq!(outcome, CheckOutcome::Written);
        assert_eq!(count_check_files(&dir.path().join("S1")), 1);

        let listed = store.sent_checks(&seed).unwrap();
        assert_eq!(listed[0].id, id);
    }

    #[test]
    fn missing_seed_directory_leaves_check_pending() {
        let dir = TempDir::new().unwrap();
        let store = EventStore::new(dir.path());
        let mut completed = CompletedChecks::new();
        let id = CheckId::new("1");

        let err = store
            .send_check(&SeedId::new("gone"), &mut completed, &id, "x")
            .unwrap_err();
        assert!(matches!(err, BridgeError::StorageUnavailable { .. }));
        assert!(!completed.contains(&id));
    }

    #[test]
    fn sent_checks_lists_only_check_documents() {
        let (dir, store, seed) = store_with_seed("S1");
        let mut completed = CompletedChecks::new();
        store.send_check(&seed, &mut completed, &CheckId::new("2"), "b").unwrap();
        store.send_check(&seed, &mut completed, &CheckId::new("1"), "a").unwrap();
        fs::write(dir.path().join("S1").join("config.json"), "{}").unwrap();
        fs::write(dir.path().join("S1").join("checkbroken.json"), "not json").unwrap();

        let names: Vec<_> = store
            .sent_checks(&seed)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
