use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod bindings;
pub mod config;
pub mod events;
pub mod items;
pub mod locations;
pub mod session;
pub mod tracker;
pub mod unlocks;

pub use bindings::{Binding, BindingRegistry};
pub use config::SeedConfig;
pub use events::{CheckEvent, CheckOutcome, EventStore};
pub use items::{find_item, ItemDef, ItemId, ItemKind};
pub use session::{GameEvent, GameHost, MissionStatus, Session, SessionState};
pub use tracker::CompletedChecks;
pub use unlocks::{Unlock, UnlockPoller};

/// Directory name created by the coordinator client under the per-user
/// local data directory.
pub const COMM_DIR_NAME: &str = "BL2Archipelago";

pub const BINDINGS_FILE: &str = "savefile_bindings.json";
pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_UNLOCK_PREFIX: &str = "AP";
pub const DEFAULT_POLL_INTERVAL_TICKS: u32 = 100;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("storage unavailable: {} does not exist", .path.display())]
    StorageUnavailable { path: PathBuf },

    #[error("no unbound seed available in the binding registry")]
    NoSeedAvailable,

    #[error("failed to load config {}: {reason}", .path.display())]
    ConfigLoadFailed { path: PathBuf, reason: String },

    #[error("corrupt document {}: {source}", .path.display())]
    CorruptDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Identifier of one randomizer world. Used verbatim as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedId(String);

impl SeedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Save slot identity reported by the game. The coordinator may write
/// either form, so the variant read is the variant written back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SaveFileId {
    Numeric(i64),
    Named(String),
}

impl fmt::Display for SaveFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveFileId::Numeric(n) => write!(f, "{n}"),
            SaveFileId::Named(s) => f.write_str(s),
        }
    }
}

impl From<i64> for SaveFileId {
    fn from(n: i64) -> Self {
        SaveFileId::Numeric(n)
    }
}

impl From<&str> for SaveFileId {
    fn from(s: &str) -> Self {
        SaveFileId::Named(s.to_string())
    }
}

impl std::str::FromStr for SaveFileId {
    type Err = std::convert::Infallible;

    // Digits are taken as the numeric form the game itself reports.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) => SaveFileId::Numeric(n),
            Err(_) => SaveFileId::Named(s.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(String);

impl CheckId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u32> for CheckId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    pub comm_dir: PathBuf,
    pub unlock_prefix: String,
    pub poll_interval_ticks: u32,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            comm_dir: default_comm_dir(),
            unlock_prefix: DEFAULT_UNLOCK_PREFIX.to_string(),
            poll_interval_ticks: DEFAULT_POLL_INTERVAL_TICKS,
        }
    }
}

impl BridgeSettings {
    pub fn with_comm_dir(comm_dir: impl Into<PathBuf>) -> Self {
        Self {
            comm_dir: comm_dir.into(),
            ..Self::default()
        }
    }

    /// Resolves the base directory and reports (but tolerates) its absence;
    /// the coordinator client may simply not have been started yet.
    pub fn from_env() -> Self {
        let settings = Self::default();
        if !settings.comm_dir.exists() {
            tracing::info!(
                path = %settings.comm_dir.display(),
                "communication directory does not exist, start the coordinator client first"
            );
        } else if !settings.bindings_path().exists() {
            tracing::info!(
                path = %settings.bindings_path().display(),
                "binding registry not found, start the coordinator client first"
            );
        }
        settings
    }

    pub fn bindings_path(&self) -> PathBuf {
        self.comm_dir.join(BINDINGS_FILE)
    }

    pub fn seed_dir(&self, seed: &SeedId) -> PathBuf {
        seed_dir(&self.comm_dir, seed)
    }
}

/// Per-user application data location the coordinator client also uses.
pub fn default_comm_dir() -> PathBuf {
    let mut base = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    base.push(COMM_DIR_NAME);
    base
}

pub fn seed_dir(comm_dir: &Path, seed: &SeedId) -> PathBuf {
    comm_dir.join(seed.as_str())
}
