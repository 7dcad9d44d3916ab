use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{BridgeError, Result, SaveFileId, SeedId};

/// One entry of `savefile_bindings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(default)]
    pub save_file: Option<SaveFileId>,
    #[serde(default)]
    pub seed: Option<SeedId>,
    /// Keys written by the coordinator that this side does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Binding {
    pub fn new(save_file: Option<SaveFileId>, seed: impl Into<String>) -> Self {
        Self {
            save_file,
            seed: Some(SeedId::new(seed)),
            extra: Map::new(),
        }
    }

    /// A seed with no save attached yet.
    pub fn is_available(&self) -> bool {
        self.save_file.is_none() && self.seed.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// The shared save-file to seed table.
///
/// The document is owned jointly with the coordinator and is always
/// rewritten whole. There is no locking: two writers racing on a claim
/// resolve as last-writer-wins.
#[derive(Debug, Clone)]
pub struct BindingRegistry {
    path: PathBuf,
    bindings: Vec<Binding>,
}

impl BindingRegistry {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(BridgeError::StorageUnavailable { path });
        }

        let data = fs::read_to_string(&path)?;
        let bindings: Vec<Binding> =
            serde_json::from_str(&data).map_err(|source| BridgeError::CorruptDocument {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), count = bindings.len(), "loaded binding registry");

        Ok(Self { path, bindings })
    }

    /// Builds an in-memory registry that persists to `path`; used by tooling
    /// and tests that seed a fresh document.
    pub fn from_bindings(path: impl Into<PathBuf>, bindings: Vec<Binding>) -> Self {
        Self {
            path: path.into(),
            bindings,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn find_binding_for(&self, save_file: &SaveFileId) -> Option<&SeedId> {
        self.bindings
            .iter()
            .filter(|b| b.save_file.as_ref() == Some(save_file))
            .find_map(|b| b.seed.as_ref())
    }

    /// Attaches `save_file` to the earliest available binding and writes the
    /// whole registry back. A save that already owns a seed keeps it and
    /// nothing is written. On a failed write the in-memory claim is undone.
    pub fn claim_first_available(&mut self, save_file: &SaveFileId) -> Result<SeedId> {
        if let Some(seed) = self.find_binding_for(save_file) {
            debug!(seed = %seed, save_file = %save_file, "save file already bound");
            return Ok(seed.clone());
        }

        let index = self
            .bindings
            .iter()
            .position(Binding::is_available)
            .ok_or(BridgeError::NoSeedAvailable)?;

        // A seedless entry still naming this save would make it a second owner.
        let stale: Vec<usize> = self
            .bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| b.save_file.as_ref() == Some(save_file))
            .map(|(i, _)| i)
            .collect();
        for &i in &stale {
            self.bindings[i].save_file = None;
        }

        self.bindings[index].save_file = Some(save_file.clone());
        if let Err(err) = self.save() {
            self.bindings[index].save_file = None;
            for &i in &stale {
                self.bindings[i].save_file = Some(save_file.clone());
            }
            return Err(err);
        }

        let seed = self.bindings[index]
            .seed
            .clone()
            .ok_or(BridgeError::NoSeedAvailable)?;
        info!(seed = %seed, save_file = %save_file, slot = index, "bound save file to seed");
        Ok(seed)
    }

    /// Existing binding if there is one, otherwise a fresh claim.
    pub fn bind(&mut self, save_file: &SaveFileId) -> Result<SeedId> {
        if let Some(seed) = self.find_binding_for(save_file) {
            return Ok(seed.clone());
        }
        info!(save_file = %save_file, "save file not bound to any seed, claiming one");
        self.claim_first_available(save_file)
    }

    /// Detaches `save_file` from its seed, making that seed claimable again.
    /// Returns the released seed, or `None` if the save was not bound.
    pub fn release(&mut self, save_file: &SaveFileId) -> Result<Option<SeedId>> {
        let Some(binding) = self
            .bindings
            .iter_mut()
            .find(|b| b.save_file.as_ref() == Some(save_file))
        else {
            return Ok(None);
        };

        binding.save_file = None;
        let seed = binding.seed.clone();
        self.save()?;
        Ok(seed)
    }

    pub fn save(&self) -> Result<()> {
        let data = serde_json::to_string(&self.bindings)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
