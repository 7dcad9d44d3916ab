use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::{BridgeError, Result, CONFIG_FILE};

/// `<seed>/config.json`, written by the coordinator once per seed and
/// read-only on this side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default)]
    pub slot_name: Option<String>,
    #[serde(default)]
    pub seed_name: Option<String>,
    #[serde(default)]
    pub death_link: bool,
    /// Keep the skill point granted on level-up instead of receiving skill
    /// points only as unlocks.
    #[serde(default)]
    pub vanilla_skill_points: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SeedConfig {
    pub fn load(seed_dir: &Path) -> Result<Self> {
        let path = seed_dir.join(CONFIG_FILE);
        let failed = |reason: String| BridgeError::ConfigLoadFailed {
            path: path.clone(),
            reason,
        };

        let data = fs::read_to_string(&path).map_err(|e| failed(e.to_string()))?;
        serde_json::from_str(&data).map_err(|e| failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_known_and_unknown_keys() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"slot_name":"Axton","death_link":true,"goal":"warrior"}"#,
        )
        .unwrap();

        let config = SeedConfig::load(dir.path()).unwrap();
        assert_eq!(config.slot_name.as_deref(), Some("Axton"));
        assert!(config.death_link);
        assert!(!config.vanilla_skill_points);
        assert_eq!(config.extra["goal"], "warrior");
    }

    #[test]
    fn missing_file_is_config_load_failed() {
        let dir = TempDir::new().unwrap();
        let err = SeedConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, BridgeError::ConfigLoadFailed { .. }));
    }

    #[test]
    fn non_object_document_fails_closed() {
        let dir = TempDir::new().unwrap();
        for body in ["42", "not json", r#"{"death_link":"yes"}"#] {
            fs::write(dir.path().join(CONFIG_FILE), body).unwrap();
            let err = SeedConfig::load(dir.path()).unwrap_err();
            assert!(matches!(err, BridgeError::ConfigLoadFailed { .. }), "{body}");
        }
    }
}
