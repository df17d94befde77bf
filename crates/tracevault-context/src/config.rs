use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracevault_core::resolve_workspace_path;

use crate::{Error, Result};

/// Optional on-disk settings; every field has a sane default, so a missing
/// or partially-filled `config.toml` is never an error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub max_workers: Option<usize>,
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
}

impl Settings {
    pub fn load(root: &std::path::Path) -> Result<Self> {
        let path = root.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self, root: &std::path::Path) -> Result<()> {
        std::fs::create_dir_all(root)?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(root.join("config.toml"), content)?;
        Ok(())
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers.unwrap_or(4)
    }

    pub fn busy_timeout_ms(&self) -> u64 {
        self.busy_timeout_ms.unwrap_or(5_000)
    }
}

/// Resolve the store's root directory: explicit path > `TRACEVAULT_PATH` >
/// XDG data dir > `~/.tracevault`.
pub fn resolve_root(explicit_path: Option<&str>) -> Result<PathBuf> {
    resolve_workspace_path(explicit_path).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.max_workers(), 4);
        assert_eq!(settings.busy_timeout_ms(), 5_000);
    }

    #[test]
    fn settings_round_trip() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            max_workers: Some(8),
            busy_timeout_ms: Some(1_000),
        };
        settings.save(dir.path()).unwrap();

        let loaded = Settings::load(dir.path()).unwrap();
        assert_eq!(loaded.max_workers(), 8);
        assert_eq!(loaded.busy_timeout_ms(), 1_000);
    }
}
