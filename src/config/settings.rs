//! User settings for zipvault
//!
//! Persisted defaults for the CLI: destination root, retention keep count,
//! and whether hashing is enabled. Every value can be overridden per
//! invocation by command-line flags.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::error::{VaultError, VaultResult};
use crate::hash::HashAlgorithm;

/// User settings for zipvault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Default destination root for backups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_destination: Option<PathBuf>,

    /// Default number of date directories to keep after a backup run
    ///
    /// Absent means unlimited retention: pruning is simply not invoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_keep: Option<u32>,

    /// Whether source/archive hashing is enabled by default
    #[serde(default = "default_hashing_enabled")]
    pub hashing_enabled: bool,

    /// Default digest algorithm
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,
}

fn default_schema_version() -> u32 {
    1
}

fn default_hashing_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_destination: None,
            default_keep: None,
            hashing_enabled: default_hashing_enabled(),
            hash_algorithm: HashAlgorithm::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, creating defaults if the file doesn't exist
    pub fn load_or_create(paths: &VaultPaths) -> VaultResult<Self> {
        let settings_file = paths.settings_file();

        if settings_file.exists() {
            let contents = std::fs::read_to_string(&settings_file)
                .map_err(|e| VaultError::Io(format!("Failed to read settings: {}", e)))?;
            serde_json::from_str(&contents)
                .map_err(|e| VaultError::Json(format!("Failed to parse settings: {}", e)))
        } else {
            let settings = Self::default();
            settings.save(paths)?;
            Ok(settings)
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VaultPaths) -> VaultResult<()> {
        paths.ensure_directories()?;

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::Json(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), json)
            .map_err(|e| VaultError::Io(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }
}
