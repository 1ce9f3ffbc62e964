//! Manifest persistence
//!
//! The manifest for a date directory is read whole, mutated in memory, and
//! written whole. Writes go to a temporary file that replaces the manifest
//! in one rename, so a reader never sees a half-written file. There is no
//! cross-process locking: concurrent runs appending to the same date
//! directory are outside the supported contract.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::entry::BackupEntry;
use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};

/// The per-date manifest of all backups made that day
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupManifest {
    /// ISO date matching the containing directory name
    pub backup_date: String,
    /// Manifest schema version
    pub backup_version: String,
    /// Version of the tool that produced the manifest (informational)
    pub module_version: String,
    /// Backup entries in chronological insertion order
    #[serde(rename = "Backups")]
    pub entries: Vec<BackupEntry>,
}

/// Reads and writes per-date manifest files
#[derive(Debug, Clone)]
pub struct ManifestStore {
    config: VaultConfig,
}

impl ManifestStore {
    /// Create a new ManifestStore
    pub fn new(config: VaultConfig) -> Self {
        Self { config }
    }

    /// Path of the manifest file inside a date directory
    pub fn manifest_path(&self, date_dir: &Path) -> PathBuf {
        date_dir.join(&self.config.manifest_file_name)
    }

    /// Read the manifest for a date directory
    ///
    /// Returns `Ok(None)` when no manifest file exists. Malformed JSON, a
    /// missing entries collection, or an unexpected schema version is an
    /// error; `append` downgrades that to "start fresh" with a warning.
    pub fn read(&self, date_dir: &Path) -> VaultResult<Option<BackupManifest>> {
        let path = self.manifest_path(date_dir);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| VaultError::Io(format!("Failed to read manifest {}: {}", path.display(), e)))?;

        let manifest: BackupManifest = serde_json::from_str(&contents)
            .map_err(|e| VaultError::Manifest(format!("Malformed manifest {}: {}", path.display(), e)))?;

        if manifest.backup_version != self.config.manifest_version {
            return Err(VaultError::Manifest(format!(
                "Unexpected manifest version {:?} in {} (expected {:?})",
                manifest.backup_version,
                path.display(),
                self.config.manifest_version,
            )));
        }

        Ok(Some(manifest))
    }

    /// Append an entry to the manifest for a date directory
    ///
    /// Loads the existing manifest when present and structurally valid;
    /// otherwise starts a fresh one for that date. The entry is added at
    /// the end, never merged or deduplicated.
    pub fn append(&self, date_dir: &Path, date: NaiveDate, entry: BackupEntry) -> VaultResult<()> {
        let mut manifest = match self.read(date_dir) {
            Ok(Some(manifest)) => manifest,
            Ok(None) => self.fresh(date),
            Err(e) => {
                warn!(error = %e, "unusable manifest, starting a fresh one for this date");
                self.fresh(date)
            }
        };

        manifest.entries.push(entry);
        self.persist(date_dir, &manifest)
    }

    /// Find an entry by archive file name
    pub fn find_entry(&self, date_dir: &Path, archive_name: &str) -> VaultResult<Option<BackupEntry>> {
        Ok(self.read(date_dir)?.and_then(|manifest| {
            manifest
                .entries
                .into_iter()
                .find(|entry| entry.archive_name == archive_name)
        }))
    }

    fn fresh(&self, date: NaiveDate) -> BackupManifest {
        BackupManifest {
            backup_date: date.format(self.config.date_format).to_string(),
            backup_version: self.config.manifest_version.clone(),
            module_version: self.config.module_version.clone(),
            entries: Vec::new(),
        }
    }

    /// Write the manifest atomically: temp file in the same directory, then
    /// rename over the final name
    fn persist(&self, date_dir: &Path, manifest: &BackupManifest) -> VaultResult<()> {
        let path = self.manifest_path(date_dir);
        let tmp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(manifest)
            .map_err(|e| VaultError::Json(format!("Failed to serialize manifest: {}", e)))?;

        fs::write(&tmp_path, json)
            .map_err(|e| VaultError::Io(format!("Failed to write manifest: {}", e)))?;

        fs::rename(&tmp_path, &path)
            .map_err(|e| VaultError::Io(format!("Failed to replace manifest: {}", e)))?;

        Ok(())
    }
}
