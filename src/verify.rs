//! Integrity verification of recorded backups
//!
//! Recomputes archive (and optionally live-source) hashes and compares
//! them against the values recorded in the manifests. Entries without hash
//! fields report "no hash data", which is a distinct state from a failed
//! check.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use globset::{Glob, GlobMatcher};
use tracing::warn;

use crate::config::VaultConfig;
use crate::error::VaultResult;
use crate::hash::{self, HashAlgorithm};
use crate::layout;
use crate::manifest::{BackupEntry, ManifestStore};

/// Filters for a verification pass
#[derive(Debug, Default)]
pub struct VerifyOptions {
    /// Only verify entries from this date directory
    pub date: Option<NaiveDate>,
    /// Only verify entries whose archive or original name matches this glob
    pub name_pattern: Option<String>,
    /// Also recompute the hash of the live source path
    pub verify_source: bool,
}

/// Outcome of verifying a single manifest entry
#[derive(Debug)]
pub struct VerificationResult {
    /// Date directory the entry came from
    pub date: NaiveDate,
    /// Archive file name from the manifest
    pub archive_name: String,
    /// Original source path from the manifest
    pub source_path: PathBuf,
    /// Whether the entry carried hash fields at all
    pub has_hash_data: bool,
    /// Archive check: `Some(true)` valid, `Some(false)` failed, `None` not checked
    pub archive_valid: Option<bool>,
    /// Source check: `Some(true)` valid, `Some(false)` failed, `None` not checked
    pub source_valid: Option<bool>,
    /// Human-readable explanation
    pub message: String,
}

impl VerificationResult {
    /// Whether every performed check passed
    pub fn is_ok(&self) -> bool {
        self.archive_valid != Some(false) && self.source_valid != Some(false)
    }
}

/// Recomputes hashes and compares them against manifest records
#[derive(Debug, Clone)]
pub struct IntegrityVerifier {
    store: ManifestStore,
}

impl IntegrityVerifier {
    /// Create a new IntegrityVerifier
    pub fn new(config: VaultConfig) -> Self {
        Self {
            store: ManifestStore::new(config),
        }
    }

    /// Verify manifest entries under a backup root
    ///
    /// # Errors
    ///
    /// Fails when the backup root does not exist or the name pattern is not
    /// a valid glob. Per-entry problems are reported in the results, never
    /// raised.
    pub fn verify(&self, root: &Path, options: &VerifyOptions) -> VaultResult<Vec<VerificationResult>> {
        let matcher = build_matcher(options.name_pattern.as_deref())?;
        let mut results = Vec::new();

        for (date, date_dir) in layout::date_directories(root)? {
            if let Some(only) = options.date {
                if date != only {
                    continue;
                }
            }

            let manifest = match self.store.read(&date_dir) {
                Ok(Some(manifest)) => manifest,
                Ok(None) => continue,
                Err(e) => {
                    warn!(dir = %date_dir.display(), error = %e, "skipping date directory with unusable manifest");
                    continue;
                }
            };

            for entry in manifest.entries {
                if !matches_name(&matcher, &entry) {
                    continue;
                }
                results.push(self.verify_entry(&date_dir, date, entry, options.verify_source));
            }
        }

        Ok(results)
    }

    fn verify_entry(
        &self,
        date_dir: &Path,
        date: NaiveDate,
        entry: BackupEntry,
        verify_source: bool,
    ) -> VerificationResult {
        let mut result = VerificationResult {
            date,
            archive_name: entry.archive_name.clone(),
            source_path: entry.source_path.clone(),
            has_hash_data: entry.has_hash_data(),
            archive_valid: None,
            source_valid: None,
            message: String::new(),
        };

        if !result.has_hash_data {
            result.message = "no hash data recorded; verification unavailable".to_string();
            return result;
        }

        let algorithm = entry
            .hash_algorithm
            .as_deref()
            .and_then(HashAlgorithm::from_id);
        let Some(algorithm) = algorithm else {
            result.message = format!(
                "unknown hash algorithm {:?}",
                entry.hash_algorithm.as_deref().unwrap_or("")
            );
            return result;
        };

        let mut messages = Vec::new();

        if let Some(expected) = &entry.archive_hash {
            let archive_path = date_dir.join(&entry.archive_name);
            if !archive_path.is_file() {
                // Short-circuit: with the archive gone there is nothing
                // further to check for this entry.
                result.archive_valid = Some(false);
                result.message = "archive not found".to_string();
                return result;
            }
            match hash::hash_path(&archive_path, algorithm) {
                Ok(Some(actual)) if &actual == expected => {
                    result.archive_valid = Some(true);
                    messages.push("archive hash verified".to_string());
                }
                Ok(_) => {
                    result.archive_valid = Some(false);
                    messages.push("archive hash mismatch; file is possibly corrupted".to_string());
                }
                Err(e) => {
                    result.archive_valid = Some(false);
                    messages.push(format!("archive could not be hashed: {}", e));
                }
            }
        }

        // The source check never affects the archive verdict.
        if verify_source {
            if let Some(expected) = &entry.source_hash {
                match hash::hash_path(&entry.source_path, algorithm) {
                    Ok(None) => {
                        result.source_valid = Some(false);
                        messages.push("source no longer exists".to_string());
                    }
                    Ok(Some(actual)) if &actual == expected => {
                        result.source_valid = Some(true);
                        messages.push("source hash verified".to_string());
                    }
                    Ok(Some(_)) => {
                        result.source_valid = Some(false);
                        messages.push("source changed since backup".to_string());
                    }
                    Err(e) => {
                        result.source_valid = Some(false);
                        messages.push(format!("source could not be hashed: {}", e));
                    }
                }
            }
        }

        result.message = messages.join("; ");
        result
    }
}

fn build_matcher(pattern: Option<&str>) -> VaultResult<Option<GlobMatcher>> {
    match pattern {
        Some(pattern) => Ok(Some(Glob::new(pattern)?.compile_matcher())),
        None => Ok(None),
    }
}

fn matches_name(matcher: &Option<GlobMatcher>, entry: &BackupEntry) -> bool {
    let Some(matcher) = matcher else {
        return true;
    };
    matcher.is_match(&entry.archive_name)
        || entry
            .original_name
            .as_deref()
            .map(|name| matcher.is_match(name))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::{BackupManager, BackupOptions};
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use tempfile::TempDir;

    fn backed_up_file(hashing: bool) -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("data.txt");
        fs::write(&source, b"verify me").unwrap();
        let root = temp.path().join("backups");
        fs::create_dir(&root).unwrap();

        let manager = BackupManager::new(VaultConfig::default());
        let options = BackupOptions {
            hashing,
            ..Default::default()
        };
        manager.run(&[source.clone()], &root, &options).unwrap();

        (temp, source, root)
    }

    fn verifier() -> IntegrityVerifier {
        IntegrityVerifier::new(VaultConfig::default())
    }

    #[test]
    fn test_intact_archive_verifies() {
        let (_temp, _source, root) = backed_up_file(true);

        let results = verifier().verify(&root, &VerifyOptions::default()).unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].has_hash_data);
        assert_eq!(results[0].archive_valid, Some(true));
        assert!(results[0].is_ok());
    }

    #[test]
    fn test_corrupted_archive_fails_with_message() {
        let (_temp, _source, root) = backed_up_file(true);

        // Corrupt the archive by appending one byte.
        let (_, date_dir) = layout::latest_date_directory(&root).unwrap().unwrap();
        let archive = fs::read_dir(&date_dir)
            .unwrap()
            .filter_map(Result::ok)
            .find(|e| e.path().extension().map_or(false, |x| x == "zip"))
            .unwrap()
            .path();
        let mut file = OpenOptions::new().append(true).open(&archive).unwrap();
        file.write_all(b"X").unwrap();

        let results = verifier().verify(&root, &VerifyOptions::default()).unwrap();

        assert_eq!(results[0].archive_valid, Some(false));
        assert!(results[0].has_hash_data);
        assert!(results[0].message.contains("corrupted"));
    }

    #[test]
    fn test_missing_archive_short_circuits() {
        let (_temp, _source, root) = backed_up_file(true);

        let (_, date_dir) = layout::latest_date_directory(&root).unwrap().unwrap();
        for entry in fs::read_dir(&date_dir).unwrap().filter_map(Result::ok) {
            if entry.path().extension().map_or(false, |x| x == "zip") {
                fs::remove_file(entry.path()).unwrap();
            }
        }

        let options = VerifyOptions {
            verify_source: true,
            ..Default::default()
        };
        let results = verifier().verify(&root, &options).unwrap();

        assert_eq!(results[0].archive_valid, Some(false));
        assert_eq!(results[0].message, "archive not found");
        assert!(results[0].source_valid.is_none());
    }

    #[test]
    fn test_no_hash_data_is_distinct_from_failure() {
        let (_temp, _source, root) = backed_up_file(false);

        let results = verifier().verify(&root, &VerifyOptions::default()).unwrap();

        assert_eq!(results.len(), 1);
        assert!(!results[0].has_hash_data);
        assert!(results[0].archive_valid.is_none());
        assert!(results[0].is_ok());
        assert!(results[0].message.contains("no hash data"));
    }

    #[test]
    fn test_source_changed_since_backup() {
        let (_temp, source, root) = backed_up_file(true);
        fs::write(&source, b"tampered").unwrap();

        let options = VerifyOptions {
            verify_source: true,
            ..Default::default()
        };
        let results = verifier().verify(&root, &options).unwrap();

        assert_eq!(results[0].source_valid, Some(false));
        assert!(results[0].message.contains("source changed since backup"));
        // Archive verdict is unaffected by the source check.
        assert_eq!(results[0].archive_valid, Some(true));
    }

    #[test]
    fn test_source_missing() {
        let (_temp, source, root) = backed_up_file(true);
        fs::remove_file(&source).unwrap();

        let options = VerifyOptions {
            verify_source: true,
            ..Default::default()
        };
        let results = verifier().verify(&root, &options).unwrap();

        assert_eq!(results[0].source_valid, Some(false));
        assert!(results[0].message.contains("source no longer exists"));
    }

    #[test]
    fn test_name_pattern_filters_entries() {
        let (_temp, _source, root) = backed_up_file(true);

        let options = VerifyOptions {
            name_pattern: Some("*nomatch*".to_string()),
            ..Default::default()
        };
        assert!(verifier().verify(&root, &options).unwrap().is_empty());

        let options = VerifyOptions {
            name_pattern: Some("*data.txt*".to_string()),
            ..Default::default()
        };
        assert_eq!(verifier().verify(&root, &options).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        assert!(verifier().verify(&missing, &VerifyOptions::default()).is_err());
    }
}
