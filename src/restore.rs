//! Backup restoration
//!
//! Locates manifest entries, extracts their archives, and reconstructs the
//! original paths and timestamps. Every attempted entry yields a result
//! record, including in dry runs.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use globset::{Glob, GlobMatcher};
use tracing::{info, warn};
use uuid::Uuid;

use crate::archive;
use crate::classify::PathKind;
use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::layout;
use crate::manifest::{BackupEntry, ManifestStore};

/// Options for a restore pass
#[derive(Debug, Default)]
pub struct RestoreOptions {
    /// Explicit destination directory
    pub destination: Option<PathBuf>,
    /// Restore from this date directory; latest when absent
    pub date: Option<NaiveDate>,
    /// Only restore entries whose archive or original name matches this glob
    pub name_pattern: Option<String>,
    /// Restore each entry to its recorded original path
    pub use_original_paths: bool,
    /// Extract directly into the destination instead of merging via a
    /// scratch directory
    pub preserve_structure: bool,
    /// Overwrite files that already exist at the destination
    pub overwrite: bool,
    /// Report what would happen without writing anything
    pub dry_run: bool,
}

/// Outcome of restoring a single manifest entry
#[derive(Debug)]
pub struct RestoreResult {
    /// Whether the entry was restored (or would be, in a dry run)
    pub success: bool,
    /// Path of the archive the entry came from
    pub archive_path: PathBuf,
    /// Resolved destination, when one could be determined
    pub destination: Option<PathBuf>,
    /// The manifest entry that was used
    pub entry: BackupEntry,
    /// Human-readable explanation
    pub message: String,
}

/// Restores manifest entries from their archives
#[derive(Debug, Clone)]
pub struct RestoreEngine {
    store: ManifestStore,
}

impl RestoreEngine {
    /// Create a new RestoreEngine
    pub fn new(config: VaultConfig) -> Self {
        Self {
            store: ManifestStore::new(config),
        }
    }

    /// Restore entries from a backup root
    ///
    /// # Errors
    ///
    /// Fails when the backup root does not exist, the name pattern is not a
    /// valid glob, or the target date's manifest is unusable. Per-entry
    /// problems are reported in the results, never raised.
    pub fn restore(&self, root: &Path, options: &RestoreOptions) -> VaultResult<Vec<RestoreResult>> {
        let matcher = match options.name_pattern.as_deref() {
            Some(pattern) => Some(Glob::new(pattern)?.compile_matcher()),
            None => None,
        };

        let date_dir = match self.resolve_date_dir(root, options.date)? {
            Some(dir) => dir,
            None => {
                warn!(root = %root.display(), "no date directories under backup root, nothing to restore");
                return Ok(Vec::new());
            }
        };

        let Some(manifest) = self.store.read(&date_dir)? else {
            warn!(dir = %date_dir.display(), "date directory has no manifest, nothing to restore");
            return Ok(Vec::new());
        };

        let entries: Vec<BackupEntry> = manifest
            .entries
            .into_iter()
            .filter(|entry| matches_name(&matcher, entry))
            .collect();

        if entries.is_empty() {
            warn!("no manifest entries match the requested filters");
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(entries.len());
        for entry in entries {
            results.push(self.restore_entry(&date_dir, entry, options));
        }
        Ok(results)
    }

    fn resolve_date_dir(&self, root: &Path, date: Option<NaiveDate>) -> VaultResult<Option<PathBuf>> {
        match date {
            Some(date) => {
                let found = layout::date_directories(root)?
                    .into_iter()
                    .find(|(d, _)| *d == date)
                    .map(|(_, path)| path);
                match found {
                    Some(path) => Ok(Some(path)),
                    None => Err(VaultError::date_dir_not_found(date.format("%Y-%m-%d").to_string())),
                }
            }
            None => Ok(layout::latest_date_directory(root)?.map(|(_, path)| path)),
        }
    }

    fn restore_entry(&self, date_dir: &Path, entry: BackupEntry, options: &RestoreOptions) -> RestoreResult {
        let archive_path = date_dir.join(&entry.archive_name);

        if !archive_path.is_file() {
            return RestoreResult {
                success: false,
                archive_path,
                destination: None,
                message: "archive not found".to_string(),
                entry,
            };
        }

        let destination = resolve_destination(&entry, options);
        let Some(destination) = destination else {
            return RestoreResult {
                success: false,
                archive_path,
                destination: None,
                message: "cannot determine destination".to_string(),
                entry,
            };
        };

        if options.dry_run {
            return RestoreResult {
                success: true,
                archive_path,
                message: format!("would restore to {}", destination.display()),
                destination: Some(destination),
                entry,
            };
        }

        // With original paths, a directory entry's destination already IS
        // the original directory; a wrapper subtree from a combined archive
        // must merge into it rather than nest under it again.
        let dest_is_exact = options.use_original_paths && entry.path_type == PathKind::Directory;

        let outcome = if options.preserve_structure {
            archive::extract(&archive_path, &destination).map(|()| (0usize, 0usize))
        } else {
            self.merge_restore(&archive_path, &destination, &entry, options.overwrite, dest_is_exact)
        };

        match outcome {
            Ok((_, skipped)) => {
                restore_timestamp(&entry, &destination);
                info!(archive = %entry.archive_name, destination = %destination.display(), "restored");
                let message = if skipped > 0 {
                    format!("restored ({} existing file(s) left untouched)", skipped)
                } else {
                    "restored".to_string()
                };
                RestoreResult {
                    success: true,
                    archive_path,
                    destination: Some(destination),
                    entry,
                    message,
                }
            }
            Err(e) => RestoreResult {
                success: false,
                archive_path,
                destination: Some(destination),
                entry,
                message: format!("restore failed: {}", e),
            },
        }
    }

    /// Extract to a scratch directory, then merge-copy into the destination
    ///
    /// Direct extraction would clobber unrelated files when the destination
    /// tree already exists; the scratch indirection lets the copy merge
    /// file by file instead.
    fn merge_restore(
        &self,
        archive_path: &Path,
        destination: &Path,
        entry: &BackupEntry,
        overwrite: bool,
        dest_is_exact: bool,
    ) -> VaultResult<(usize, usize)> {
        let scratch = std::env::temp_dir().join(format!(
            "zipvault-restore-{}",
            Uuid::new_v4().simple()
        ));
        archive::extract(archive_path, &scratch)?;

        // Combined archives wrap each source under its base name; pick out
        // just this entry's subtree when it is present in the scratch root.
        let merge_root = match entry.original_name.as_deref() {
            Some(name) if scratch.join(name).exists() => scratch.join(name),
            _ => scratch.clone(),
        };

        let result = if merge_root.is_file() {
            fs::create_dir_all(destination)
                .map_err(|e| VaultError::Io(format!("Failed to create {}: {}", destination.display(), e)))?;
            let target = destination.join(merge_root.file_name().unwrap_or_default());
            copy_file_merging(&merge_root, &target, overwrite)
        } else {
            let target = if merge_root == scratch || dest_is_exact {
                destination.to_path_buf()
            } else {
                destination.join(merge_root.file_name().unwrap_or_default())
            };
            merge_tree(&merge_root, &target, overwrite)
        };

        if let Err(e) = fs::remove_dir_all(&scratch) {
            warn!(path = %scratch.display(), error = %e, "failed to clean up scratch directory");
        }

        result
    }
}

/// Resolve where an entry should be restored
fn resolve_destination(entry: &BackupEntry, options: &RestoreOptions) -> Option<PathBuf> {
    if options.use_original_paths {
        match entry.path_type {
            PathKind::File => {
                if let Some(parent) = entry.source_path.parent() {
                    return Some(parent.to_path_buf());
                }
            }
            PathKind::Directory => return Some(entry.source_path.clone()),
        }
    }
    options.destination.clone()
}

/// Copy one file, honoring the overwrite policy; returns (copied, skipped)
fn copy_file_merging(source: &Path, target: &Path, overwrite: bool) -> VaultResult<(usize, usize)> {
    if target.exists() && !overwrite {
        warn!(path = %target.display(), "destination file exists, skipping (use --force to overwrite)");
        return Ok((0, 1));
    }
    fs::copy(source, target)
        .map_err(|e| VaultError::Io(format!("Failed to copy to {}: {}", target.display(), e)))?;
    Ok((1, 0))
}

/// Merge a directory tree into the destination without touching unrelated
/// files; returns (copied, skipped)
fn merge_tree(source: &Path, destination: &Path, overwrite: bool) -> VaultResult<(usize, usize)> {
    let mut copied = 0;
    let mut skipped = 0;

    for entry in walkdir::WalkDir::new(source) {
        let entry = entry.map_err(|e| VaultError::Io(format!("Failed to walk scratch tree: {}", e)))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| VaultError::Io(format!("Failed to relativize path: {}", e)))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| VaultError::Io(format!("Failed to create {}: {}", target.display(), e)))?;
        } else if entry.file_type().is_file() {
            let (c, s) = copy_file_merging(entry.path(), &target, overwrite)?;
            copied += c;
            skipped += s;
        }
    }

    Ok((copied, skipped))
}

/// Best-effort restoration of the recorded modification time
fn restore_timestamp(entry: &BackupEntry, destination: &Path) {
    let (PathKind::File, Some(mtime)) = (entry.path_type, entry.last_write_time) else {
        return;
    };
    let Some(name) = entry.original_name.as_deref() else {
        return;
    };
    let restored_file = destination.join(name);
    let result = fs::File::options()
        .write(true)
        .open(&restored_file)
        .and_then(|file| file.set_modified(mtime.into()));
    if let Err(e) = result {
        warn!(path = %restored_file.display(), error = %e, "could not restore modification time");
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
