//! Retention pruning of date directories
//!
//! Deletes the oldest date-named subdirectories of a backup root beyond a
//! keep count, or one directory by explicit date. Only directories whose
//! names match the exact `yyyy-MM-dd` pattern are candidates; everything
//! else under the root is never touched.
//!
//! Deletion is two-phase so it also works on synced-storage filesystems
//! that reject a recursive delete of a non-empty tree in one call: every
//! contained file is deleted first (clearing read-only flags), then the
//! now-empty subdirectories bottom-up, then the directory itself.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::VaultConfig;
use crate::error::VaultResult;
use crate::layout;

/// Result of a pruning pass
#[derive(Debug, Default)]
pub struct PruneOutcome {
    /// Date directories removed (or that would be removed in dry-run)
    pub deleted: Vec<PathBuf>,
    /// Qualifying date directories left in place
    pub kept: usize,
    /// Individual files/directories whose deletion failed
    pub item_failures: usize,
    /// Whether this was a dry run
    pub dry_run: bool,
}

/// Deletes date directories beyond the retention policy
#[derive(Debug, Clone)]
pub struct RetentionPruner {
    config: VaultConfig,
}

impl RetentionPruner {
    /// Create a new RetentionPruner
    pub fn new(config: VaultConfig) -> Self {
        Self { config }
    }

    /// Delete the oldest date directories so at most `keep` remain
    ///
    /// `keep = 0` deletes every qualifying date directory. Directories with
    /// non-date names are not deleted and do not count toward `keep`.
    pub fn prune_by_count(&self, root: &Path, keep: u32, dry_run: bool) -> VaultResult<PruneOutcome> {
        let dirs = layout::date_directories(root)?;
        let mut outcome = PruneOutcome {
            dry_run,
            ..Default::default()
        };

        let excess = dirs.len().saturating_sub(keep as usize);
        outcome.kept = dirs.len() - excess;

        // Oldest first; date_directories is already sorted ascending.
        for (date, path) in dirs.into_iter().take(excess) {
            if dry_run {
                info!(date = %date.format(self.config.date_format), "would delete date directory");
                outcome.deleted.push(path);
                continue;
            }
            let failures = delete_tree(&path);
            outcome.item_failures += failures;
            if failures == 0 || !path.exists() {
                outcome.deleted.push(path);
            } else {
                warn!(path = %path.display(), "date directory only partially deleted");
            }
        }

        Ok(outcome)
    }

    /// Delete exactly the one date directory for `date`, if present
    pub fn prune_by_date(&self, root: &Path, date: NaiveDate, dry_run: bool) -> VaultResult<PruneOutcome> {
        let name = date.format(self.config.date_format).to_string();
        let dirs = layout::date_directories(root)?;
        let mut outcome = PruneOutcome {
            dry_run,
            ..Default::default()
        };

        let Some((_, path)) = dirs.iter().find(|(d, _)| *d == date) else {
            warn!(date = %name, "no backup directory for this date, nothing to prune");
            outcome.kept = dirs.len();
            return Ok(outcome);
        };

        outcome.kept = dirs.len() - 1;
        if dry_run {
            info!(date = %name, "would delete date directory");
            outcome.deleted.push(path.clone());
            return Ok(outcome);
        }

        let failures = delete_tree(path);
        outcome.item_failures += failures;
        if failures == 0 || !path.exists() {
            outcome.deleted.push(path.clone());
        }

        Ok(outcome)
    }
}

/// Two-phase recursive deletion: files first, then directories bottom-up
///
/// Returns the number of items that could not be deleted. A failure on one
/// item never aborts deletion of the rest.
fn delete_tree(root: &Path) -> usize {
    let mut failures = 0;

    // Phase 1: every contained file, clearing read-only flags.
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        let file_type = entry.file_type();
        if !file_type.is_file() && !file_type.is_symlink() {
            continue;
        }
        let path = entry.path();
        if let Ok(metadata) = fs::symlink_metadata(path) {
            let mut permissions = metadata.permissions();
            if permissions.readonly() {
                #[allow(clippy::permissions_set_readonly_false)]
                permissions.set_readonly(false);
                let _ = fs::set_permissions(path, permissions);
            }
        }
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "failed to delete file");
            failures += 1;
        }
    }

    // Phase 2: now-empty directories, children before parents, root last.
    for entry in WalkDir::new(root)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Err(e) = fs::remove_dir(entry.path()) {
            warn!(path = %entry.path().display(), error = %e, "failed to delete directory");
            failures += 1;
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pruner() -> RetentionPruner {
        RetentionPruner::new(VaultConfig::default())
    }

    fn make_date_dir(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("backup-manifest.json"), b"{}").unwrap();
        fs::write(dir.join("some-archive.zip"), b"zip bytes").unwrap();
        dir
    }

    #[test]
    fn test_keep_boundary() {
        let temp = TempDir::new().unwrap();
        for name in ["2026-01-01", "2026-01-02", "2026-01-03", "2026-01-04", "2026-01-05"] {
            make_date_dir(temp.path(), name);
        }

        let outcome = pruner().prune_by_count(temp.path(), 2, false).unwrap();

        assert_eq!(outcome.deleted.len(), 3);
        assert_eq!(outcome.kept, 2);
        // The two most recent dates survive.
        assert!(!temp.path().join("2026-01-01").exists());
        assert!(!temp.path().join("2026-01-02").exists());
        assert!(!temp.path().join("2026-01-03").exists());
        assert!(temp.path().join("2026-01-04").exists());
        assert!(temp.path().join("2026-01-05").exists());
    }

    #[test]
    fn test_keep_zero_deletes_all() {
        let temp = TempDir::new().unwrap();
        make_date_dir(temp.path(), "2026-01-01");
        make_date_dir(temp.path(), "2026-01-02");

        let outcome = pruner().prune_by_count(temp.path(), 0, false).unwrap();

        assert_eq!(outcome.deleted.len(), 2);
        assert_eq!(outcome.kept, 0);
    }

    #[test]
    fn test_keep_at_least_count_deletes_nothing() {
        let temp = TempDir::new().unwrap();
        make_date_dir(temp.path(), "2026-01-01");
        make_date_dir(temp.path(), "2026-01-02");

        let outcome = pruner().prune_by_count(temp.path(), 5, false).unwrap();

        assert!(outcome.deleted.is_empty());
        assert_eq!(outcome.kept, 2);
        assert!(temp.path().join("2026-01-01").exists());
    }

    #[test]
    fn test_non_date_directories_untouched() {
        let temp = TempDir::new().unwrap();
        make_date_dir(temp.path(), "2026-01-01");
        let other = temp.path().join("keep-me");
        fs::create_dir(&other).unwrap();
        fs::write(other.join("file.txt"), b"data").unwrap();

        pruner().prune_by_count(temp.path(), 0, false).unwrap();

        assert!(!temp.path().join("2026-01-01").exists());
        assert!(other.join("file.txt").exists());
    }

    #[test]
    fn test_dry_run_deletes_nothing() {
        let temp = TempDir::new().unwrap();
        make_date_dir(temp.path(), "2026-01-01");
        make_date_dir(temp.path(), "2026-01-02");

        let outcome = pruner().prune_by_count(temp.path(), 0, true).unwrap();

        assert!(outcome.dry_run);
        assert_eq!(outcome.deleted.len(), 2);
        assert!(temp.path().join("2026-01-01").exists());
        assert!(temp.path().join("2026-01-02").exists());
    }

    #[test]
    fn test_prune_by_date() {
        let temp = TempDir::new().unwrap();
        make_date_dir(temp.path(), "2026-01-01");
        make_date_dir(temp.path(), "2026-01-02");

        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let outcome = pruner().prune_by_date(temp.path(), date, false).unwrap();

        assert_eq!(outcome.deleted.len(), 1);
        assert!(!temp.path().join("2026-01-01").exists());
        assert!(temp.path().join("2026-01-02").exists());
    }

    #[test]
    fn test_prune_by_missing_date_warns_not_fails() {
        let temp = TempDir::new().unwrap();
        make_date_dir(temp.path(), "2026-01-01");

        let date = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let outcome = pruner().prune_by_date(temp.path(), date, false).unwrap();

        assert!(outcome.deleted.is_empty());
        assert_eq!(outcome.kept, 1);
    }

    #[test]
    fn test_deletes_read_only_files() {
        let temp = TempDir::new().unwrap();
        let dir = make_date_dir(temp.path(), "2026-01-01");
        let locked = dir.join("locked.zip");
        fs::write(&locked, b"frozen").unwrap();
        let mut perms = fs::metadata(&locked).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&locked, perms).unwrap();

        let outcome = pruner().prune_by_count(temp.path(), 0, false).unwrap();

        assert_eq!(outcome.item_failures, 0);
        assert!(!dir.exists());
    }

    #[test]
    fn test_deletes_nested_subdirectories() {
        let temp = TempDir::new().unwrap();
        let dir = make_date_dir(temp.path(), "2026-01-01");
        fs::create_dir_all(dir.join("deep").join("deeper")).unwrap();
        fs::write(dir.join("deep").join("deeper").join("f.txt"), b"x").unwrap();

        let outcome = pruner().prune_by_count(temp.path(), 0, false).unwrap();

        assert_eq!(outcome.item_failures, 0);
        assert!(!dir.exists());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");

        assert!(pruner().prune_by_count(&missing, 1, false).is_err());
    }
}
