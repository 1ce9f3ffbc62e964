//! Backup orchestration
//!
//! Drives the full lifecycle for a run: classify each source, derive a
//! unique archive name, write the archive, hash source and archive, append
//! a manifest entry, then apply retention pruning. A failure on one source
//! is reported and the run continues with the rest.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::mode::{choose_mode, ArchiveMode};
use crate::archive;
use crate::classify::{classify, PathKind};
use crate::config::VaultConfig;
use crate::error::VaultResult;
use crate::hash::{self, HashAlgorithm};
use crate::manifest::{BackupEntry, ManifestStore};
use crate::names;
use crate::retention::RetentionPruner;

/// Options for a backup run
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Prune to this many date directories after the run; `None` skips
    /// pruning entirely (unlimited retention)
    pub keep: Option<u32>,
    /// Compute source and archive hashes for each entry
    pub hashing: bool,
    /// Digest algorithm used when hashing is enabled
    pub algorithm: HashAlgorithm,
    /// Force a mode instead of the size/kind policy
    pub mode: Option<ArchiveMode>,
    /// Report what would happen without writing anything
    pub dry_run: bool,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            keep: None,
            hashing: true,
            algorithm: HashAlgorithm::default(),
            mode: None,
            dry_run: false,
        }
    }
}

/// One archive created (or simulated) during a run
#[derive(Debug)]
pub struct CreatedArchive {
    /// Source path the archive covers
    pub source: PathBuf,
    /// Path of the archive
    pub archive_path: PathBuf,
    /// The originally intended name, when a collision forced a rename
    pub renamed_from: Option<String>,
}

/// End-of-run summary
#[derive(Debug, Default)]
pub struct BackupRunSummary {
    /// Archives created, one per source (shared path in combined mode)
    pub created: Vec<CreatedArchive>,
    /// Sources that failed (name too long, archive creation error)
    pub failed: Vec<PathBuf>,
    /// Sources skipped because they could not be resolved on disk
    pub skipped: Vec<PathBuf>,
    /// Date directories removed by retention pruning
    pub pruned: Vec<PathBuf>,
    /// Archive mode the run used
    pub combined: bool,
    /// Whether this was a dry run
    pub dry_run: bool,
}

/// Top-level backup orchestrator
#[derive(Debug, Clone)]
pub struct BackupManager {
    config: VaultConfig,
    store: ManifestStore,
    pruner: RetentionPruner,
}

impl BackupManager {
    /// Create a new BackupManager
    pub fn new(config: VaultConfig) -> Self {
        let store = ManifestStore::new(config.clone());
        let pruner = RetentionPruner::new(config.clone());
        Self {
            config,
            store,
            pruner,
        }
    }

    /// Back up the given sources into `<dest_root>/<today>/`
    ///
    /// Per-source failures are recorded in the summary and do not abort the
    /// run; a combined-archive failure aborts the whole call since a
    /// partial combined archive is not valid.
    pub fn run(
        &self,
        sources: &[PathBuf],
        dest_root: &Path,
        options: &BackupOptions,
    ) -> VaultResult<BackupRunSummary> {
        let today = Utc::now().date_naive();
        let date_dir = dest_root.join(today.format(self.config.date_format).to_string());

        let mut summary = BackupRunSummary {
            dry_run: options.dry_run,
            ..Default::default()
        };

        // Resolve and classify up front; a missing source is a warning for
        // that one path, not a failed run.
        let mut resolved: Vec<(PathBuf, PathKind)> = Vec::new();
        for source in sources {
            if !source.exists() {
                warn!(path = %source.display(), "source path could not be resolved, skipping");
                summary.skipped.push(source.clone());
                continue;
            }
            resolved.push((source.clone(), classify(source)));
        }

        if resolved.is_empty() {
            info!("no resolvable sources, nothing to back up");
            return Ok(summary);
        }

        let mode = options.mode.unwrap_or_else(|| choose_mode(&resolved));
        summary.combined = mode == ArchiveMode::Combined;

        if !options.dry_run {
            fs::create_dir_all(&date_dir)
                .map_err(|e| crate::error::VaultError::Io(format!("Failed to create {}: {}", date_dir.display(), e)))?;
        }

        match mode {
            ArchiveMode::Individual => {
                let total = resolved.len();
                for (index, (source, kind)) in resolved.into_iter().enumerate() {
                    info!(item = index + 1, total, source = %source.display(), "processing");
                    match self.backup_one(&source, kind, &date_dir, today, options) {
                        Ok(created) => summary.created.push(created),
                        Err(e) => {
                            warn!(source = %source.display(), error = %e, "backup failed for source");
                            summary.failed.push(source);
                        }
                    }
                }
            }
            ArchiveMode::Combined => {
                self.backup_combined(&resolved, &date_dir, today, options, &mut summary)?;
            }
        }

        if let Some(keep) = options.keep {
            if options.dry_run && !dest_root.is_dir() {
                info!("destination root does not exist yet, nothing to prune");
            } else {
                let outcome = self.pruner.prune_by_count(dest_root, keep, options.dry_run)?;
                summary.pruned = outcome.deleted;
            }
        }

        Ok(summary)
    }

    /// Back up one source into its own archive
    fn backup_one(
        &self,
        source: &Path,
        kind: PathKind,
        date_dir: &Path,
        date: NaiveDate,
        options: &BackupOptions,
    ) -> VaultResult<CreatedArchive> {
        let generated = names::generate(source, date_dir, kind)?;

        if options.dry_run {
            info!(archive = %generated.archive_name, "would create archive");
            return Ok(CreatedArchive {
                source: source.to_path_buf(),
                archive_path: generated.archive_path,
                renamed_from: generated.renamed_from,
            });
        }

        archive::compress_one(source, kind, &generated.archive_path)?;

        let entry = self.build_entry(
            generated.archive_name.clone(),
            source,
            kind,
            &generated.archive_path,
            options,
        )?;
        self.store.append(date_dir, date, entry)?;

        info!(archive = %generated.archive_name, "archive created");
        Ok(CreatedArchive {
            source: source.to_path_buf(),
            archive_path: generated.archive_path,
            renamed_from: generated.renamed_from,
        })
    }

    /// Back up every source into one combined archive
    fn backup_combined(
        &self,
        sources: &[(PathBuf, PathKind)],
        date_dir: &Path,
        date: NaiveDate,
        options: &BackupOptions,
        summary: &mut BackupRunSummary,
    ) -> VaultResult<()> {
        // One combined archive per invocation; the time-of-day suffix keeps
        // same-day runs apart.
        let archive_name = format!("combined-{}.zip", Utc::now().format("%H%M%S"));
        let archive_path = date_dir.join(&archive_name);

        if options.dry_run {
            info!(archive = %archive_name, sources = sources.len(), "would create combined archive");
            for (source, _) in sources {
                summary.created.push(CreatedArchive {
                    source: source.clone(),
                    archive_path: archive_path.clone(),
                    renamed_from: None,
                });
            }
            return Ok(());
        }

        // Any member failure aborts the whole combined archive.
        if let Err(e) = archive::compress_many(sources, &archive_path) {
            if archive_path.exists() {
                let _ = fs::remove_file(&archive_path);
            }
            return Err(e);
        }

        for (source, kind) in sources {
            let entry = self.build_entry(archive_name.clone(), source, *kind, &archive_path, options)?;
            self.store.append(date_dir, date, entry)?;
            summary.created.push(CreatedArchive {
                source: source.clone(),
                archive_path: archive_path.clone(),
                renamed_from: None,
            });
        }

        info!(archive = %archive_name, sources = sources.len(), "combined archive created");
        Ok(())
    }

    /// Build a manifest entry, hashing source and archive when enabled
    fn build_entry(
        &self,
        archive_name: String,
        source: &Path,
        kind: PathKind,
        archive_path: &Path,
        options: &BackupOptions,
    ) -> VaultResult<BackupEntry> {
        let entry = BackupEntry::new(archive_name, source, kind);
        if !options.hashing {
            return Ok(entry);
        }

        let source_hash = hash::hash_path(source, options.algorithm)?;
        let archive_hash = hash::hash_path(archive_path, options.algorithm)?;
        Ok(entry.with_hashes(source_hash, archive_hash, options.algorithm))
    }
}
