//! `zipvault backup` command

use std::path::PathBuf;

use clap::Args;

use crate::backup::{ArchiveMode, BackupManager, BackupOptions};
use crate::config::settings::Settings;
use crate::config::VaultConfig;
use crate::error::VaultResult;

/// Create backups of files and directories
#[derive(Args)]
pub struct BackupArgs {
    /// Source files or directories to back up
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Destination root holding the date directories
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Keep only the newest N date directories after the run
    #[arg(short, long)]
    pub keep: Option<u32>,

    /// Skip source/archive hashing
    #[arg(long)]
    pub no_hash: bool,

    /// Force one combined archive for all sources
    #[arg(long, conflicts_with = "individual")]
    pub combined: bool,

    /// Force one archive per source
    #[arg(long)]
    pub individual: bool,

    /// Show what would happen without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Handle the backup command
pub fn handle_backup_command(settings: &Settings, args: BackupArgs) -> VaultResult<()> {
    let root = super::resolve_root(args.destination, settings)?;
    let keep = args.keep.or(settings.default_keep);

    let options = BackupOptions {
        keep,
        hashing: !args.no_hash && settings.hashing_enabled,
        algorithm: settings.hash_algorithm,
        mode: if args.combined {
            Some(ArchiveMode::Combined)
        } else if args.individual {
            Some(ArchiveMode::Individual)
        } else {
            None
        },
        dry_run: args.dry_run,
    };

    if args.dry_run {
        println!("Dry run: nothing will be written.");
    }
    println!("Backing up {} source(s) to {}", args.sources.len(), root.display());

    let manager = BackupManager::new(VaultConfig::default());
    let summary = manager.run(&args.sources, &root, &options)?;

    for created in &summary.created {
        let verb = if summary.dry_run { "Would create" } else { "Created" };
        println!("  {}: {}", verb, created.archive_path.display());
        if let Some(intended) = &created.renamed_from {
            println!("    (name {} was taken, renamed)", intended);
        }
    }
    for source in &summary.skipped {
        println!("  Skipped (not found): {}", source.display());
    }
    for source in &summary.failed {
        println!("  FAILED: {}", source.display());
    }

    println!();
    println!(
        "Summary: {} created, {} failed, {} skipped, {} date directory(ies) pruned",
        summary.created.len(),
        summary.failed.len(),
        summary.skipped.len(),
        summary.pruned.len(),
    );

    Ok(())
}
