//! `zipvault restore` command

use std::path::PathBuf;

use clap::Args;

use crate::config::settings::Settings;
use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::restore::{RestoreEngine, RestoreOptions};

/// Restore backups from their archives
#[derive(Args)]
pub struct RestoreArgs {
    /// Destination root holding the date directories
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Directory to restore into
    #[arg(short, long)]
    pub to: Option<PathBuf>,

    /// Restore each entry to its recorded original path
    #[arg(long, conflicts_with = "to")]
    pub original_paths: bool,

    /// Restore from this date (yyyy-MM-dd) instead of the latest
    #[arg(long)]
    pub date: Option<String>,

    /// Only restore entries matching this name glob
    #[arg(short, long)]
    pub name: Option<String>,

    /// Extract archives directly instead of merging file by file
    #[arg(long)]
    pub preserve_structure: bool,

    /// Overwrite files that already exist at the destination
    #[arg(short, long)]
    pub force: bool,

    /// Show what would happen without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Handle the restore command
pub fn handle_restore_command(settings: &Settings, args: RestoreArgs) -> VaultResult<()> {
    let root = super::resolve_root(args.destination, settings)?;

    if args.to.is_none() && !args.original_paths {
        return Err(VaultError::Restore(
            "no restore destination; pass --to <dir> or --original-paths".into(),
        ));
    }

    let options = RestoreOptions {
        destination: args.to,
        date: args.date.as_deref().map(super::parse_date).transpose()?,
        name_pattern: args.name,
        use_original_paths: args.original_paths,
        preserve_structure: args.preserve_structure,
        overwrite: args.force,
        dry_run: args.dry_run,
    };

    if args.dry_run {
        println!("Dry run: nothing will be written.");
    }

    let engine = RestoreEngine::new(VaultConfig::default());
    let results = engine.restore(&root, &options)?;

    if results.is_empty() {
        println!("No matching backup entries to restore.");
        return Ok(());
    }

    let mut succeeded = 0usize;
    let mut failed = 0usize;

    for result in &results {
        if result.success {
            succeeded += 1;
        } else {
            failed += 1;
        }
        let marker = if result.success { "OK" } else { "FAIL" };
        let destination = result
            .destination
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[{}] {} -> {}: {}",
            marker,
            result.entry.archive_name,
            destination,
            result.message,
        );
    }

    println!();
    println!("Restore complete: {} succeeded, {} failed", succeeded, failed);

    Ok(())
}
