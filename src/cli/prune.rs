//! `zipvault prune` command

use std::path::PathBuf;

use clap::Args;

use crate::config::settings::Settings;
use crate::config::VaultConfig;
use crate::error::{VaultError, VaultResult};
use crate::retention::RetentionPruner;

/// Delete old date directories
#[derive(Args)]
pub struct PruneArgs {
    /// Destination root holding the date directories
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Keep only the newest N date directories
    #[arg(short, long, conflicts_with = "date")]
    pub keep: Option<u32>,

    /// Delete exactly this date (yyyy-MM-dd)
    #[arg(long)]
    pub date: Option<String>,

    /// Actually delete; without this flag the command only reports
    #[arg(short, long)]
    pub force: bool,

    /// Show what would be deleted without removing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Handle the prune command
pub fn handle_prune_command(settings: &Settings, args: PruneArgs) -> VaultResult<()> {
    let root = super::resolve_root(args.destination, settings)?;

    // Deleting is opt-in twice over: --dry-run always simulates, and
    // without --force the command simulates as well and says so.
    let simulate = args.dry_run || !args.force;

    let pruner = RetentionPruner::new(VaultConfig::default());
    let outcome = match (&args.keep, &args.date) {
        (Some(keep), None) => pruner.prune_by_count(&root, *keep, simulate)?,
        (None, Some(date)) => {
            let date = super::parse_date(date)?;
            pruner.prune_by_date(&root, date, simulate)?
        }
        (None, None) => match settings.default_keep {
            Some(keep) => pruner.prune_by_count(&root, keep, simulate)?,
            None => {
                return Err(VaultError::Config(
                    "nothing to prune; pass --keep <n> or --date <yyyy-MM-dd>".into(),
                ))
            }
        },
        (Some(_), Some(_)) => unreachable!("clap rejects --keep with --date"),
    };

    if outcome.deleted.is_empty() {
        println!("No date directories to prune.");
        println!("{} date directory(ies) present.", outcome.kept);
        return Ok(());
    }

    let verb = if simulate { "Would delete" } else { "Deleted" };
    for path in &outcome.deleted {
        println!("  {}: {}", verb, path.display());
    }

    println!();
    println!(
        "Summary: {} date directory(ies) {}, {} kept",
        outcome.deleted.len(),
        if simulate { "to delete" } else { "deleted" },
        outcome.kept,
    );
    if outcome.item_failures > 0 {
        println!("Warning: {} item(s) could not be deleted.", outcome.item_failures);
    }
    if simulate && !args.dry_run {
        println!();
        println!("To delete these directories, run again with --force.");
    }

    Ok(())
}
